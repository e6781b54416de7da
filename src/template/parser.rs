// Structural template parser
//
// A state machine over the token stream. Each URL region admits a small set
// of tokens; anything else fails with an error naming the offending token
// and the region being parsed.

use crate::error::FormatError;

use super::ast::{PathSegment, QueryEntry, Slot, Template};
use super::token::{tokenize, Token};

/// Parse states, one per URL region. `Terminal` rejects any further tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Protocol,
    Hostname,
    Port,
    Path,
    Query,
    QueryKey,
    QueryValue,
    Fragment,
    Terminal,
}

/// Separators that are structurally legal in a given state. Everything else
/// from the fixed separator set is rejected there.
fn separator_allowed(state: State, sep: &str) -> bool {
    match state {
        State::Protocol => matches!(sep, "//" | "/"),
        State::Path => matches!(sep, "/" | "?" | "#"),
        State::Query => matches!(sep, "?" | "#"),
        State::QueryKey => matches!(sep, "=" | "&" | "#"),
        State::QueryValue => matches!(sep, "&" | "#"),
        _ => false,
    }
}

pub fn parse(template: &str) -> Result<Template, FormatError> {
    Parser::new(tokenize(template)).run()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    state: State,
    /// Text of the last structural token, for error messages.
    prev: String,
    /// Key awaiting its value while in the QueryValue state.
    query_key: String,
    protocol: Option<Slot<String>>,
    hostname: Option<Slot<String>>,
    port: Option<Slot<u16>>,
    paths: Vec<PathSegment>,
    queries: Vec<QueryEntry>,
    fragment: Option<Slot<String>>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            state: State::Protocol,
            prev: String::new(),
            query_key: String::new(),
            protocol: None,
            hostname: None,
            port: None,
            paths: Vec::new(),
            queries: Vec::new(),
            fragment: None,
        }
    }

    fn run(mut self) -> Result<Template, FormatError> {
        while self.pos < self.tokens.len() {
            match self.state {
                State::Protocol => self.step_protocol()?,
                State::Hostname => self.step_hostname()?,
                State::Port => self.step_port()?,
                State::Path => self.step_path()?,
                State::Query => self.step_query()?,
                State::QueryKey => self.step_query_key()?,
                State::QueryValue => self.step_query_value()?,
                State::Fragment => self.step_fragment()?,
                State::Terminal => {
                    let extra: Vec<String> =
                        self.tokens[self.pos..].iter().map(Token::text).collect();
                    return Err(FormatError::Syntax(format!(
                        "unexpected trailing tokens after the end of the URL: [{}]",
                        extra.join(", ")
                    )));
                }
            }
        }

        Ok(Template {
            protocol: self.protocol,
            hostname: self.hostname,
            port: self.port,
            paths: self.paths.into(),
            queries: self.queries.into(),
            fragment: self.fragment,
            username: None,
            password: None,
        })
    }

    fn current(&self) -> Token {
        self.tokens[self.pos].clone()
    }

    fn next(&self) -> Option<Token> {
        self.tokens.get(self.pos + 1).cloned()
    }

    /// Append literal path text, coalescing consecutive literal runs.
    fn push_path(&mut self, text: &str) {
        if let Some(PathSegment::Literal(run)) = self.paths.last_mut() {
            run.push_str(text);
        } else {
            self.paths.push(PathSegment::Literal(text.to_string()));
        }
    }

    fn step_protocol(&mut self) -> Result<(), FormatError> {
        let token = self.current();

        // A protocol slot exists only when the second token is "://".
        if let Some(Token::Separator("://")) = self.next() {
            match &token {
                Token::Placeholder(index) => {
                    self.protocol = Some(Slot::Param(*index));
                }
                Token::Static(name) => {
                    self.protocol = Some(Slot::Static(name.clone()));
                }
                Token::Separator("://") => {
                    return Err(FormatError::Syntax(
                        "protocol name must not be empty before '://'".to_string(),
                    ));
                }
                Token::Separator(sep) => {
                    return Err(FormatError::Syntax(format!(
                        "invalid separator '{}' before '://': a protocol name is expected",
                        sep
                    )));
                }
            }
            self.prev = "://".to_string();
            self.pos += 2;
            self.state = State::Hostname;
            return Ok(());
        }

        match token {
            Token::Separator("://") => Err(FormatError::Syntax(
                "protocol name must not be empty before '://'".to_string(),
            )),
            Token::Separator("//") => {
                // Protocol-relative template
                self.prev = "//".to_string();
                self.pos += 1;
                self.state = State::Hostname;
                Ok(())
            }
            Token::Separator("/") => {
                self.state = State::Path;
                Ok(())
            }
            Token::Separator(sep) => Err(FormatError::Syntax(format!(
                "invalid separator '{}' at the start of the template: only a protocol name, '//' or a path may begin it",
                sep
            ))),
            // Relative path content; the Path state revalidates it.
            Token::Static(_) | Token::Placeholder(_) => {
                self.state = State::Path;
                Ok(())
            }
        }
    }

    fn step_hostname(&mut self) -> Result<(), FormatError> {
        match self.current() {
            Token::Separator(sep) => Err(FormatError::Syntax(format!(
                "invalid separator '{}' after '{}': a hostname is expected",
                sep, self.prev
            ))),
            Token::Placeholder(index) => {
                self.hostname = Some(Slot::Param(index));
                self.prev = "hostname".to_string();
                self.pos += 1;
                self.state = State::Port;
                Ok(())
            }
            Token::Static(name) => {
                self.hostname = Some(Slot::Static(name));
                self.prev = "hostname".to_string();
                self.pos += 1;
                self.state = State::Port;
                Ok(())
            }
        }
    }

    fn step_port(&mut self) -> Result<(), FormatError> {
        if let Token::Separator(":") = self.current() {
            match self.next() {
                None => {
                    return Err(FormatError::Syntax(
                        "a port number is expected after ':'".to_string(),
                    ));
                }
                Some(Token::Separator(sep)) => {
                    return Err(FormatError::Syntax(format!(
                        "invalid separator '{}' after ':': a port number is expected",
                        sep
                    )));
                }
                Some(Token::Placeholder(index)) => {
                    self.port = Some(Slot::Param(index));
                }
                Some(Token::Static(text)) => {
                    self.port = Some(Slot::Static(parse_port(&text)?));
                }
            }
            self.prev = "port".to_string();
            self.pos += 2;
        }
        self.state = State::Path;
        Ok(())
    }

    fn step_path(&mut self) -> Result<(), FormatError> {
        match self.current() {
            Token::Placeholder(index) => Err(FormatError::Syntax(format!(
                "placeholder {{{}}} is not valid after '{}': path placeholders must follow '/'",
                index, self.prev
            ))),
            Token::Static(text) => {
                // Loose text is only legal as a relative path, before any
                // protocol or hostname has claimed the template.
                if (self.protocol.is_some() || self.hostname.is_some()) && self.paths.is_empty() {
                    return Err(FormatError::Syntax(format!(
                        "invalid text '{}' after '{}': a path must start with '/'",
                        text, self.prev
                    )));
                }
                self.push_path(&text);
                self.pos += 1;
                Ok(())
            }
            Token::Separator(sep) => {
                if !separator_allowed(State::Path, sep) {
                    return Err(FormatError::Syntax(format!(
                        "invalid separator '{}' after '{}': only '/', '?' or '#' may follow a path",
                        sep, self.prev
                    )));
                }
                if sep != "/" {
                    // '?' and '#' are consumed by the Query state
                    self.state = State::Query;
                    return Ok(());
                }
                match self.next() {
                    None => {
                        // Trailing slash ends the template
                        self.push_path("/");
                        self.pos += 1;
                        self.state = State::Terminal;
                    }
                    Some(Token::Separator(_)) => {
                        self.push_path("/");
                        self.prev = "/".to_string();
                        self.pos += 1;
                        self.state = State::Query;
                    }
                    Some(Token::Placeholder(index)) => {
                        self.push_path("/");
                        self.paths.push(PathSegment::Param(index));
                        self.prev = format!("{{{}}}", index);
                        self.pos += 2;
                    }
                    Some(Token::Static(text)) => {
                        let run = format!("/{}", text);
                        self.push_path(&run);
                        self.prev = run;
                        self.pos += 2;
                    }
                }
                Ok(())
            }
        }
    }

    fn step_query(&mut self) -> Result<(), FormatError> {
        match self.current() {
            Token::Separator("?") => {
                self.prev = "?".to_string();
                self.pos += 1;
                self.state = State::QueryKey;
                Ok(())
            }
            Token::Separator("#") => {
                self.pos += 1;
                self.state = State::Fragment;
                Ok(())
            }
            Token::Separator(sep) => Err(FormatError::Syntax(format!(
                "invalid separator '{}' after '{}': '?' or '#' is expected",
                sep, self.prev
            ))),
            Token::Placeholder(index) => Err(FormatError::Syntax(format!(
                "placeholder {{{}}} is not valid after '{}': '?' or '#' is expected",
                index, self.prev
            ))),
            Token::Static(text) => Err(FormatError::Syntax(format!(
                "invalid text '{}' after '{}': '?' or '#' is expected",
                text, self.prev
            ))),
        }
    }

    fn step_query_key(&mut self) -> Result<(), FormatError> {
        match self.current() {
            Token::Separator(sep) => Err(FormatError::Syntax(format!(
                "a query key is expected after '{}', but got '{}'",
                self.prev, sep
            ))),
            Token::Placeholder(index) => {
                // Query-set placeholder: merges a whole key/value collection
                match self.next() {
                    None => {
                        self.pos += 1;
                        self.state = State::Terminal;
                    }
                    Some(Token::Separator(sep)) if separator_allowed(State::QueryValue, sep) => {
                        if sep == "#" {
                            self.state = State::Fragment;
                        }
                        self.prev = sep.to_string();
                        self.pos += 2;
                    }
                    Some(other) => {
                        return Err(FormatError::Syntax(format!(
                            "invalid token '{}' after query-set placeholder {{{}}}: only '&' or '#' may follow",
                            other.text(),
                            index
                        )));
                    }
                }
                self.queries.push(QueryEntry {
                    key: String::new(),
                    value: Slot::Param(index),
                });
                Ok(())
            }
            Token::Static(key) => {
                match self.next() {
                    None => {
                        // Zero-value key at end of input
                        self.queries.push(QueryEntry {
                            key,
                            value: Slot::Static(String::new()),
                        });
                        self.pos += 1;
                    }
                    Some(Token::Separator(sep)) => {
                        if !separator_allowed(State::QueryKey, sep) {
                            return Err(FormatError::Syntax(format!(
                                "invalid separator '{}' after query key '{}': only '=', '&' or '#' may follow",
                                sep, key
                            )));
                        }
                        match sep {
                            "=" => {
                                self.prev = key.clone();
                                self.query_key = key;
                                self.state = State::QueryValue;
                            }
                            "&" => {
                                self.queries.push(QueryEntry {
                                    key,
                                    value: Slot::Static(String::new()),
                                });
                                self.prev = "&".to_string();
                            }
                            "#" => {
                                self.queries.push(QueryEntry {
                                    key,
                                    value: Slot::Static(String::new()),
                                });
                                self.state = State::Fragment;
                            }
                            _ => unreachable!("separator_allowed admits only '=', '&', '#'"),
                        }
                        self.pos += 2;
                    }
                    Some(other) => {
                        return Err(FormatError::Syntax(format!(
                            "invalid token '{}' after query key '{}': '=', '&' or '#' is expected",
                            other.text(),
                            key
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn step_query_value(&mut self) -> Result<(), FormatError> {
        let value = match self.current() {
            Token::Separator(sep) => {
                return Err(FormatError::Syntax(format!(
                    "a value for query key '{}' is expected, but got '{}'",
                    self.query_key, sep
                )));
            }
            Token::Placeholder(index) => Slot::Param(index),
            Token::Static(text) => Slot::Static(text),
        };
        self.queries.push(QueryEntry {
            key: self.query_key.clone(),
            value,
        });

        match self.next() {
            None => {
                self.pos += 1;
            }
            Some(Token::Separator(sep)) => {
                if !separator_allowed(State::QueryValue, sep) {
                    return Err(FormatError::Syntax(format!(
                        "invalid separator '{}' after the value of '{}': only '&' or '#' may follow",
                        sep, self.query_key
                    )));
                }
                self.state = if sep == "#" {
                    State::Fragment
                } else {
                    State::QueryKey
                };
                self.prev = sep.to_string();
                self.pos += 2;
            }
            Some(other) => {
                return Err(FormatError::Syntax(format!(
                    "invalid token '{}' after the value of '{}': '&' or '#' is expected",
                    other.text(),
                    self.query_key
                )));
            }
        }
        Ok(())
    }

    fn step_fragment(&mut self) -> Result<(), FormatError> {
        match self.current() {
            Token::Separator(sep) => Err(FormatError::Syntax(format!(
                "invalid separator '{}' in the fragment: a static string or placeholder is expected",
                sep
            ))),
            Token::Static(text) => {
                self.fragment = Some(Slot::Static(text));
                self.pos += 1;
                self.state = State::Terminal;
                Ok(())
            }
            Token::Placeholder(index) => {
                self.fragment = Some(Slot::Param(index));
                self.pos += 1;
                self.state = State::Terminal;
                Ok(())
            }
        }
    }
}

fn parse_port(text: &str) -> Result<u16, FormatError> {
    let number: u64 = text.parse().map_err(|_| {
        FormatError::Syntax(format!("port must be a number, but got '{}'", text))
    })?;
    if !(1..=65535).contains(&number) {
        return Err(FormatError::Syntax(format!(
            "port number must be in range 1-65535, but got {}",
            number
        )));
    }
    Ok(number as u16)
}
