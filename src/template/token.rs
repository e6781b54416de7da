// Template tokenizer

/// Structural separators, longest first so multi-character separators match
/// greedily (`://` before `//` before `:`).
const SEPARATORS: [&str; 9] = ["://", "//", ":", "/", "?", "=", "&", "#", "@"];

const PLACEHOLDER: &str = "{}";

/// One token of a template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// One of the fixed structural separators.
    Separator(&'static str),
    /// A literal text run between separators.
    Static(String),
    /// A `{}` marker carrying its zero-based argument index.
    Placeholder(usize),
}

impl Token {
    /// Token text for error messages. Placeholders render with their index
    /// so messages can point at a specific argument.
    pub fn text(&self) -> String {
        match self {
            Token::Separator(sep) => (*sep).to_string(),
            Token::Static(text) => text.clone(),
            Token::Placeholder(index) => format!("{{{}}}", index),
        }
    }
}

/// Split a template string into tokens.
///
/// Tokenization cannot fail: every character of the input lands in exactly
/// one token, and structural validity is the parser's job. Placeholders are
/// numbered left to right, matching the positional argument list.
pub fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut static_start = 0;
    let mut pos = 0;
    let mut placeholder_index = 0;

    while pos < template.len() {
        let rest = &template[pos..];

        let matched_len = if rest.starts_with(PLACEHOLDER) {
            if static_start < pos {
                tokens.push(Token::Static(template[static_start..pos].to_string()));
            }
            tokens.push(Token::Placeholder(placeholder_index));
            placeholder_index += 1;
            PLACEHOLDER.len()
        } else if let Some(sep) = SEPARATORS.iter().copied().find(|sep| rest.starts_with(sep)) {
            if static_start < pos {
                tokens.push(Token::Static(template[static_start..pos].to_string()));
            }
            tokens.push(Token::Separator(sep));
            sep.len()
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
            continue;
        };

        pos += matched_len;
        static_start = pos;
    }

    if static_start < template.len() {
        tokens.push(Token::Static(template[static_start..].to_string()));
    }

    tokens
}
