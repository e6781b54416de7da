// URL formatting: endpoint overrides and argument substitution

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::compose::UrlRecord;
use crate::error::FormatError;
use crate::template::{global_cache, PathSegment, QueryEntry, Slot, Template, TemplateCache};
use crate::value::{QuerySet, Value};

/// Endpoint override applied to every template a [`Formatter`] formats.
///
/// `hostname` may carry a full authority such as
/// `"https://api.example.com:8080"`; it is decomposed and overrides the
/// protocol, hostname and port individually. An explicit `protocol` or
/// `port` field takes precedence over a decomposed value. `username` and
/// `password` must be supplied together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Endpoint {
    fn is_empty(&self) -> bool {
        self.protocol.is_none()
            && self.hostname.is_none()
            && self.port.is_none()
            && self.username.is_none()
            && self.password.is_none()
    }

    /// Build a new template with this endpoint's fields substituted in.
    /// Path, query and fragment storage is shared with the source template.
    fn apply(&self, template: &Template) -> Result<Template, FormatError> {
        let mut result = template.clone();

        if let Some(authority) = &self.hostname {
            let (scheme, host, port) = split_authority(authority)?;
            if let Some(scheme) = scheme {
                result.protocol = Some(Slot::Static(scheme.to_string()));
            }
            result.hostname = Some(Slot::Static(host.to_string()));
            if let Some(port) = port {
                result.port = Some(Slot::Static(port));
            }
            debug!("endpoint override rewrote authority to '{}'", authority);
        }
        if let Some(protocol) = &self.protocol {
            result.protocol = Some(Slot::Static(protocol.clone()));
        }
        if let Some(port) = self.port {
            result.port = Some(Slot::Static(port));
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                result.username = Some(username.clone());
                result.password = Some(password.clone());
            }
            (None, None) => {}
            _ => {
                return Err(FormatError::Configuration(
                    "username and password must be set together".to_string(),
                ));
            }
        }

        Ok(result)
    }
}

/// Split an authority override of the form `[scheme://]host[:port]`.
fn split_authority(authority: &str) -> Result<(Option<&str>, &str, Option<u16>), FormatError> {
    let (scheme, rest) = match authority.split_once("://") {
        Some((scheme, _)) if scheme.is_empty() => {
            return Err(FormatError::Configuration(format!(
                "hostname override '{}' has an empty protocol",
                authority
            )));
        }
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, authority),
    };

    let (host, port) = match rest.split_once(':') {
        Some((host, port_text)) => {
            let port = port_text.parse::<u16>().map_err(|_| {
                FormatError::Configuration(format!(
                    "invalid port '{}' in hostname override '{}'",
                    port_text, authority
                ))
            })?;
            (host, Some(port))
        }
        None => (rest, None),
    };
    if host.is_empty() {
        return Err(FormatError::Configuration(format!(
            "hostname override '{}' has an empty hostname",
            authority
        )));
    }

    Ok((scheme, host, port))
}

/// A reusable formatter bound to an endpoint override.
pub struct Formatter {
    endpoint: Endpoint,
    cache: Option<Arc<TemplateCache>>,
}

impl Formatter {
    /// Formatter using the process-wide template cache.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            cache: None,
        }
    }

    /// Formatter with its own template cache, for callers that want
    /// deterministic caching or bounded memory.
    pub fn with_cache(endpoint: Endpoint, cache: Arc<TemplateCache>) -> Self {
        Self {
            endpoint,
            cache: Some(cache),
        }
    }

    /// Format `template` with `args`, panicking on any error.
    ///
    /// Intended for templates written as static literals, where a syntax
    /// error is a programming mistake. Use [`Formatter::try_format`] when
    /// the template or arguments are not known to be valid.
    pub fn format(&self, template: &str, args: &[Value]) -> String {
        match self.try_format(template, args) {
            Ok(url) => url,
            Err(err) => panic!("{}", err),
        }
    }

    /// Format `template` with `args`, surfacing any error.
    pub fn try_format(&self, template: &str, args: &[Value]) -> Result<String, FormatError> {
        let cache = self.cache.as_deref().unwrap_or_else(|| global_cache());
        let parsed = cache.lookup_or_parse(template)?;
        let template = if self.endpoint.is_empty() {
            parsed
        } else {
            Arc::new(self.endpoint.apply(&parsed)?)
        };
        Ok(substitute(&template, args)?.into_url())
    }
}

/// Format a URL template with positional arguments, panicking on any parse
/// or binding error. The fallible variant is [`try_format`].
pub fn format(template: &str, args: &[Value]) -> String {
    Formatter::new(Endpoint::default()).format(template, args)
}

/// Format a URL template with positional arguments.
pub fn try_format(template: &str, args: &[Value]) -> Result<String, FormatError> {
    Formatter::new(Endpoint::default()).try_format(template, args)
}

/// Look up the argument for a placeholder, failing when the argument list
/// is too short.
fn arg<'a>(args: &'a [Value], index: usize, slot: &str) -> Result<&'a Value, FormatError> {
    args.get(index).ok_or_else(|| {
        FormatError::Binding(format!(
            "missing argument for the {} placeholder {{{}}}: {} argument(s) supplied",
            slot,
            index,
            args.len()
        ))
    })
}

/// Bind `args` to the template's slots and assemble the URL record.
fn substitute(template: &Template, args: &[Value]) -> Result<UrlRecord, FormatError> {
    let mut record = UrlRecord::default();

    if let Some(slot) = &template.protocol {
        match slot {
            Slot::Static(scheme) => record.scheme = Some(scheme.clone()),
            Slot::Param(index) => match arg(args, *index, "protocol")? {
                Value::String(s) | Value::OptionalString(Some(s)) => {
                    record.scheme = Some(s.clone());
                }
                value if value.is_null() => {}
                value => {
                    return Err(FormatError::Binding(format!(
                        "the protocol placeholder {{{}}} accepts a string or null, but got {}",
                        index,
                        value.kind()
                    )));
                }
            },
        }
    }

    if let Some(slot) = &template.hostname {
        match slot {
            Slot::Static(host) => record.host = Some(host.clone()),
            Slot::Param(index) => match arg(args, *index, "hostname")? {
                Value::String(s) | Value::OptionalString(Some(s)) => {
                    record.host = Some(s.clone());
                }
                value if value.is_null() => {
                    // A schemeless host is meaningless, so a null hostname
                    // drops the scheme as well.
                    record.scheme = None;
                }
                value => {
                    return Err(FormatError::Binding(format!(
                        "the hostname placeholder {{{}}} accepts a string or null, but got {}",
                        index,
                        value.kind()
                    )));
                }
            },
        }
    }

    // A port without a host has nowhere to go.
    if record.host.is_some() {
        if let Some(slot) = &template.port {
            match slot {
                Slot::Static(port) => record.port = Some(*port),
                Slot::Param(index) => match arg(args, *index, "port")? {
                    Value::Integer(n) | Value::OptionalInteger(Some(n)) => {
                        record.port = Some(check_port(*n, *index)?);
                    }
                    value if value.is_null() => {}
                    value => {
                        return Err(FormatError::Binding(format!(
                            "the port placeholder {{{}}} accepts an integer or null, but got {}",
                            index,
                            value.kind()
                        )));
                    }
                },
            }
        }
    }

    let mut pieces: Vec<String> = Vec::new();
    for segment in template.paths.iter() {
        match segment {
            PathSegment::Literal(text) => pieces.push(text.clone()),
            PathSegment::Param(index) => {
                push_path_value(&mut pieces, arg(args, *index, "path")?, *index)?;
            }
        }
    }
    record.path = join_path(&pieces);

    let mut builder = QueryBuilder::default();
    for entry in template.queries.iter() {
        bind_query_entry(&mut builder, entry, args)?;
    }
    record.queries = builder.entries;

    if let Some(slot) = &template.fragment {
        match slot {
            Slot::Static(text) => record.fragment = Some(text.clone()),
            Slot::Param(index) => match arg(args, *index, "fragment")? {
                Value::String(s) | Value::OptionalString(Some(s)) => {
                    record.fragment = Some(s.clone());
                }
                value if value.is_null() => {}
                value => {
                    return Err(FormatError::Binding(format!(
                        "the fragment placeholder {{{}}} accepts a string or null, but got {}",
                        index,
                        value.kind()
                    )));
                }
            },
        }
    }

    record.username = template.username.clone();
    record.password = template.password.clone();

    Ok(record)
}

fn check_port(value: i64, index: usize) -> Result<u16, FormatError> {
    if (1..=65535).contains(&value) {
        Ok(value as u16)
    } else {
        Err(FormatError::Binding(format!(
            "the port placeholder {{{}}} must be in range 1-65535, but got {}",
            index, value
        )))
    }
}

/// A plain string bound to a path slot is a subpath: it is split on `/` and
/// each component is encoded on its own, so `"a/b"` contributes two
/// segments. List elements are opaque single segments instead.
fn encode_subpath(value: &str) -> String {
    value
        .split('/')
        .map(|component| urlencoding::encode(component).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn push_path_value(
    pieces: &mut Vec<String>,
    value: &Value,
    index: usize,
) -> Result<(), FormatError> {
    match value {
        Value::String(s) | Value::OptionalString(Some(s)) => pieces.push(encode_subpath(s)),
        Value::Integer(n) | Value::OptionalInteger(Some(n)) => pieces.push(n.to_string()),
        value if value.is_null() => {}
        Value::List(elements) => {
            for element in elements {
                match element {
                    Value::String(s) | Value::OptionalString(Some(s)) => {
                        pieces.push(format!("/{}", urlencoding::encode(s)));
                    }
                    Value::Integer(n) | Value::OptionalInteger(Some(n)) => {
                        pieces.push(format!("/{}", n));
                    }
                    element if element.is_null() => {}
                    element => {
                        return Err(FormatError::Binding(format!(
                            "the path placeholder {{{}}} accepts list elements of string, integer or null, but got {}",
                            index,
                            element.kind()
                        )));
                    }
                }
            }
        }
        value => {
            return Err(FormatError::Binding(format!(
                "the path placeholder {{{}}} accepts a string, integer, null or a list of those, but got {}",
                index,
                value.kind()
            )));
        }
    }
    Ok(())
}

/// Join path pieces, collapsing the doubled slash where a piece ending in
/// `/` meets one starting with `/`.
fn join_path(pieces: &[String]) -> String {
    let mut path = String::new();
    for piece in pieces {
        if path.ends_with('/') && piece.starts_with('/') {
            path.push_str(&piece[1..]);
        } else {
            path.push_str(piece);
        }
    }
    path
}

/// Ordered query accumulator implementing the overwrite-first/append-rest
/// rules. Keys keep their first-occurrence position.
#[derive(Default)]
struct QueryBuilder {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryBuilder {
    fn add(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    /// Replace every existing value for `key`, keeping its position.
    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => {
                values.clear();
                values.push(value);
            }
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    /// Drop `key` entirely.
    fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }
}

fn bind_query_entry(
    builder: &mut QueryBuilder,
    entry: &QueryEntry,
    args: &[Value],
) -> Result<(), FormatError> {
    match &entry.value {
        Slot::Static(value) => {
            builder.add(&entry.key, value.clone());
            Ok(())
        }
        Slot::Param(index) => {
            let value = arg(args, *index, "query")?;
            if entry.key.is_empty() {
                match value {
                    Value::Query(set) => {
                        merge_query_set(builder, set);
                        Ok(())
                    }
                    value => Err(FormatError::Binding(format!(
                        "the query-set placeholder {{{}}} accepts a query set, but got {}",
                        index,
                        value.kind()
                    ))),
                }
            } else {
                bind_query_value(builder, &entry.key, value, *index)
            }
        }
    }
}

fn bind_query_value(
    builder: &mut QueryBuilder,
    key: &str,
    value: &Value,
    index: usize,
) -> Result<(), FormatError> {
    match value {
        Value::String(s) | Value::OptionalString(Some(s)) => builder.add(key, s.clone()),
        Value::Integer(n) | Value::OptionalInteger(Some(n)) => builder.add(key, n.to_string()),
        // Null removes the key from the output entirely, static entries
        // included.
        value if value.is_null() => builder.remove(key),
        Value::List(elements) => {
            for (position, element) in elements.iter().enumerate() {
                let text = match element {
                    Value::String(s) | Value::OptionalString(Some(s)) => s.clone(),
                    Value::Integer(n) | Value::OptionalInteger(Some(n)) => n.to_string(),
                    element if element.is_null() => continue,
                    element => {
                        return Err(FormatError::Binding(format!(
                            "the query value for '{}' (placeholder {{{}}}) accepts list elements of string, integer or null, but got {}",
                            key,
                            index,
                            element.kind()
                        )));
                    }
                };
                if position == 0 {
                    builder.set(key, text);
                } else {
                    builder.add(key, text);
                }
            }
        }
        value => {
            return Err(FormatError::Binding(format!(
                "the query value for '{}' (placeholder {{{}}}) accepts a string, integer, null or a list of those, but got {}",
                key,
                index,
                value.kind()
            )));
        }
    }
    Ok(())
}

/// Merge a whole key/value collection, overwriting the first value of each
/// key and appending the rest.
fn merge_query_set(builder: &mut QueryBuilder, set: &QuerySet) {
    for (key, values) in set.iter() {
        for (position, value) in values.iter().enumerate() {
            if position == 0 {
                builder.set(key, value.clone());
            } else {
                builder.add(key, value.clone());
            }
        }
    }
}
