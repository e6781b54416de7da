// Runtime argument values accepted by the formatter

use url::form_urlencoded;

/// A positional argument bound to a template placeholder.
///
/// Which variants a slot accepts depends on the slot kind: protocol,
/// hostname and fragment slots take strings, the port slot takes integers,
/// path and query-value slots additionally take lists, and a query-set
/// placeholder takes a [`QuerySet`]. Null values omit the slot they are
/// bound to instead of erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    OptionalString(Option<String>),
    Integer(i64),
    OptionalInteger(Option<i64>),
    List(Vec<Value>),
    Query(QuerySet),
}

impl Value {
    /// The null argument. Binding it to a slot omits that slot.
    pub fn null() -> Self {
        Value::OptionalString(None)
    }

    /// True for a null value regardless of its declared carrier type.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::OptionalString(None) | Value::OptionalInteger(None)
        )
    }

    /// Short type description used in binding error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::String(_) | Value::OptionalString(Some(_)) => "a string",
            Value::Integer(_) | Value::OptionalInteger(Some(_)) => "an integer",
            Value::OptionalString(None) | Value::OptionalInteger(None) => "null",
            Value::List(_) => "a list",
            Value::Query(_) => "a query set",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        Value::OptionalString(value.map(str::to_string))
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        Value::OptionalString(value)
    }
}

impl From<Option<i64>> for Value {
    fn from(value: Option<i64>) -> Self {
        Value::OptionalInteger(value)
    }
}

impl From<Option<i32>> for Value {
    fn from(value: Option<i32>) -> Self {
        Value::OptionalInteger(value.map(i64::from))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<QuerySet> for Value {
    fn from(value: QuerySet) -> Self {
        Value::Query(value)
    }
}

/// Ordered multi-valued key/value collection for query-set placeholders.
///
/// Keys keep their first-occurrence order and each key keeps its values in
/// insertion order, so merging a query set into a URL is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySet {
    entries: Vec<(String, Vec<String>)>,
}

impl QuerySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`, preserving key and value order.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Build a query set from an urlencoded query string such as
    /// `"key=a&key=b&key2=value"`.
    pub fn parse(query: &str) -> Self {
        let mut set = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            set.append(key.into_owned(), value.into_owned());
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in first-occurrence order, each with its ordered values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
