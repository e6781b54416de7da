// Error handling for urlfmt

use std::fmt;

/// Error produced while turning a template and its arguments into a URL.
///
/// Every variant is terminal for the call in progress: the formatter either
/// returns a complete URL or fails without partial output.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The template string is structurally invalid. The message names the
    /// offending token and the region of the URL being parsed.
    Syntax(String),
    /// A runtime argument is missing or has a type the slot does not accept.
    Binding(String),
    /// The endpoint override record is inconsistent.
    Configuration(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Syntax(msg) => write!(f, "template syntax error: {}", msg),
            FormatError::Binding(msg) => write!(f, "binding error: {}", msg),
            FormatError::Configuration(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
