//! Build well-formed, correctly escaped URLs from printf-style templates.
//!
//! A template is an ordinary URL string with `{}` placeholders in the
//! positions that vary at runtime:
//!
//! ```
//! use urlfmt::try_format;
//!
//! let url = try_format(
//!     "https://api.example.com/users/{}/?page={}",
//!     &["bob".into(), 2.into()],
//! )
//! .unwrap();
//! assert_eq!(url, "https://api.example.com/users/bob/?page=2");
//! ```
//!
//! Placeholders are positional and structural: the parser validates that
//! each one sits in a legal URL position (protocol, hostname, port, path
//! segment, query value, fragment, or a whole query set), and the formatter
//! escapes every bound value for the slot it fills. Null arguments omit
//! their slot instead of producing a dangling separator. Parsed templates
//! are cached per process, so a template literal is only parsed once.
//!
//! [`Formatter`] binds an [`Endpoint`] override (protocol, hostname, port,
//! credentials) that is applied to every template it formats, which keeps
//! environment-specific endpoints out of the template strings themselves.

mod compose;
mod error;
mod formatter;
mod template;
mod value;

pub use error::FormatError;
pub use formatter::{format, try_format, Endpoint, Formatter};
pub use template::{Template, TemplateCache};
pub use value::{QuerySet, Value};
