//! Bilingual Name - display names with an optional alternate-script part
//!
//! A registration name such as `"Li Wei (李伟)"` carries a primary part in
//! the default script and an alternate rendering in parentheses. This crate
//! provides:
//! - Splitting a raw name into primary and alternate parts
//! - Dropping the alternate part for ASCII-only output
//!
//! # Example
//!
//! ```ignore
//! use bilingual_name::{parse, should_omit_alternate};
//!
//! let name = parse("Li Wei (李伟)")?;
//! assert_eq!(name.primary, "Li Wei");
//! assert_eq!(name.alternate.as_deref(), Some("李伟"));
//!
//! assert_eq!(should_omit_alternate("Li Wei (李伟)", true), "Li Wei");
//! ```

mod parser;

pub use parser::{parse, should_omit_alternate, ParsedName};

use thiserror::Error;

/// Errors that can occur while parsing a name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Malformed name (unmatched parenthesis): {0}")]
    Malformed(String),
}

/// Result type for name parsing
pub type Result<T> = std::result::Result<T, NameError>;
