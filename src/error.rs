//! Errors surfaced by the custom-element host.
//!
//! User code (setup functions, render functions, hooks, validators) is not
//! wrapped: a panic there propagates to the caller unchanged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    #[error("`{0}` is not a valid custom element name")]
    InvalidName(String),

    #[error("a custom element named `{0}` has already been defined")]
    AlreadyDefined(String),

    #[error("no custom element named `{0}` is defined")]
    Undefined(String),
}
