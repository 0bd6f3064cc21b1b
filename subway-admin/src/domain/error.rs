//! Domain error types.
//!
//! These errors represent validation failures on incoming records. They are
//! distinct from storage errors such as missing ids or duplicate names.

/// Validation failures for station and line attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A name was empty or whitespace only
    #[error("{0} name must not be blank")]
    BlankName(&'static str),

    /// A line's background color was empty
    #[error("background color must not be blank")]
    BlankColor,

    /// A line's interval was zero minutes
    #[error("interval time must be at least one minute")]
    ZeroInterval,
}
