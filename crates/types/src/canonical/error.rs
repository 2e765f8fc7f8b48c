use core::fmt;

/// Errors produced while canonicalizing a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CanonicalError {
    /// The value is representable in JSON but has no deterministic
    /// encoding: non-finite numbers, absent values and raw bytes.
    #[error("value has no canonical encoding: {0}")]
    NonCanonicalValue(String),
    /// The value has a shape outside null, bool, number, text, list and
    /// string-keyed map.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
}

impl CanonicalError {
    pub(crate) fn non_canonical(msg: impl Into<String>) -> Self {
        Self::NonCanonicalValue(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedValue(msg.into())
    }

    /// Prefix the message with the map key or struct field that failed.
    pub(crate) fn in_field(self, field: &str) -> Self {
        match self {
            Self::NonCanonicalValue(msg) => Self::NonCanonicalValue(format!("`{field}`: {msg}")),
            Self::UnsupportedValue(msg) => Self::UnsupportedValue(format!("`{field}`: {msg}")),
        }
    }

    /// True if this is a [`CanonicalError::NonCanonicalValue`].
    pub const fn is_non_canonical(&self) -> bool {
        matches!(self, Self::NonCanonicalValue(_))
    }

    /// True if this is a [`CanonicalError::UnsupportedValue`].
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedValue(_))
    }
}

impl serde::ser::Error for CanonicalError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::UnsupportedValue(msg.to_string())
    }
}
