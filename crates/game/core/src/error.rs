//! Common error infrastructure for scout-core.
//!
//! Domain-specific errors (`GridError`, `PathError`) live next to the code
//! that raises them. None of them is fatal to the host: a bounds error means
//! the caller forgot to pre-filter a coordinate, and an unreachable target is
//! an ordinary outcome of a changing obstacle field.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The caller can continue with a fallback (stay put, random walk).
    ///
    /// Examples: target unreachable this tick
    Recoverable,

    /// Invalid input that should be rejected without retry.
    ///
    /// Examples: coordinate outside the grid, malformed board blob
    Validation,

    /// Unexpected inconsistency that indicates a bug.
    Internal,

    /// State is corrupted and the episode cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all scout-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, used in logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
