//! Error types for the Rearranger
//!
//! Every failure of a copy is reported through [`RearrangeError`]. Nothing is
//! retried: fixture construction is deterministic given its inputs.

use std::error::Error as StdError;

/// Boxed error raised by a type's own constructor
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Main Rearranger error type
#[derive(Debug, thiserror::Error)]
pub enum RearrangeError {
    /// Type metadata could not be obtained or is inconsistent
    #[error("type metadata unavailable for {type_name}: {reason}")]
    Introspection {
        /// Type being described
        type_name: &'static str,
        /// What went wrong
        reason: String,
    },

    /// The selected constructor rejected its arguments
    #[error("constructor `{constructor}` of {type_name} failed: {source}")]
    ConstructorInvocation {
        /// Type being rebuilt
        type_name: &'static str,
        /// Constructor that was invoked
        constructor: &'static str,
        /// The constructor's own error, unchanged
        #[source]
        source: BoxedCause,
    },

    /// A property could not be written during allocation-based construction
    #[error("cannot write property `{property}` of {type_name}: it has neither a setter nor backing storage")]
    FieldInjection {
        /// Type being rebuilt
        type_name: &'static str,
        /// Unwritable property
        property: &'static str,
    },

    /// An override names a property the type does not have
    #[error("failed to override property `{property}` in {type_name}: property not found")]
    UnknownProperty {
        /// Type being rebuilt
        type_name: &'static str,
        /// Name given by the caller
        property: String,
    },

    /// An override or argument value has the wrong type
    #[error("property `{property}` of {type_name} expects {expected}, got {found}")]
    TypeMismatch {
        /// Type being rebuilt
        type_name: &'static str,
        /// Property or parameter name
        property: String,
        /// Declared value type
        expected: &'static str,
        /// Type of the supplied value
        found: &'static str,
    },

    /// A constructor parameter received no value
    #[error("constructor `{constructor}` of {type_name} has no value for parameter `{parameter}`")]
    MissingArgument {
        /// Type being rebuilt
        type_name: &'static str,
        /// Constructor being invoked
        constructor: &'static str,
        /// Parameter without a value
        parameter: String,
    },

    /// Allocation-based construction was selected but the type cannot be allocated
    #[error("{type_name} has no constructor covering all of its properties and no allocator")]
    NotAllocatable {
        /// Type being rebuilt
        type_name: &'static str,
    },

    /// More than one constructor matches under the `unique` selection policy
    #[error("{type_name} has several matching constructors: {}", candidates.join(", "))]
    AmbiguousConstructor {
        /// Type being rebuilt
        type_name: &'static str,
        /// Matching constructors in declaration order
        candidates: Vec<&'static str>,
    },
}

impl RearrangeError {
    /// Create introspection error
    #[inline]
    #[must_use]
    pub fn introspection(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Introspection {
            type_name,
            reason: reason.into(),
        }
    }

    /// The constructor's own error, if this is a constructor failure
    #[must_use]
    pub fn constructor_cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::ConstructorInvocation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Name of the type the failed copy was producing
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Introspection { type_name, .. }
            | Self::ConstructorInvocation { type_name, .. }
            | Self::FieldInjection { type_name, .. }
            | Self::UnknownProperty { type_name, .. }
            | Self::TypeMismatch { type_name, .. }
            | Self::MissingArgument { type_name, .. }
            | Self::NotAllocatable { type_name }
            | Self::AmbiguousConstructor { type_name, .. } => type_name,
        }
    }
}

/// Failure reported by a constructor's invoke function
///
/// Argument extraction failures keep their [`RearrangeError`]; anything the
/// constructor itself rejects is carried as [`InvokeError::Rejected`] and later
/// wrapped into [`RearrangeError::ConstructorInvocation`].
#[derive(Debug)]
pub enum InvokeError {
    /// Arguments could not be extracted
    Argument(RearrangeError),

    /// The constructor ran and refused the arguments
    Rejected(BoxedCause),
}

impl InvokeError {
    /// Wrap a constructor's own error
    #[inline]
    #[must_use]
    pub fn rejected(cause: impl Into<BoxedCause>) -> Self {
        Self::Rejected(cause.into())
    }
}

impl From<RearrangeError> for InvokeError {
    fn from(err: RearrangeError) -> Self {
        Self::Argument(err)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML document could not be parsed
    #[error("invalid rearranger configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
