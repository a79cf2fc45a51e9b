//! Error types for host introspection and member resolution

use std::fmt;

/// Result type for introspection operations
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Failure raised by host code while running an accessor, method or field read.
///
/// Host invokers return this instead of panicking; the resolver wraps it into
/// [`IntrospectError::Invocation`] together with the member being invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFault {
    message: String,
}

impl HostFault {
    /// Create a fault with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Fault message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostFault {}

impl From<String> for HostFault {
    fn from(s: String) -> Self {
        HostFault::new(s)
    }
}

impl From<&str> for HostFault {
    fn from(s: &str) -> Self {
        HostFault::new(s)
    }
}

/// Introspection error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum IntrospectError {
    /// Neither introspection strategy could be loaded. Fatal, never retried.
    #[error("No introspection strategy available: {0}")]
    StrategyUnavailable(String),

    /// The platform refused to hand out reflective metadata for a class
    #[error("Failed to introspect class {class}: {reason}")]
    Introspection {
        /// Class being introspected
        class: String,
        /// Reason reported by the platform
        reason: String,
    },

    /// Accessor not reachable at invocation time
    #[error("Illegal access: {0}")]
    IllegalAccess(String),

    /// The underlying accessor or method raised while running
    #[error("Invocation of {member} failed: {source}")]
    Invocation {
        /// Member being invoked (`Class.method`)
        member: String,
        /// Fault raised by host code
        #[source]
        source: HostFault,
    },

    /// Wrapping, unwrapping or overload selection failed
    #[error("Template model error: {0}")]
    Model(String),

    /// Invalid wrapper configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl IntrospectError {
    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        IntrospectError::Model(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invocation_error_keeps_source() {
        let err = IntrospectError::Invocation {
            member: "Point.move".to_string(),
            source: HostFault::new("out of bounds"),
        };
        assert_eq!(err.to_string(), "Invocation of Point.move failed: out of bounds");
        assert_eq!(err.source().unwrap().to_string(), "out of bounds");
    }

    #[test]
    fn test_host_fault_from_str() {
        let fault: HostFault = "boom".into();
        assert_eq!(fault.message(), "boom");
    }
}
