//! Error types for the metadata model.

use thiserror::Error;

/// Main error type for metadata operations.
#[derive(Error, Debug)]
pub enum MetaError {
    /// A named object was requested from an already-imported aspect and is absent.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Configuration error (no importer attached, duplicate registration, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structural error (non-chaining FK path, column/value arity mismatch, etc.)
    #[error("Structural error: {0}")]
    Structural(String),

    /// Malformed check-constraint expression or type-and-size specification.
    #[error("Parse error: {message} in {input:?}")]
    Parse { message: String, input: String },

    /// A capability was invoked on a dialect that does not support it.
    #[error("Dialect '{system}' does not support {capability}")]
    UnsupportedCapability {
        system: String,
        capability: &'static str,
    },

    /// The importer collaborator failed while materializing an aspect.
    #[error("Import of {aspect} failed for {object}: {message}")]
    Import {
        aspect: &'static str,
        object: String,
        message: String,
    },

    /// Tables form a foreign-key cycle that cannot be ordered.
    #[error("Cyclic foreign-key dependency among tables: {}", tables.join(", "))]
    CyclicDependency { tables: Vec<String> },

    /// JSON serialization/deserialization error (graph snapshots).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetaError {
    /// Create a NotFound error for a named object kind.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        MetaError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a Parse error with the offending input.
    pub fn parse(message: impl Into<String>, input: impl Into<String>) -> Self {
        MetaError::Parse {
            message: message.into(),
            input: input.into(),
        }
    }

    /// Create an Import error for an aspect of a named object.
    pub fn import(
        aspect: &'static str,
        object: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        MetaError::Import {
            aspect,
            object: object.into(),
            message: message.into(),
        }
    }

    /// Create an UnsupportedCapability error carrying the dialect's system name.
    pub fn unsupported(system: impl Into<String>, capability: &'static str) -> Self {
        MetaError::UnsupportedCapability {
            system: system.into(),
            capability,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = MetaError::not_found("table", "ORDERS");
        assert_eq!(err.to_string(), "table not found: ORDERS");
    }

    #[test]
    fn test_unsupported_capability_names_system() {
        let err = MetaError::unsupported("mysql", "sequences");
        assert_eq!(err.to_string(), "Dialect 'mysql' does not support sequences");
    }

    #[test]
    fn test_cyclic_dependency_lists_tables() {
        let err = MetaError::CyclicDependency {
            tables: vec!["a".into(), "b".into()],
        };
        assert!(err.to_string().contains("a, b"));
    }
}
