//! Engine error types.

use thiserror::Error;
use vela_core::MethodRef;

pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Debug, Error)]
pub enum FlowError {
    /// A type reached a node's accepted set after the graph was locked.
    ///
    /// This is an analysis-phase ordering bug in the embedder: all seeding
    /// must happen before quiescence is declared.
    #[error("error propagating type `{type_name}` to locked node {}", node_label(.method, .tag))]
    LockViolation {
        type_name: String,
        method: Option<MethodRef>,
        tag: Option<String>,
    },

    #[error("invalid value type descriptor `{0}`")]
    InvalidDescriptor(String),
}

fn node_label(method: &Option<MethodRef>, tag: &Option<String>) -> String {
    match (tag, method) {
        (Some(tag), Some(method)) => format!("`{tag}` in {method}"),
        (Some(tag), None) => format!("`{tag}`"),
        (None, Some(method)) => format!("in {method}"),
        (None, None) => "<untagged>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_violation_names_the_type_and_node() {
        let err = FlowError::LockViolation {
            type_name: "java.lang.String".to_string(),
            method: Some(MethodRef::new("com.example.Main", "run", "()V")),
            tag: Some("Main.run:arg0".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("java.lang.String"));
        assert!(message.contains("Main.run:arg0"));
        assert!(message.contains("com.example.Main.run()V"));
    }
}
