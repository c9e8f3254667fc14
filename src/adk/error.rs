// SPDX-License-Identifier: MIT

//! Typed error handling for researcher-rs
//!
//! Collaborator failures (model, search, storage, mail) are reported as
//! [`ResearcherError`]. Graph construction and execution failures are
//! reported as [`GraphValidationError`] and [`WorkflowError`].

use thiserror::Error;

/// Error raised by a collaborator call or by configuration loading
#[derive(Debug, Error)]
pub enum ResearcherError {
    /// API errors from external services (Gemini, Custom Search, GCS, ...)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model-specific errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Mail composition or delivery errors
    #[error("Mail error: {0}")]
    Mail(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Response was blocked by the provider
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl ResearcherError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Malformed topology, detected by `StateGraph::compile`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphValidationError {
    /// No edge leaves `START`
    #[error("Graph has no entry edge")]
    MissingEntry,

    /// A node name was registered twice
    #[error("Node '{0}' is declared more than once")]
    DuplicateNode(String),

    /// A node uses `START` or `END` as its name
    #[error("Node name '{0}' is reserved")]
    ReservedName(String),

    /// An edge starts or ends at a node that was never added
    #[error("Edge from '{from}' references undeclared node '{node}'")]
    UndeclaredNode { from: String, node: String },

    /// A source has more than one outgoing edge
    #[error("Node '{0}' has more than one outgoing edge")]
    DuplicateEdge(String),

    /// A node has no outgoing edge
    #[error("Node '{0}' has no outgoing edge")]
    DanglingNode(String),

    /// A conditional edge's label map misses declared router labels
    #[error("Router on '{from}' has unmapped labels: {missing:?}")]
    IncompleteLabels { from: String, missing: Vec<String> },

    /// Nodes that cannot be reached from the entry
    #[error("Unreachable nodes: {0:?}")]
    Unreachable(Vec<String>),
}

/// Fatal errors that abort a graph run
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The topology is malformed
    #[error("Graph validation error: {0}")]
    Validation(#[from] GraphValidationError),

    /// The step counter passed the graph's limit
    #[error("Step limit of {limit} exceeded after node '{node}'")]
    StepLimitExceeded { limit: usize, node: String },

    /// A router returned a label with no declared edge
    #[error("Router on '{node}' returned unmapped label '{label}'")]
    RouterLabel { node: String, label: String },

    /// A step's collaborator call failed
    #[error("Node '{node}' failed: {source}")]
    Step {
        node: String,
        #[source]
        source: ResearcherError,
    },

    /// The input does not match the graph's input schema
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The output projection could not be serialized
    #[error("Failed to serialize output: {0}")]
    Output(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ResearcherError::api("gemini", "quota exhausted");
        assert_eq!(err.to_string(), "API error from gemini: quota exhausted");
    }

    #[test]
    fn test_step_error_keeps_source() {
        let err = WorkflowError::Step {
            node: "create_report".to_string(),
            source: ResearcherError::config("GEMINI_API_KEY must be set"),
        };
        assert!(err.to_string().contains("create_report"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error_converts() {
        let err: WorkflowError = GraphValidationError::MissingEntry.into();
        assert!(matches!(
            err,
            WorkflowError::Validation(GraphValidationError::MissingEntry)
        ));
    }
}
