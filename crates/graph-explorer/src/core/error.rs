//! Core error types for graph mutation and lookup
//!
//! Every failure here is local and non-fatal: a rejected mutation leaves the
//! graph exactly as it was before the call.

use thiserror::Error;

/// Errors reported by [`GraphStore`](super::GraphStore) and the model facade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Duplicate node: a node with id '{id}' already exists")]
    DuplicateNode { id: String },

    #[error("Duplicate arc: an arc with id '{id}' already exists")]
    DuplicateArc { id: String },

    #[error("Missing endpoint: arc '{arc}' references unknown node '{endpoint}'")]
    MissingEndpoint { arc: String, endpoint: String },

    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Arc not found: {id}")]
    ArcNotFound { id: String },

    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },
}

impl GraphError {
    /// Create a duplicate node error
    pub fn duplicate_node(id: impl Into<String>) -> Self {
        Self::DuplicateNode { id: id.into() }
    }

    /// Create a duplicate arc error
    pub fn duplicate_arc(id: impl Into<String>) -> Self {
        Self::DuplicateArc { id: id.into() }
    }

    /// Create a missing endpoint error
    pub fn missing_endpoint(arc: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::MissingEndpoint {
            arc: arc.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create an arc not found error
    pub fn arc_not_found(id: impl Into<String>) -> Self {
        Self::ArcNotFound { id: id.into() }
    }

    /// Create a snapshot error
    pub fn snapshot_error(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }

    /// Returns true for the "already exists" family of errors
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateNode { .. } | Self::DuplicateArc { .. })
    }

    /// Returns true for the "unknown id" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. } | Self::ArcNotFound { .. })
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::snapshot_error(err.to_string())
    }
}
