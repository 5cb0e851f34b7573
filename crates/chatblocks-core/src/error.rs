//! Error types for the chatblocks engine.

use thiserror::Error;

/// A shared error type for the entire chatblocks workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The variants mirror the
/// engine's failure taxonomy: lookups that miss, content that is empty,
/// transport calls that fail, and internal render/navigation faults.
#[derive(Error, Debug, Clone)]
pub enum ChatBlocksError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A layout or category resolved but has nothing to render
    #[error("Empty content: {0}")]
    EmptyContent(String),

    /// Chat transport error (send, delete, edit markup)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while rendering a single block
    #[error("Render error: {0}")]
    Render(String),

    /// Navigation state error (corrupted or missing history)
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatBlocksError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an EmptyContent error
    pub fn empty(message: impl Into<String>) -> Self {
        Self::EmptyContent(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Creates a Navigation error
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an EmptyContent error
    pub fn is_empty_content(&self) -> bool {
        matches!(self, Self::EmptyContent(_))
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Human-oriented notice for errors that must surface in the chat.
    ///
    /// Entry points convert any escaping error into exactly one sent
    /// message; this picks the wording per variant.
    pub fn user_notice(&self) -> String {
        match self {
            Self::NotFound { entity_type, id } => {
                format!("{entity_type} \"{id}\" was not found.")
            }
            Self::EmptyContent(what) => format!("{what} is empty."),
            Self::Navigation(_) => "No previous state.".to_string(),
            _ => "Something went wrong while processing your request.".to_string(),
        }
    }
}

impl From<serde_json::Error> for ChatBlocksError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ChatBlocksError {
    fn from(err: anyhow::Error) -> Self {
        Self::DataAccess(err.to_string())
    }
}

/// A type alias for `Result<T, ChatBlocksError>`.
pub type Result<T> = std::result::Result<T, ChatBlocksError>;
