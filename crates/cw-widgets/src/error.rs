use cw_api_types::BookmarkIdError;
use cw_client::ClientError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("missing element {0}")]
    MissingElement(String),
    #[error("missing attribute {0}")]
    MissingAttribute(String),
    #[error(transparent)]
    MalformedBookmarkId(#[from] BookmarkIdError),
    #[error("{0}")]
    Validation(String),
}

impl WidgetError {
    /// Text the server asked us to show, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            WidgetError::Client(err) => err.server_message(),
            _ => None,
        }
    }
}
