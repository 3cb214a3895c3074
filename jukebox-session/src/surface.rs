//! Interaction response surface
//!
//! The platform's reply to a user command. It starts out deferred (an
//! acknowledgement with no content), is materialized by the first real
//! response, and is edited in place afterwards. Any operation may report the
//! response as gone, for instance when a user deleted the message.

use crate::render::RenderedPanel;
use async_trait::async_trait;
use thiserror::Error;

/// Opaque reference to a platform response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseHandle(pub String);

impl ResponseHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResponseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure reported by the surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The response no longer exists on the platform
    #[error("Response not found")]
    NotFound,

    #[error("Response request failed: {0}")]
    Request(String),
}

impl SurfaceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SurfaceError::NotFound)
    }
}

/// Platform operations on a single command response
#[async_trait]
pub trait ResponseSurface: Send + Sync {
    /// Acknowledge the command without content yet
    async fn create_deferred(&self) -> Result<ResponseHandle, SurfaceError>;

    /// Replace a deferred acknowledgement with real content
    async fn respond(
        &self,
        handle: &ResponseHandle,
        panel: &RenderedPanel,
    ) -> Result<ResponseHandle, SurfaceError>;

    /// Edit an already materialized response
    async fn edit(
        &self,
        handle: &ResponseHandle,
        panel: &RenderedPanel,
    ) -> Result<ResponseHandle, SurfaceError>;

    async fn delete(&self, handle: &ResponseHandle) -> Result<(), SurfaceError>;
}
