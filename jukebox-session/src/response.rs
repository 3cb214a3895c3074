//! Response lifecycle state machine
//!
//! Transition table:
//!
//! | state    | `update`                 | `delete`                   |
//! |----------|--------------------------|----------------------------|
//! | Deferred | respond, then Active     | remote delete, then Deleted |
//! | Active   | edit, stays Active       | remote delete, then Deleted |
//! | Deleted  | no-op                    | no-op                      |
//!
//! A remote "not found" from any call moves the lifecycle to Deleted and is
//! not reported as an error. Any other failure leaves the state untouched and
//! is returned to the caller.
//!
//! The lifecycle holds a single mutable cell and takes `&mut self`; the owner
//! serializes calls.

use crate::render::RenderedPanel;
use crate::surface::{ResponseHandle, ResponseSurface, SurfaceError};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseState {
    /// Acknowledged, no content sent yet
    Deferred(ResponseHandle),
    /// Materialized and editable
    Active(ResponseHandle),
    /// Terminal
    Deleted,
}

/// What an [`update`](ResponseLifecycle::update) call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Deferred response received its first content
    Materialized,
    /// Active response edited in place
    Edited,
    /// The remote reported the response gone; lifecycle is now Deleted
    Gone,
    /// Lifecycle was already Deleted; nothing sent
    Skipped,
}

pub struct ResponseLifecycle {
    surface: Arc<dyn ResponseSurface>,
    state: ResponseState,
}

impl ResponseLifecycle {
    /// Wrap an already deferred response
    pub fn deferred(surface: Arc<dyn ResponseSurface>, handle: ResponseHandle) -> Self {
        Self {
            surface,
            state: ResponseState::Deferred(handle),
        }
    }

    /// Acknowledge a command on `surface` and wrap the deferred response
    pub async fn defer(surface: Arc<dyn ResponseSurface>) -> Result<Self, SurfaceError> {
        let handle = surface.create_deferred().await?;
        Ok(Self::deferred(surface, handle))
    }

    pub fn state(&self) -> &ResponseState {
        &self.state
    }

    pub fn is_deleted(&self) -> bool {
        self.state == ResponseState::Deleted
    }

    /// Send fresh content, materializing or editing as the state requires
    ///
    /// `render` is only invoked when something will actually be sent.
    pub async fn update<F>(&mut self, render: F) -> Result<UpdateOutcome, SurfaceError>
    where
        F: FnOnce() -> RenderedPanel + Send,
    {
        let (result, materializing) = match &self.state {
            ResponseState::Deleted => return Ok(UpdateOutcome::Skipped),
            ResponseState::Deferred(handle) => {
                let panel = render();
                (self.surface.respond(handle, &panel).await, true)
            }
            ResponseState::Active(handle) => {
                let panel = render();
                (self.surface.edit(handle, &panel).await, false)
            }
        };

        match result {
            Ok(live) => {
                self.state = ResponseState::Active(live);
                Ok(if materializing {
                    UpdateOutcome::Materialized
                } else {
                    UpdateOutcome::Edited
                })
            }
            Err(SurfaceError::NotFound) => {
                debug!("Response gone during update, treating as deleted");
                self.state = ResponseState::Deleted;
                Ok(UpdateOutcome::Gone)
            }
            Err(e) => Err(e),
        }
    }

    /// Move to Deleted, removing the remote response if one is held
    ///
    /// The state is Deleted afterwards even when the remote call fails.
    pub async fn delete(&mut self) -> Result<(), SurfaceError> {
        let handle = match std::mem::replace(&mut self.state, ResponseState::Deleted) {
            ResponseState::Deleted => return Ok(()),
            ResponseState::Deferred(handle) | ResponseState::Active(handle) => handle,
        };

        match self.surface.delete(&handle).await {
            Ok(()) | Err(SurfaceError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Hand the live response over to a new owner
    ///
    /// The returned lifecycle carries the current state; `self` is left
    /// Deleted, so deleting it afterwards touches nothing remote.
    pub fn take(&mut self) -> Self {
        Self {
            surface: Arc::clone(&self.surface),
            state: std::mem::replace(&mut self.state, ResponseState::Deleted),
        }
    }
}

impl std::fmt::Debug for ResponseLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseLifecycle")
            .field("state", &self.state)
            .finish()
    }
}
