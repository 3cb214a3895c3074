//! Error types for the session crate

use crate::engine::EngineError;
use crate::loader::LoadError;
use crate::surface::SurfaceError;
use crate::transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// The session finished before the request could be applied
    #[error("Session closed")]
    SessionClosed,

    #[error("Common error: {0}")]
    Common(#[from] jukebox_common::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
