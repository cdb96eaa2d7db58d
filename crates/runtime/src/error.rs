//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, content lookup and persistence so
//! embedders can bubble them up with consistent context.

use thiserror::Error;
use tokio::sync::oneshot;

use realm_core::{ActorId, CatalogError};

pub use crate::persist::PersistError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("actor {0} is not in the world")]
    UnknownActor(ActorId),

    #[error("actor {0} does not accept client commands")]
    NotClientDriven(ActorId),

    #[error("runtime requires a catalog before building")]
    MissingCatalog,

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Persistence(#[from] PersistError),
}
