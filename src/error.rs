//! Error taxonomy for the porcelain core. Kinds, not incidental messages.

use thiserror::Error;

use crate::hash::ObjectId;

#[derive(Debug, Error)]
pub enum PorcelainError {
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("not a repository: '{0}'")]
    RepositoryMissing(String),

    #[error("revision '{0}' did not resolve to an object")]
    RefNotResolvable(String),

    #[error("could not update the staged index: {0}")]
    IndexUpdateFailed(String),

    #[error("commit failed: could not lock HEAD for ref update")]
    CommitFailedReflogLocked,

    #[error("object {0} is corrupt or unreadable")]
    CorruptObject(ObjectId),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("status reconciliation reached an unhandled case for {path}: wd={wd:?} idx={idx:?} repo={repo:?}")]
    UnexpectedStatusCase {
        path: String,
        wd: Option<ObjectId>,
        idx: Option<ObjectId>,
        repo: Option<ObjectId>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PorcelainError>;
