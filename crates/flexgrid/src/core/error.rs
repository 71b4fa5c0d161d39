use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::NodeId;

/// Result type for flexgrid operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The id does not refer to a live node in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The node already has a parent.
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },

    #[error("invalid: {0}")]
    /// Invalid operation.
    Invalid(String),

    #[error("terminal: {0}")]
    /// Failure at the terminal boundary.
    Terminal(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Terminal(e.to_string())
    }
}
