use crate::NodeId;
use thiserror::Error;

/// Broad classes of [`LayoutError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The tree shape requested by the caller is not allowed.
    Structural,
    /// A leaf that has to measure itself has no way to do so.
    MeasureFunctionUndefined,
    /// The handle does not name a live node.
    InvalidNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{child:?} is already a child of {owner:?}, remove it from its owner first")]
    AlreadyOwned { child: NodeId, owner: NodeId },
    #[error("child index {index} is out of range for a node with {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{0:?} needs a measure function to be laid out")]
    MeasureFunctionUndefined(NodeId),
    #[error("{0:?} cannot have both children and a measure function")]
    MeasuredNodeWithChildren(NodeId),
    #[error("{child:?} cannot be attached under {owner:?}, it is that node or one of its owners")]
    CyclicChild { child: NodeId, owner: NodeId },
    #[error("{0:?} must be detached and have no children")]
    AttachedNode(NodeId),
    #[error("{0:?} does not refer to a live node")]
    InvalidNode(NodeId),
}

impl LayoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LayoutError::AlreadyOwned { .. }
            | LayoutError::IndexOutOfRange { .. }
            | LayoutError::MeasuredNodeWithChildren(_)
            | LayoutError::CyclicChild { .. }
            | LayoutError::AttachedNode(_) => ErrorKind::Structural,
            LayoutError::MeasureFunctionUndefined(_) => ErrorKind::MeasureFunctionUndefined,
            LayoutError::InvalidNode(_) => ErrorKind::InvalidNode,
        }
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
