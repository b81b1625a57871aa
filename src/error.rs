use thiserror::Error;

use crate::layer::LayerId;

/// Errors raised by document and editor operations.
///
/// The interactive editor logs these and treats the operation as a no-op;
/// the document API returns them so callers can tell what was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("layer {0} does not exist")]
    LayerNotFound(LayerId),

    #[error("layer id {0} is already in use")]
    DuplicateId(LayerId),

    #[error("layer {parent} cannot own layer {child}")]
    InvalidParent { child: LayerId, parent: LayerId },

    #[error("making {parent} the parent of {child} would create a cycle")]
    ParentCycle { child: LayerId, parent: LayerId },

    #[error("layer {0} is not a group")]
    NotAGroup(LayerId),

    #[error("grouping needs at least two layers, got {0}")]
    GroupTooSmall(usize),

    #[error("layers to group do not share a parent")]
    MixedParents,

    #[error("scale must be positive and finite, got {0}")]
    InvalidScale(f32),

    #[error("canvas size must be positive, got {width}x{height}")]
    InvalidCanvasSize { width: f32, height: f32 },

    #[error("cannot transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("nothing to apply")]
    NothingToApply,
}

pub type EditorResult<T> = Result<T, EditorError>;
