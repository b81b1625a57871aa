mod context;
mod editor_state;
mod persistence;

pub use context::{EditorContext, TransformUpdate};
pub use editor_state::EditorState;
pub use persistence::{DocumentSnapshot, PersistenceError, PersistenceResult};
