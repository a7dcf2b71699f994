pub mod emitter;
pub mod id;
pub mod layout;
pub mod model;
pub mod parser;
pub mod reducer;

pub use emitter::emit_outline;
pub use id::{MapId, NodeId};
pub use layout::{Layout, LayoutConfig, compute_layout, topology_fingerprint};
pub use model::*;
pub use parser::parse_outline;
pub use reducer::{Action, reduce};
