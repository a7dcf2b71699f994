pub mod commands;
pub mod config;
pub mod engine;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;
pub mod viewport;

pub use commands::History;
pub use config::{EditorConfig, InteractionConfig};
pub use engine::{Direction, EditorEngine, LayoutCache};
pub use input::{InputEvent, Modifiers, Touches};
pub use interaction::{Gesture, InteractionController, NodeHit};
pub use session::Session;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use viewport::Viewport;
