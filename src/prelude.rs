//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_flap::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::config::GameConfig;
pub use crate::error::GameError;

// Input
pub use crate::core::input::{InputEvent, KeyCode, MouseButton};

// Rendering
pub use crate::core::render::{Canvas, Color, Flip, Rect, Surface};

// Scenes
pub use crate::core::scene::{Scene, SceneContext, SceneEvent, SceneKind, SceneManager};
