//=========================================================================
// Input
//=========================================================================
//
// Portable input types shared by the platform layer and the scenes.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, MouseButton};
