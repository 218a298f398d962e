//=========================================================================
// Core
//=========================================================================
//
// Engine-level contracts shared by every scene:
//
// - `input`:  portable input events produced by the platform
// - `render`: the `Surface` capability and its software `Canvas`
// - `scene`:  scene tasks and the orchestrating `SceneManager`
//
//=========================================================================

pub mod input;
pub mod render;
pub mod scene;
