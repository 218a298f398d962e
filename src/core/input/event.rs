//=========================================================================
// Input Event Types
//=========================================================================
//
// Defines the portable representation of raw platform input.
//
// The platform layer (winit) converts OS events into `InputEvent` and
// sends them, in order, over the manager's inbound channel. The manager
// forwards every item 1:1 to the active scene.
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    SceneManager ──forward──> active Scene
// ```
//
//=========================================================================

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// Only the keys the game or its bindings can reasonably use are listed;
/// everything else maps to `Unidentified` and is filtered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,

    /// Fallback for keys not explicitly mapped by the input layer.
    Unidentified,
}

//=== InputEvent ==========================================================

/// Raw input item delivered by the platform.
///
/// Only presses are reported; releases and cursor motion are consumed by
/// the platform layer (cursor position is attached to `PointerDown`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The user or OS asked the application to quit.
    Quit,

    /// Primary pointer pressed at window coordinates (pixels, top-left origin).
    PointerDown { x: f32, y: f32 },

    /// Key pressed down.
    KeyDown(KeyCode),
}

impl InputEvent {
    /// Returns true for a pointer press, or a key press listed in `keys`.
    ///
    /// Scenes use this to treat configured keys exactly like a click.
    pub fn is_press(&self, keys: &[KeyCode]) -> bool {
        match self {
            Self::PointerDown { .. } => true,
            Self::KeyDown(code) => keys.contains(code),
            Self::Quit => false,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
