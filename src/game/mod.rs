//=========================================================================
// Game
//=========================================================================
//
// The three concrete scenes and the entities they simulate.
//
// Components:
// - `bird`, `pipe`: entities with physics and painting
// - `world`: per-tick rules (collision, spawn, scroll, scoring)
// - `splash`, `play`, `game_over`: `Scene` implementations
//
// Asset layout under `GameConfig::asset_root`:
// ```text
//   imgs/background.png
//   imgs/pipe.png
//   imgs/bird_frame_{1..4}.png
//   fonts/flappy.png      glyph sheet: title, score, captions
//   fonts/vanilla.png     glyph sheet: prompt
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender};
use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode};
use crate::core::render::{Color, Flip, FontId, Rect, RenderError, Surface};
use crate::core::scene::{emit, SceneEvent, SceneKind};

//=== Module Declarations =================================================

mod assets;
pub mod bird;
pub mod pipe;
pub mod world;

mod game_over;
mod play;
mod splash;

//=== Public API ==========================================================

pub use game_over::GameOverScene;
pub use play::GameScene;
pub use splash::SplashScene;

//=== Assets ==============================================================

pub const BACKGROUND_IMAGE: &str = "imgs/background.png";
pub const PIPE_IMAGE: &str = "imgs/pipe.png";
pub const BIRD_FRAMES: [&str; 4] = [
    "imgs/bird_frame_1.png",
    "imgs/bird_frame_2.png",
    "imgs/bird_frame_3.png",
    "imgs/bird_frame_4.png",
];

pub const TITLE_FONT: &str = "fonts/flappy.png";
pub const PROMPT_FONT: &str = "fonts/vanilla.png";

//=== Text ================================================================

/// Where a rendered string lands.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TextPlacement {
    /// Natural size, centred horizontally on a playfield of `width`.
    Centred { width: i32, y: i32 },

    /// Stretched to fill the rect.
    Fill(Rect),
}

/// Renders `text` to a temporary texture, copies it and releases it.
///
/// The texture is released even when the copy fails.
pub(crate) fn draw_text(
    surface: &mut dyn Surface,
    font: FontId,
    text: &str,
    color: Color,
    placement: TextPlacement,
) -> Result<(), RenderError> {
    let texture = surface.render_text(font, text, color)?;

    let dest = match placement {
        TextPlacement::Fill(rect) => Ok(rect),
        TextPlacement::Centred { width, y } => surface
            .texture_size(texture)
            .map(|(w, h)| Rect::new(width / 2 - w as i32 / 2, y, w as i32, h as i32)),
    };
    let result = dest.and_then(|dest| surface.copy_texture(texture, dest, 0.0, Flip::None));

    surface.destroy_texture(texture);
    result
}

//=== Input ===============================================================

/// Blocks until a press or quit arrives and emits the matching event.
///
/// Returns without emitting when `inbound` closes.
pub(crate) fn await_start(
    kind: SceneKind,
    inbound: &Receiver<InputEvent>,
    outbound: &Sender<SceneEvent>,
    flap_keys: &[KeyCode],
) {
    for event in inbound.iter() {
        if event == InputEvent::Quit {
            emit(outbound, SceneEvent::Quit);
            return;
        }
        if event.is_press(flap_keys) {
            debug!(target: "scene", "{:?} scene: start requested", kind);
            emit(outbound, SceneEvent::StartGame);
            return;
        }
    }
    debug!(target: "scene", "{:?} scene: input closed", kind);
}

//=========================================================================
// Unit Tests
//=========================================================================
