//=========================================================================
// Scene System
//=========================================================================
//
// Scenes are independent tasks coordinated by the `SceneManager`.
//
// Architecture:
// ```text
//   SceneManager
//     ├─ scenes: HashMap<SceneKind, Box<dyn Scene>>
//     ├─ surface: Option<Box<dyn Surface>>
//     └─ active: SceneTask ──thread──> Scene::run(inbound, outbound, surface)
//
//   platform ──InputEvent──> manager ──InputEvent──> scene
//                            manager <──SceneEvent── scene
// ```
//
// Flow:
//   start(kind) → on_enter() → spawn → run() … emits one SceneEvent
//   → manager drains + joins → next_scene() → start(next)
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;
use crate::core::render::Surface;
use crate::error::GameError;

//=== Module Declarations =================================================

mod manager;
mod task;

//=== Public API ==========================================================

pub use manager::{next_scene, SceneManager};

//=== SceneKind ===========================================================

/// Identifies one of the three scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Splash,
    Game,
    GameOver,
}

//=== SceneEvent ==========================================================

/// Outbound event from a scene to the manager.
///
/// A scene emits at most one event and then returns from `run`.
#[derive(Debug)]
pub enum SceneEvent {
    /// The user asked to quit.
    Quit,

    /// A fatal error occurred inside the scene.
    Error(GameError),

    /// Start (or restart) a round.
    StartGame,

    /// The round ended; the bird hit the floor after a collision.
    EndGame { score: u32, best_score: u32 },
}

impl SceneEvent {
    /// Variant name, for logs and protocol errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::Error(_) => "Error",
            Self::StartGame => "StartGame",
            Self::EndGame { .. } => "EndGame",
        }
    }
}

//=== SceneContext ========================================================

/// Values the manager hands to a scene when it becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneContext {
    /// Best score of the session so far.
    pub best_score: u32,
}

//=== Scene Trait =========================================================

/// A scene runs on its own thread while it holds the render surface.
///
/// # Contract
///
/// - `run` returns after sending at most one event on `outbound`.
/// - `run` returns when `inbound` is closed (no event is required).
/// - `destroy` releases every asset the scene loaded on `surface`.
pub trait Scene: Send {
    /// Which FSM state this scene implements.
    fn kind(&self) -> SceneKind;

    /// Called on the manager thread right before the scene task starts.
    ///
    /// Default implementation does nothing.
    fn on_enter(&mut self, _context: &SceneContext) {}

    /// Scene main loop.
    fn run(
        &mut self,
        inbound: &Receiver<InputEvent>,
        outbound: &Sender<SceneEvent>,
        surface: &mut dyn Surface,
    );

    /// Releases the scene's textures and fonts.
    fn destroy(&mut self, surface: &mut dyn Surface);
}

//=== Helpers =============================================================

/// Sends `event` to the manager, logging if nobody listens anymore.
pub(crate) fn emit(outbound: &Sender<SceneEvent>, event: SceneEvent) {
    if let Err(e) = outbound.send(event) {
        warn!(target: "scene", "Manager gone, dropping {}", e.0.name());
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn event_names() {
        assert_eq!(SceneEvent::Quit.name(), "Quit");
        assert_eq!(SceneEvent::StartGame.name(), "StartGame");
        assert_eq!(
            SceneEvent::EndGame { score: 1, best_score: 2 }.name(),
            "EndGame"
        );
        assert_eq!(
            SceneEvent::Error(GameError::SceneTask(SceneKind::Game)).name(),
            "Error"
        );
    }

    #[test]
    fn emit_delivers_event() {
        let (tx, rx) = bounded(1);
        emit(&tx, SceneEvent::StartGame);
        assert!(matches!(rx.try_recv(), Ok(SceneEvent::StartGame)));
    }

    #[test]
    fn emit_tolerates_closed_channel() {
        let (tx, rx) = bounded(1);
        drop(rx);
        emit(&tx, SceneEvent::Quit);
    }

    #[test]
    fn scene_event_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SceneEvent>();
    }
}
