//=========================================================================
// Error Types
//=========================================================================
//
// Crate-wide error type surfaced by scene construction, scene tasks and
// the scene manager.
//
// Every failure path is fail-fast: construction errors return from
// `SceneManager::new`, runtime errors travel as `SceneEvent::Error` and
// end the run. A collision is never an error.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::render::RenderError;
use crate::core::scene::SceneKind;

//=== GameError ===========================================================

/// Fatal error produced anywhere in the run.
#[derive(Debug)]
pub enum GameError {
    /// Asset or font could not be loaded while constructing a scene.
    Asset {
        what: &'static str,
        source: RenderError,
    },

    /// Drawing a frame failed inside a running scene.
    Render {
        what: &'static str,
        source: RenderError,
    },

    /// A scene task panicked or vanished without reporting.
    SceneTask(SceneKind),

    /// A scene emitted an event that has no transition from its state.
    UnexpectedEvent {
        scene: SceneKind,
        event: &'static str,
    },

    /// The scene manager thread panicked.
    ManagerPanicked,

    /// The window or event loop failed.
    Platform(String),
}

impl GameError {
    pub(crate) fn asset(what: &'static str) -> impl FnOnce(RenderError) -> Self {
        move |source| Self::Asset { what, source }
    }

    pub(crate) fn render(what: &'static str) -> impl FnOnce(RenderError) -> Self {
        move |source| Self::Render { what, source }
    }
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asset { what, source } => write!(f, "could not load {}: {}", what, source),
            Self::Render { what, source } => write!(f, "could not paint {}: {}", what, source),
            Self::SceneTask(kind) => write!(f, "{:?} scene task terminated abnormally", kind),
            Self::UnexpectedEvent { scene, event } => {
                write!(f, "{:?} scene emitted unexpected event {}", scene, event)
            }
            Self::ManagerPanicked => write!(f, "scene manager thread panicked"),
            Self::Platform(e) => write!(f, "platform error: {}", e),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Asset { source, .. } | Self::Render { source, .. } => Some(source),
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
