//=========================================================================
// Scene Manager
//=========================================================================
//
// Top-level FSM over {Splash, Game, GameOver}.
//
// The manager owns every scene and the render surface while no scene is
// running. Starting a scene moves both onto the scene's thread; joining
// the thread hands them back. At most one scene task is alive at a time.
//
// Transition table:
// ```text
//   Splash   ──StartGame──> Game
//   Game     ──EndGame────> GameOver
//   GameOver ──StartGame──> Game
// ```
//
// Anything else is a protocol violation and ends the run with an error.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::{HashMap, VecDeque};

//=== External Dependencies ===============================================

use crossbeam_channel::{select, Receiver};
use log::{debug, error, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::task::{os_thread, Launcher, SceneTask};
use super::{Scene, SceneContext, SceneEvent, SceneKind};
use crate::config::GameConfig;
use crate::core::input::InputEvent;
use crate::core::render::Surface;
use crate::error::GameError;
use crate::game::{GameOverScene, GameScene, SplashScene};

//=== Transition Table ====================================================

/// Scene that follows `current` when it emits `event`.
///
/// Returns `None` for terminal events (`Quit`, `Error`) and for pairs
/// that are not part of the protocol.
pub fn next_scene(current: SceneKind, event: &SceneEvent) -> Option<SceneKind> {
    match (current, event) {
        (SceneKind::Splash, SceneEvent::StartGame) => Some(SceneKind::Game),
        (SceneKind::Game, SceneEvent::EndGame { .. }) => Some(SceneKind::GameOver),
        (SceneKind::GameOver, SceneEvent::StartGame) => Some(SceneKind::Game),
        _ => None,
    }
}

//=== Wake ================================================================

/// What woke the manager loop.
enum Wake {
    Input(InputEvent),
    InputClosed,
    Scene(SceneEvent),
    SceneClosed,
}

//=== Scene Manager =======================================================

pub struct SceneManager {
    scenes: HashMap<SceneKind, Box<dyn Scene>>,
    surface: Option<Box<dyn Surface>>,
    best_score: u32,

    /// Input waiting for the next scene, oldest first.
    pending: VecDeque<InputEvent>,

    launch: Launcher,
}

impl SceneManager {
    //--- Construction -----------------------------------------------------

    /// Builds the three game scenes, loading their assets on `surface`.
    ///
    /// Any asset failure is returned here; scenes created before the
    /// failure are destroyed first.
    pub fn new(mut surface: Box<dyn Surface>, config: &GameConfig) -> Result<Self, GameError> {
        let mut built: Vec<Box<dyn Scene>> = Vec::with_capacity(3);

        let result = (|| -> Result<(), GameError> {
            built.push(Box::new(SplashScene::new(surface.as_mut(), config)?));
            built.push(Box::new(GameScene::new(surface.as_mut(), config)?));
            built.push(Box::new(GameOverScene::new(surface.as_mut(), config)?));
            Ok(())
        })();

        if let Err(e) = result {
            error!(target: "scene", "Scene construction failed: {}", e);
            for scene in built.iter_mut() {
                scene.destroy(surface.as_mut());
            }
            return Err(e);
        }

        Ok(Self::with_scenes(surface, built))
    }

    /// Creates a manager over already constructed scenes.
    ///
    /// A later scene of the same kind replaces an earlier one.
    pub fn with_scenes(surface: Box<dyn Surface>, scenes: Vec<Box<dyn Scene>>) -> Self {
        let mut map = HashMap::with_capacity(scenes.len());
        for scene in scenes {
            let kind = scene.kind();
            if map.insert(kind, scene).is_some() {
                warn!(target: "scene", "Scene {:?} was registered twice; keeping the last", kind);
            }
        }

        Self {
            scenes: map,
            surface: Some(surface),
            best_score: 0,
            pending: VecDeque::new(),
            launch: os_thread,
        }
    }

    //--- Accessors --------------------------------------------------------

    /// Best score seen across all rounds of this run.
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    //--- Main Loop --------------------------------------------------------

    /// Runs the FSM from Splash until quit, shutdown or a fatal error.
    ///
    /// Closing `input` is the shutdown signal. Every scene is destroyed
    /// before this returns, whatever the outcome.
    pub fn run(&mut self, input: Receiver<InputEvent>) -> Result<(), GameError> {
        info!(target: "scene", "Scene manager running");

        let result = self.drive(&input);

        self.destroy_scenes();

        match &result {
            Ok(()) => info!(target: "scene", "Scene manager finished"),
            Err(e) => error!(target: "scene", "Scene manager failed: {}", e),
        }
        result
    }

    fn drive(&mut self, input: &Receiver<InputEvent>) -> Result<(), GameError> {
        let mut task = self.start(SceneKind::Splash)?;

        loop {
            let events = task.events().clone();
            let wake = select! {
                recv(input) -> msg => match msg {
                    Ok(event) => Wake::Input(event),
                    Err(_) => Wake::InputClosed,
                },
                recv(events) -> msg => match msg {
                    Ok(event) => Wake::Scene(event),
                    Err(_) => Wake::SceneClosed,
                },
            };

            match wake {
                Wake::Input(event) => {
                    trace!(target: "scene", "Forwarding {:?} to {:?}", event, task.kind());
                    if let Err(event) = task.forward(event) {
                        self.pending.push_back(event);
                    }
                }

                Wake::InputClosed => {
                    info!(target: "scene", "Input closed, stopping {:?}", task.kind());
                    self.stop(task)?;
                    return Ok(());
                }

                Wake::SceneClosed => {
                    let kind = task.kind();
                    error!(target: "scene", "{:?} scene stopped without an event", kind);
                    self.stop(task)?;
                    return Err(GameError::SceneTask(kind));
                }

                Wake::Scene(SceneEvent::Quit) => {
                    info!(target: "scene", "{:?} scene requested quit", task.kind());
                    self.stop(task)?;
                    return Ok(());
                }

                Wake::Scene(SceneEvent::Error(e)) => {
                    error!(target: "scene", "{:?} scene failed: {}", task.kind(), e);
                    if let Err(join) = self.stop(task) {
                        warn!(target: "scene", "Cleanup after failure also failed: {}", join);
                    }
                    return Err(e);
                }

                Wake::Scene(event) => {
                    let from = task.kind();
                    let Some(to) = next_scene(from, &event) else {
                        error!(target: "scene", "{:?} scene sent unexpected {}", from, event.name());
                        self.stop(task)?;
                        return Err(GameError::UnexpectedEvent {
                            scene: from,
                            event: event.name(),
                        });
                    };

                    if let SceneEvent::EndGame { score, best_score } = event {
                        self.best_score = self.best_score.max(best_score).max(score);
                        debug!(
                            target: "scene",
                            "Round over: score {}, best {}",
                            score,
                            self.best_score
                        );
                    }

                    info!(target: "scene", "Transition {:?} -> {:?}", from, to);
                    self.stop(task)?;
                    task = self.start(to)?;
                }
            }
        }
    }

    //--- Scene Lifecycle --------------------------------------------------

    /// Hands the surface to `kind` and starts its task, delivering any
    /// carried-over input first.
    fn start(&mut self, kind: SceneKind) -> Result<SceneTask, GameError> {
        let Some(mut scene) = self.scenes.remove(&kind) else {
            error!(target: "scene", "Scene {:?} is not registered", kind);
            return Err(GameError::SceneTask(kind));
        };
        let Some(surface) = self.surface.take() else {
            self.scenes.insert(kind, scene);
            error!(target: "scene", "Render surface unavailable for {:?}", kind);
            return Err(GameError::SceneTask(kind));
        };

        scene.on_enter(&SceneContext {
            best_score: self.best_score,
        });

        let task = match SceneTask::spawn_with(scene, surface, self.launch) {
            Ok(task) => task,
            Err(refused) => {
                if let Some((scene, surface)) = refused.reclaimed {
                    self.scenes.insert(kind, scene);
                    self.surface = Some(surface);
                }
                return Err(refused.error);
            }
        };

        if !self.pending.is_empty() {
            debug!(
                target: "scene",
                "Delivering {} carried-over input item(s) to {:?}",
                self.pending.len(),
                kind
            );
        }
        while let Some(event) = self.pending.pop_front() {
            if let Err(event) = task.forward(event) {
                self.pending.push_front(event);
                break;
            }
        }

        Ok(task)
    }

    /// Joins `task` and takes back its scene and the surface.
    ///
    /// Input the scene never consumed goes ahead of anything already
    /// pending.
    fn stop(&mut self, task: SceneTask) -> Result<(), GameError> {
        let finished = task.finish()?;

        self.scenes.insert(finished.scene.kind(), finished.scene);
        self.surface = Some(finished.surface);

        let mut carried: VecDeque<InputEvent> = finished.undelivered.into();
        carried.append(&mut self.pending);
        self.pending = carried;

        Ok(())
    }

    fn destroy_scenes(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            warn!(
                target: "scene",
                "Render surface lost; {} scene(s) not destroyed",
                self.scenes.len()
            );
            return;
        };

        for (kind, mut scene) in self.scenes.drain() {
            debug!(target: "scene", "Destroying {:?} scene", kind);
            scene.destroy(surface.as_mut());
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
