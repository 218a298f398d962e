//=========================================================================
// Scene Task
//=========================================================================
//
// One running scene: a thread that owns the scene and the render surface
// until it is joined.
//
// Channels:
//   inbound  (unbounded)  manager → scene   raw input, closed to cancel
//   outbound (bounded 1)  scene → manager   at most one SceneEvent
//
// Lifecycle:
// ```text
//   spawn() ──> [thread: Scene::run] ──returns──> outbound closes
//      │                                              │
//      └─ forward() ...                 finish(): drain, join, reclaim
// ```
//
// The manager keeps a clone of the inbound receiver so that input the
// scene never consumed can be carried over to the next scene.
//
// The scene and surface reach the thread through a one-slot hand-off
// channel. If the thread cannot be started, the caller drains that slot
// and gets both back untouched.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::{Scene, SceneEvent, SceneKind};
use crate::core::input::InputEvent;
use crate::core::render::Surface;
use crate::error::GameError;

//=== Finished ============================================================

/// Everything handed back when a scene task is joined.
pub(crate) struct Finished {
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) surface: Box<dyn Surface>,

    /// Input forwarded to the scene that it never consumed, in order.
    pub(crate) undelivered: Vec<InputEvent>,
}

//=== Launching ===========================================================

/// What a scene thread hands back when it ends.
pub(crate) type Reclaimed = (Box<dyn Scene>, Box<dyn Surface>);

/// Body of a scene thread; `None` if it never received its scene.
pub(crate) type SceneBody = Box<dyn FnOnce() -> Option<Reclaimed> + Send>;

/// Starts a named scene thread.
pub(crate) type Launcher = fn(String, SceneBody) -> io::Result<JoinHandle<Option<Reclaimed>>>;

/// Default launcher: one OS thread per scene.
pub(crate) fn os_thread(name: String, body: SceneBody) -> io::Result<JoinHandle<Option<Reclaimed>>> {
    thread::Builder::new().name(name).spawn(body)
}

//--- Refused -------------------------------------------------------------

/// A scene task that could not be started.
pub(crate) struct Refused {
    /// The scene and surface, untouched.
    pub(crate) reclaimed: Option<Reclaimed>,
    pub(crate) error: GameError,
}

impl fmt::Debug for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refused")
            .field("scene", &self.reclaimed.as_ref().map(|(scene, _)| scene.kind()))
            .field("error", &self.error)
            .finish()
    }
}

//=== SceneTask ===========================================================

pub(crate) struct SceneTask {
    kind: SceneKind,
    inbound: Option<Sender<InputEvent>>,
    unconsumed: Receiver<InputEvent>,
    events: Receiver<SceneEvent>,
    handle: JoinHandle<Option<Reclaimed>>,
}

impl SceneTask {
    //--- Construction -----------------------------------------------------

    /// Moves `scene` and `surface` onto a new thread and starts `run`.
    pub(crate) fn spawn(scene: Box<dyn Scene>, surface: Box<dyn Surface>) -> Result<Self, Refused> {
        Self::spawn_with(scene, surface, os_thread)
    }

    /// Like [`SceneTask::spawn`], starting the thread with `launch`.
    pub(crate) fn spawn_with(
        scene: Box<dyn Scene>,
        surface: Box<dyn Surface>,
        launch: Launcher,
    ) -> Result<Self, Refused> {
        let kind = scene.kind();
        let (inbound_tx, inbound_rx) = unbounded::<InputEvent>();
        let (outbound_tx, outbound_rx) = bounded::<SceneEvent>(1);
        let unconsumed = inbound_rx.clone();

        let (handoff_tx, handoff_rx) = bounded::<Reclaimed>(1);
        let reclaim = handoff_rx.clone();
        if let Err(e) = handoff_tx.try_send((scene, surface)) {
            return Err(Refused {
                reclaimed: Some(e.into_inner()),
                error: GameError::SceneTask(kind),
            });
        }

        let body: SceneBody = Box::new(move || {
            let (mut scene, mut surface) = handoff_rx.recv().ok()?;
            debug!(target: "scene", "{:?} task started", kind);
            scene.run(&inbound_rx, &outbound_tx, surface.as_mut());
            debug!(target: "scene", "{:?} task finished", kind);
            // Dropping `outbound_tx` here closes the manager's view.
            Some((scene, surface))
        });

        let handle = match launch(format!("scene-{:?}", kind).to_lowercase(), body) {
            Ok(handle) => handle,
            Err(e) => {
                error!(target: "scene", "Could not spawn {:?} task: {}", kind, e);
                return Err(Refused {
                    reclaimed: reclaim.try_recv().ok(),
                    error: GameError::SceneTask(kind),
                });
            }
        };

        info!(target: "scene", "Started {:?} scene", kind);

        Ok(Self {
            kind,
            inbound: Some(inbound_tx),
            unconsumed,
            events: outbound_rx,
            handle,
        })
    }

    //--- Accessors --------------------------------------------------------

    pub(crate) fn kind(&self) -> SceneKind {
        self.kind
    }

    /// The scene's outbound channel.
    pub(crate) fn events(&self) -> &Receiver<SceneEvent> {
        &self.events
    }

    //--- Input ------------------------------------------------------------

    /// Forwards one input item; hands it back if the scene has stopped.
    pub(crate) fn forward(&self, event: InputEvent) -> Result<(), InputEvent> {
        if self.handle.is_finished() {
            return Err(event);
        }
        match &self.inbound {
            Some(sender) => sender.send(event).map_err(|e| e.0),
            None => Err(event),
        }
    }

    //--- Shutdown ---------------------------------------------------------

    /// Closes input, waits for the outbound channel to close, joins the
    /// thread and reclaims the scene and surface.
    ///
    /// Events still arriving on the outbound channel are discarded.
    pub(crate) fn finish(mut self) -> Result<Finished, GameError> {
        self.inbound.take();

        for late in self.events.iter() {
            warn!(
                target: "scene",
                "Discarding {} from stopping {:?} scene",
                late.name(),
                self.kind
            );
        }

        let (scene, surface) = match self.handle.join() {
            Ok(Some(reclaimed)) => reclaimed,
            Ok(None) | Err(_) => {
                error!(target: "scene", "{:?} scene task panicked", self.kind);
                return Err(GameError::SceneTask(self.kind));
            }
        };

        let undelivered: Vec<InputEvent> = self.unconsumed.try_iter().collect();
        if !undelivered.is_empty() {
            debug!(
                target: "scene",
                "{:?} scene left {} input item(s) unconsumed",
                self.kind,
                undelivered.len()
            );
        }

        info!(target: "scene", "Stopped {:?} scene", self.kind);

        Ok(Finished {
            scene,
            surface,
            undelivered,
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
