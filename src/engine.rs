//=========================================================================
// Engine
//
// Main entry point: wires the platform, the canvas and the scene
// manager together.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_playfield()        ├─ builds scenes (main thread)
//         ├─ with_tick_period()      ├─ spawns manager thread
//         ├─ with_assets()           ├─ runs platform
//         ├─ with_seed()             └─ blocks until exit
//         └─ with_channel_capacity()
// ```
//
// Shutdown:
//   manager returns → canvas dropped → frame channel disconnects
//   → platform exits → `run` returns the manager's result
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

//=== External Dependencies ===============================================

use crossbeam_channel::bounded;
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::GameConfig;
use crate::core::input::InputEvent;
use crate::core::render::{Canvas, Frame};
use crate::core::scene::SceneManager;
use crate::error::GameError;
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Playfield**: 800x600
/// - **Tick period**: 10 ms
/// - **Assets**: `res/`
/// - **Channel capacity**: 128 events
///
/// # Examples
///
/// ```no_run
/// use aetheric_flap::EngineBuilder;
/// use std::time::Duration;
///
/// let result = EngineBuilder::new()
///     .with_assets("res")
///     .with_tick_period(Duration::from_millis(16))
///     .build()
///     .run();
///
/// if let Err(e) = result {
///     eprintln!("{}", e);
/// }
/// ```
pub struct EngineBuilder {
    config: GameConfig,
    channel_capacity: usize,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            channel_capacity: 128,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the playfield (and initial window) size.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_playfield(mut self, width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0,
            "Playfield must be non-empty, got {}x{}",
            width,
            height
        );
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Sets the wall-clock period of one simulation tick.
    ///
    /// Default: 10 ms
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        assert!(!period.is_zero(), "Tick period must be positive");
        self.config.tick_period = period;
        self
    }

    /// Sets the directory images and glyph sheets are loaded from.
    pub fn with_assets(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.asset_root = root.into();
        self
    }

    /// Makes pipe generation reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Sets the channel capacity for platform → manager input.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine {
        info!(
            target: "engine",
            "Building engine ({}x{}, tick: {:?}, channel: {})",
            self.config.width,
            self.config.height,
            self.config.tick_period,
            self.channel_capacity
        );

        Engine {
            config: self.config,
            channel_capacity: self.channel_capacity,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Game runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► SceneManager (Manager Thread)
///   │     └─► active Scene (Scene Thread) ──► Canvas
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Input, Presentation
///
/// Communication: InputEvent channel (bounded), Frame channel (one slot)
/// ```
pub struct Engine {
    config: GameConfig,
    channel_capacity: usize,
}

impl Engine {
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    //--- Execution --------------------------------------------------------

    /// Runs the game and blocks until the application exits.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the input and frame channels
    /// 2. Builds every scene against the canvas (asset errors return here)
    /// 3. Spawns the manager thread
    /// 4. Runs the platform event loop (blocks here)
    /// 5. Joins the manager and returns its result
    pub fn run(self) -> Result<(), GameError> {
        info!(target: "engine", "Starting engine runtime");

        //--- 1. Create communication channels ----------------------------
        // Frames flow to the platform; shown buffers flow back for reuse.
        let (input_tx, input_rx) = bounded::<InputEvent>(self.channel_capacity);
        let (frame_tx, frame_rx) = bounded::<Frame>(1);
        let (recycle_tx, recycle_rx) = bounded::<Vec<u8>>(2);

        //--- 2. Build scenes ----------------------------------------------
        let canvas = Canvas::new(self.config.width, self.config.height)
            .with_output(frame_tx, frame_rx.clone())
            .with_recycled(recycle_rx);
        let mut manager = SceneManager::new(Box::new(canvas), &self.config)?;

        //--- 3. Spawn the manager thread ----------------------------------
        let manager_handle = thread::Builder::new()
            .name("scene-manager".into())
            .spawn(move || {
                let result = manager.run(input_rx);
                info!(target: "engine", "Best score this session: {}", manager.best_score());
                result
            })
            .map_err(|e| GameError::Platform(format!("could not spawn scene manager: {}", e)))?;

        //--- 4. Launch the platform subsystem -----------------------------
        let platform = Platform::new(input_tx, frame_rx, recycle_tx, &self.config);
        info!(target: "engine", "Platform initialized, entering event loop");

        let platform_result = platform.run();
        if let Err(e) = &platform_result {
            error!(target: "engine", "Platform error: {}", e);
        }

        //--- 5. Cleanup: wait for the manager -----------------------------
        // The platform has been dropped, so the manager sees its input
        // close if it was still running.
        let manager_result = match manager_handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!(target: "engine", "Scene manager thread panicked");
                Err(GameError::ManagerPanicked)
            }
        };

        info!(target: "engine", "Engine shutdown complete");

        platform_result.map_err(|e| GameError::Platform(e.to_string()))?;
        manager_result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
