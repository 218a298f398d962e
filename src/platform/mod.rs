//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the scene manager thread.
//
// Architecture:
// ```text
//  Main Thread:                     Manager Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  Winit Event Loop        │    │  SceneManager    │
//  │   ↓                      │    │   ↓              │
//  │  InputProcessor ─────────┼───>│  active Scene    │
//  │   (InputEvent, ordered)  │    │   ↓              │
//  │                          │    │  Canvas          │
//  │  pixels::Pixels <────────┼────┤   present()      │
//  │   RedrawRequested        │    └──────────────────┘
//  └──────────────────────────┘         Frame
// ```
//
// Key Design Decisions:
// - **Main thread requirement**: Winit mandates main thread on macOS/iOS,
//   so this runs on the thread that called `Engine::run()`
// - **Manager owns shutdown**: closing the window sends `Quit`; the loop
//   exits once the frame channel disconnects, i.e. the manager returned
// - **Graceful channel disconnect**: if the manager is already gone the
//   platform exits immediately
//
// Responsibilities:
// - Create and manage the OS window and pixel buffer
// - Convert Winit types → engine InputEvents
// - Present the most recent frame published by the canvas
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== Standard Library Imports ============================================

use std::sync::Arc;
use std::time::{Duration, Instant};

//=== External Crates =====================================================

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use log::*;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::config::GameConfig;
use crate::core::input::InputEvent;
use crate::core::render::Frame;
use input_processor::InputProcessor;

//=== Constants ===========================================================

/// How often the loop wakes to look for new frames.
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(4);

const WINDOW_TITLE: &str = "Flappy Bird";

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: without a window or a pixel buffer there is nothing
/// to play on.
#[derive(Debug)]
pub(crate) enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    EventLoopCreation(winit::error::EventLoopError),

    /// Event loop execution error (rare, indicates corruption).
    EventLoopExecution(winit::error::EventLoopError),

    /// The OS refused to create the window.
    WindowCreation(winit::error::OsError),

    /// The pixel buffer could not be created or drawn.
    Renderer(pixels::Error),
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
            Self::WindowCreation(e) => write!(f, "Window creation failed: {}", e),
            Self::Renderer(e) => write!(f, "Renderer error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EventLoopCreation(e) | Self::EventLoopExecution(e) => Some(e),
            Self::WindowCreation(e) => Some(e),
            Self::Renderer(e) => Some(e),
        }
    }
}

//=== FramePoll ===========================================================

/// Outcome of draining the frame channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePoll {
    Fresh,
    Unchanged,
    /// Every frame sender is gone: the manager has returned.
    Finished,
}

//=== Platform ============================================================

/// Window, input source and frame presenter.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(...)` - no window yet
/// 2. **Execution**: `platform.run()` - blocks in the event loop
/// 3. **Shutdown**: frame channel disconnects → loop exits → `run` returns
///
/// Dropping the platform drops the input sender, which the manager sees
/// as upstream shutdown.
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,

    /// Playfield size; the pixel buffer is always this size.
    buffer_size: (u32, u32),

    input: Sender<InputEvent>,
    /// A close request that found the input channel full.
    pending_quit: bool,

    frames: Receiver<Frame>,
    latest: Option<Frame>,
    /// Shown frames go back to the canvas for reuse.
    recycle: Sender<Vec<u8>>,

    input_processor: InputProcessor,
    failure: Option<PlatformError>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(
        input: Sender<InputEvent>,
        frames: Receiver<Frame>,
        recycle: Sender<Vec<u8>>,
        config: &GameConfig,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            pixels: None,
            buffer_size: (config.width, config.height),
            input,
            pending_quit: false,
            frames,
            latest: None,
            recycle,
            input_processor: InputProcessor::new(),
            failure: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the manager finishes or a fatal error.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)?;

        info!(target: "platform", "Event loop exited");
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends one input item to the manager without blocking the UI.
    ///
    /// A `Quit` that finds the channel full is retried on every wake-up
    /// until it is delivered. Returns false once the manager is gone.
    fn send_input(&mut self, event: InputEvent) -> bool {
        match self.input.try_send(event) {
            Ok(()) => {
                trace!(target: "platform::input", "Sent {:?}", event);
                true
            }
            Err(TrySendError::Full(InputEvent::Quit)) => {
                warn!(target: "platform::input", "Input channel full, retrying Quit");
                self.pending_quit = true;
                true
            }
            Err(TrySendError::Full(event)) => {
                warn!(target: "platform::input", "Input channel full, dropping {:?}", event);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(target: "platform::input", "Manager gone, input ignored");
                false
            }
        }
    }

    /// Delivers a postponed `Quit`. Returns false once the manager is gone.
    fn retry_quit(&mut self) -> bool {
        if !self.pending_quit {
            return true;
        }
        match self.input.try_send(InputEvent::Quit) {
            Ok(()) => {
                debug!(target: "platform::input", "Postponed Quit delivered");
                self.pending_quit = false;
                true
            }
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Takes the newest pending frame, if any.
    fn poll_frames(&mut self) -> FramePoll {
        let mut poll = FramePoll::Unchanged;
        loop {
            match self.frames.try_recv() {
                Ok(frame) => {
                    if let Some(shown) = self.latest.replace(frame) {
                        if self.recycle.try_send(shown.pixels).is_err() {
                            trace!(target: "platform", "Canvas not taking buffers back");
                        }
                    }
                    poll = FramePoll::Fresh;
                }
                Err(TryRecvError::Empty) => return poll,
                Err(TryRecvError::Disconnected) => return FramePoll::Finished,
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: PlatformError) {
        error!(target: "platform", "{}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformError> {
        let (width, height) = self.buffer_size;
        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(width, height))
            .with_min_inner_size(LogicalSize::new(width / 2, height / 2));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(PlatformError::WindowCreation)?,
        );

        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(width, height, surface).map_err(PlatformError::Renderer)?;

        info!(
            target: "platform",
            "Window created: {}x{} @ {}x DPI",
            size.width,
            size.height,
            window.scale_factor()
        );

        self.pixels = Some(pixels);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) -> Result<(), PlatformError> {
        let Some(pixels) = self.pixels.as_mut() else {
            return Ok(());
        };

        if let Some(frame) = &self.latest {
            let target = pixels.frame_mut();
            if target.len() == frame.pixels.len() {
                target.copy_from_slice(&frame.pixels);
            } else {
                warn!(
                    target: "platform",
                    "Frame size {}x{} does not match buffer",
                    frame.width,
                    frame.height
                );
            }
        }

        pixels.render().map_err(PlatformError::Renderer)
    }

    /// Maps window coordinates onto the playfield.
    fn to_playfield(&self, x: f64, y: f64) -> (f32, f32) {
        let position = (x as f32, y as f32);
        match &self.pixels {
            Some(pixels) => match pixels.window_pos_to_pixel(position) {
                Ok((px, py)) => (px as f32, py as f32),
                Err((px, py)) => (px as f32, py as f32),
            },
            None => position,
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called when app becomes active (startup or mobile resume).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                if !self.send_input(InputEvent::Quit) {
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(pixels) = self.pixels.as_mut() {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        self.fail(event_loop, PlatformError::Renderer(e.into()));
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = self.to_playfield(position.x, position.y);
                self.input_processor.process_cursor_moved(x, y);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match self.input_processor.process_key_event(&key_event) {
                    Some(event) => {
                        self.send_input(event);
                    }
                    None => trace!(target: "platform::input", "Key event ignored"),
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(event) = self.input_processor.process_mouse_button(button, state) {
                    self.send_input(event);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }

            _ => {
                // Ignore: Focused, Moved, etc.
            }
        }
    }

    /// Picks up new frames and schedules the next wake-up.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.retry_quit() {
            info!(target: "platform", "Scene manager gone, closing window");
            event_loop.exit();
            return;
        }

        match self.poll_frames() {
            FramePoll::Finished => {
                info!(target: "platform", "Scene manager finished, closing window");
                event_loop.exit();
                return;
            }
            FramePoll::Fresh => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            FramePoll::Unchanged => {}
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME_POLL_INTERVAL));
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::KeyCode;
    use crossbeam_channel::{bounded, unbounded};

    struct Harness {
        platform: Platform,
        input_rx: Receiver<InputEvent>,
        frame_tx: Sender<Frame>,
        recycled_rx: Receiver<Vec<u8>>,
    }

    fn harness() -> Harness {
        let (input_tx, input_rx) = bounded(2);
        let (frame_tx, frame_rx) = unbounded();
        let (recycle_tx, recycled_rx) = bounded(1);
        let platform = Platform::new(input_tx, frame_rx, recycle_tx, &GameConfig::default());
        Harness {
            platform,
            input_rx,
            frame_tx,
            recycled_rx,
        }
    }

    fn frame(fill: u8) -> Frame {
        Frame {
            width: 1,
            height: 1,
            pixels: vec![fill; 4],
        }
    }

    #[test]
    fn platform_creation() {
        let h = harness();
        assert!(h.platform.window.is_none(), "Window should be created lazily");
        assert_eq!(h.platform.buffer_size, (800, 600));
        assert!(!h.platform.pending_quit);
    }

    #[test]
    fn send_input_forwards_in_order() {
        let mut h = harness();

        assert!(h.platform.send_input(InputEvent::PointerDown { x: 1.0, y: 2.0 }));
        assert!(h.platform.send_input(InputEvent::Quit));

        assert_eq!(h.input_rx.try_recv(), Ok(InputEvent::PointerDown { x: 1.0, y: 2.0 }));
        assert_eq!(h.input_rx.try_recv(), Ok(InputEvent::Quit));
    }

    #[test]
    fn send_input_drops_presses_when_full_but_keeps_running() {
        let mut h = harness();
        h.platform.send_input(InputEvent::KeyDown(KeyCode::Space));
        h.platform.send_input(InputEvent::KeyDown(KeyCode::Space));

        let press = InputEvent::PointerDown { x: 0.0, y: 0.0 };
        assert!(h.platform.send_input(press), "full channel is not fatal");
        assert_eq!(h.input_rx.len(), 2);
        assert!(!h.platform.pending_quit);
    }

    #[test]
    fn quit_on_full_channel_is_delivered_later() {
        let mut h = harness();
        let press = InputEvent::PointerDown { x: 0.0, y: 0.0 };
        h.platform.send_input(press);
        h.platform.send_input(press);

        assert!(h.platform.send_input(InputEvent::Quit));
        assert!(h.platform.pending_quit);

        // Still full: the retry keeps waiting.
        assert!(h.platform.retry_quit());
        assert!(h.platform.pending_quit);

        assert_eq!(h.input_rx.try_recv(), Ok(press));
        assert!(h.platform.retry_quit());
        assert!(!h.platform.pending_quit);

        assert_eq!(h.input_rx.try_recv(), Ok(press));
        assert_eq!(h.input_rx.try_recv(), Ok(InputEvent::Quit));
    }

    #[test]
    fn postponed_quit_notices_finished_manager() {
        let mut h = harness();
        let press = InputEvent::PointerDown { x: 0.0, y: 0.0 };
        h.platform.send_input(press);
        h.platform.send_input(press);
        h.platform.send_input(InputEvent::Quit);

        drop(h.input_rx);
        assert!(!h.platform.retry_quit());
    }

    #[test]
    fn send_input_reports_disconnected_manager() {
        let mut h = harness();
        drop(h.input_rx);
        assert!(!h.platform.send_input(InputEvent::Quit));
    }

    #[test]
    fn poll_keeps_newest_frame() {
        let mut h = harness();
        h.frame_tx.send(frame(1)).unwrap();
        h.frame_tx.send(frame(2)).unwrap();

        assert_eq!(h.platform.poll_frames(), FramePoll::Fresh);
        assert_eq!(h.platform.latest, Some(frame(2)));
        assert_eq!(h.platform.poll_frames(), FramePoll::Unchanged);
    }

    #[test]
    fn replaced_frame_buffer_goes_back_to_the_canvas() {
        let mut h = harness();
        h.frame_tx.send(frame(1)).unwrap();
        h.platform.poll_frames();
        assert!(h.recycled_rx.is_empty(), "shown frame is still needed");

        h.frame_tx.send(frame(2)).unwrap();
        h.platform.poll_frames();
        assert_eq!(h.recycled_rx.try_recv(), Ok(vec![1; 4]));
    }

    #[test]
    fn poll_detects_finished_manager() {
        let mut h = harness();
        h.frame_tx.send(frame(3)).unwrap();
        drop(h.frame_tx);

        assert_eq!(h.platform.poll_frames(), FramePoll::Finished);
        assert_eq!(h.platform.latest, Some(frame(3)));
    }

    #[test]
    fn cursor_passes_through_without_pixels() {
        let h = harness();
        assert_eq!(h.platform.to_playfield(10.0, 20.0), (10.0, 20.0));
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
