//=========================================================================
// Aetheric Flap: Library Root
//
// A scene-orchestrated arcade flyer: three scenes (splash, game, game
// over) run as independent tasks under a manager that routes input and
// follows a fixed transition table.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`)
// - Expose the scene, render and input contracts for custom scenes
// - Keep OS integration (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use aetheric_flap::EngineBuilder;
//
// fn main() -> Result<(), aetheric_flap::GameError> {
//     EngineBuilder::new().with_assets("res").build().run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the engine-level contracts (input, rendering, scenes).
// `game` holds the flappy-bird scenes and simulation built on them.
//
pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the Winit window, input conversion and pixel
// presentation, and is not part of the public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use config::GameConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::GameError;
