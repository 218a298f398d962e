//=========================================================================
// Game Configuration
//=========================================================================
//
// Tunables for the playfield, physics, obstacle policy and assets.
//
// `GameConfig::default()` reproduces the classic feel: an 800x600
// playfield ticking every 10 ms, pipes scrolling 2 px per tick with a
// new pair whenever 300 px of free space opens on the right.
//
// The engine builder exposes the commonly changed fields; everything
// else can be set directly on the struct.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::{Path, PathBuf};
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::input::KeyCode;

//=== GameConfig ==========================================================

/// Complete configuration shared by every scene.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    //--- Playfield --------------------------------------------------------
    pub width: u32,
    pub height: u32,

    //--- Simulation -------------------------------------------------------
    /// Wall-clock period of one Game-scene tick.
    pub tick_period: Duration,

    /// Pixels every pipe pair moves left per tick.
    pub scroll_speed: i32,

    /// Free space on the right edge that triggers the next pair.
    pub spawn_distance: i32,

    /// Vertical clearance between the upper and lower pipe.
    pub pipe_gap: i32,

    /// Minimum height of either pipe in a pair.
    pub min_pipe_height: i32,

    //--- Bird Physics -----------------------------------------------------
    pub gravity: f32,
    pub jump_impulse: f32,
    pub fall_speed: f32,

    /// Horizontal centre of the bird; vertical centre is mid playfield.
    pub bird_anchor_x: i32,

    //--- Input ------------------------------------------------------------
    /// Keys that act like a pointer press (flap / start).
    pub flap_keys: Vec<KeyCode>,

    //--- Assets -----------------------------------------------------------
    pub asset_root: PathBuf,

    //--- Debugging --------------------------------------------------------
    /// Seed for pipe generation; `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Fills the bird's collision box in red behind the sprite.
    pub draw_bird_outline: bool,
}

impl GameConfig {
    /// Resolves a path relative to the asset root.
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    /// Vertical centre of the bird at round start.
    pub fn bird_anchor(&self) -> (i32, i32) {
        (self.bird_anchor_x, self.height as i32 / 2)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            tick_period: Duration::from_millis(10),
            scroll_speed: 2,
            spawn_distance: 300,
            pipe_gap: 160,
            min_pipe_height: 100,
            gravity: 0.1,
            jump_impulse: -4.0,
            fall_speed: 10.0,
            bird_anchor_x: 200,
            flap_keys: vec![KeyCode::Space, KeyCode::ArrowUp],
            asset_root: PathBuf::from("res"),
            seed: None,
            draw_bird_outline: false,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_tuning() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.tick_period, Duration::from_millis(10));
        assert_eq!(config.scroll_speed, 2);
        assert_eq!(config.spawn_distance, 300);
        assert_eq!(config.gravity, 0.1);
        assert_eq!(config.jump_impulse, -4.0);
    }

    #[test]
    fn pipe_split_range_is_not_empty() {
        let config = GameConfig::default();
        let max_upper = config.height as i32 - config.min_pipe_height - config.pipe_gap;
        assert!(max_upper >= config.min_pipe_height);
    }

    #[test]
    fn bird_anchor_is_mid_playfield() {
        let config = GameConfig::default();
        assert_eq!(config.bird_anchor(), (200, 300));
    }

    #[test]
    fn asset_paths_resolve_under_root() {
        let config = GameConfig {
            asset_root: PathBuf::from("/tmp/assets"),
            ..GameConfig::default()
        };
        assert_eq!(config.asset("imgs/pipe.png"), PathBuf::from("/tmp/assets/imgs/pipe.png"));
    }
}
