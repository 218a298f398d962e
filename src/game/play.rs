//=========================================================================
// Game Scene
//=========================================================================
//
// The playable round: a fixed-tick loop over a `World`.
//
// Loop:
// ```text
//   select {
//     input  → flap (pointer or flap key) | Quit → emit Quit
//     tick   → world.update() → paint → round over? → emit EndGame
//   }
// ```
//
// Input and the tick timer have equal priority. The tick period is
// wall-clock and not compensated for drift.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::time::Duration;

//=== External Dependencies ===============================================

use crossbeam_channel::{select, tick, Receiver, Sender};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::assets::AssetLoader;
use super::bird::{Bird, BirdPhysics};
use super::world::World;
use super::{draw_text, TextPlacement, BACKGROUND_IMAGE, BIRD_FRAMES, PIPE_IMAGE, TITLE_FONT};
use crate::config::GameConfig;
use crate::core::input::{InputEvent, KeyCode};
use crate::core::render::{Color, Flip, FontId, Rect, Surface, TextureId};
use crate::core::scene::{emit, Scene, SceneContext, SceneEvent, SceneKind};
use crate::error::GameError;

//=== Constants ===========================================================

const SCORE_SIZE: u32 = 42;
const SCORE_Y: i32 = 60;

//=== GameScene ===========================================================

pub struct GameScene {
    background: TextureId,
    pipe: TextureId,
    score_font: FontId,

    world: World,

    width: i32,
    height: i32,
    tick_period: Duration,
    flap_keys: Vec<KeyCode>,
    draw_bird_outline: bool,
}

impl GameScene {
    //--- Construction -----------------------------------------------------

    /// Loads the scene's assets. Bird and pipe sizes come from their
    /// textures.
    pub fn new(surface: &mut dyn Surface, config: &GameConfig) -> Result<Self, GameError> {
        let mut assets = AssetLoader::new(surface, config);

        let background = assets.texture("background", BACKGROUND_IMAGE)?;

        let mut frames = Vec::with_capacity(BIRD_FRAMES.len());
        for path in BIRD_FRAMES {
            frames.push(assets.texture("bird frame", path)?);
        }
        let bird_size = assets.size("bird frame", frames[0])?;

        let pipe = assets.texture("pipe", PIPE_IMAGE)?;
        let (pipe_width, _) = assets.size("pipe", pipe)?;

        let score_font = assets.font("score font", TITLE_FONT, SCORE_SIZE)?;
        assets.keep();

        let bird = Bird::new(
            frames,
            config.bird_anchor(),
            bird_size,
            BirdPhysics::from(config),
        );

        Ok(Self {
            background,
            pipe,
            score_font,
            world: World::new(config, bird, pipe, pipe_width),
            width: config.width as i32,
            height: config.height as i32,
            tick_period: config.tick_period,
            flap_keys: config.flap_keys.clone(),
            draw_bird_outline: config.draw_bird_outline,
        })
    }

    //--- Rendering --------------------------------------------------------

    fn paint(&mut self, surface: &mut dyn Surface) -> Result<(), GameError> {
        surface.clear();

        let screen = Rect::new(0, 0, self.width, self.height);
        surface
            .copy_texture(self.background, screen, 0.0, Flip::None)
            .map_err(GameError::render("background"))?;

        self.world
            .bird_mut()
            .paint(surface, self.draw_bird_outline)
            .map_err(GameError::render("bird"))?;

        for pair in self.world.pairs() {
            pair.paint(surface).map_err(GameError::render("pipe"))?;
        }

        draw_text(
            surface,
            self.score_font,
            &self.world.score().to_string(),
            Color::WHITE,
            TextPlacement::Centred {
                width: self.width,
                y: SCORE_Y,
            },
        )
        .map_err(GameError::render("score"))?;

        surface.present();
        Ok(())
    }
}

impl Scene for GameScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Game
    }

    fn on_enter(&mut self, context: &SceneContext) {
        self.world.set_best_score(context.best_score);
    }

    fn run(
        &mut self,
        inbound: &Receiver<InputEvent>,
        outbound: &Sender<SceneEvent>,
        surface: &mut dyn Surface,
    ) {
        self.world.reset();
        info!(target: "game", "Round started (best {})", self.world.best_score());

        let ticker = tick(self.tick_period);
        loop {
            select! {
                recv(inbound) -> msg => match msg {
                    Ok(InputEvent::Quit) => {
                        emit(outbound, SceneEvent::Quit);
                        return;
                    }
                    Ok(event) => {
                        if event.is_press(&self.flap_keys) {
                            self.world.flap();
                        }
                    }
                    Err(_) => {
                        debug!(target: "game", "Input closed mid-round");
                        return;
                    }
                },
                recv(ticker) -> _ => {
                    self.world.update();

                    if let Err(e) = self.paint(surface) {
                        emit(outbound, SceneEvent::Error(e));
                        return;
                    }

                    if self.world.round_over() {
                        let score = self.world.score();
                        let best_score = self.world.best_score();
                        info!(target: "game", "Round over: score {}, best {}", score, best_score);
                        emit(outbound, SceneEvent::EndGame { score, best_score });
                        return;
                    }
                },
            }
        }
    }

    fn destroy(&mut self, surface: &mut dyn Surface) {
        surface.destroy_texture(self.background);
        for frame in self.world.bird().frames() {
            surface.destroy_texture(*frame);
        }
        surface.destroy_texture(self.pipe);
        surface.destroy_font(self.score_font);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::recording::{Call, RecordingSurface};
    use crossbeam_channel::{bounded, unbounded};

    fn config() -> GameConfig {
        GameConfig {
            tick_period: Duration::from_millis(1),
            seed: Some(3),
            ..GameConfig::default()
        }
    }

    fn surface(config: &GameConfig) -> RecordingSurface {
        RecordingSurface::new()
            .with_size(config.asset(BIRD_FRAMES[0]), 34, 24)
            .with_size(config.asset(PIPE_IMAGE), 52, 320)
    }

    fn run_round(
        scene: &mut GameScene,
        surface: &mut RecordingSurface,
        inputs: &[InputEvent],
    ) -> SceneEvent {
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        for event in inputs {
            in_tx.send(*event).unwrap();
        }
        scene.run(&in_rx, &out_tx, surface);
        out_rx.try_recv().unwrap()
    }

    #[test]
    fn sizes_come_from_textures() {
        let config = config();
        let mut surface = surface(&config);
        let scene = GameScene::new(&mut surface, &config).unwrap();

        let bird = scene.world.bird();
        assert_eq!((bird.width(), bird.height()), (34, 24));
        assert_eq!((bird.x(), bird.y()), (183, 288));
        assert_eq!(bird.frames().len(), 4);
    }

    #[test]
    fn untouched_bird_falls_and_ends_the_round() {
        let config = config();
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        let event = run_round(&mut scene, &mut surface, &[]);

        assert!(matches!(event, SceneEvent::EndGame { score: 0, best_score: 0 }));
        assert!(scene.world.round_over());
    }

    #[test]
    fn end_game_reports_best_from_context() {
        let config = config();
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        scene.on_enter(&SceneContext { best_score: 7 });
        let event = run_round(&mut scene, &mut surface, &[]);

        assert!(matches!(event, SceneEvent::EndGame { score: 0, best_score: 7 }));
    }

    #[test]
    fn each_run_starts_a_fresh_round() {
        let config = config();
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        run_round(&mut scene, &mut surface, &[]);
        let event = run_round(&mut scene, &mut surface, &[]);

        assert!(matches!(event, SceneEvent::EndGame { score: 0, .. }));
    }

    #[test]
    fn frame_is_painted_in_layer_order() {
        let config = config();
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();
        let log = surface.log();

        run_round(&mut scene, &mut surface, &[]);

        let calls = log.lock().unwrap();
        let frame: Vec<&Call> = calls
            .iter()
            .take_while(|c| **c != Call::Present)
            .collect();

        assert_eq!(*frame[0], Call::Clear);
        assert!(matches!(
            frame[1],
            Call::Copy { dest: Rect { x: 0, y: 0, width: 800, height: 600 }, .. }
        ));
        assert!(matches!(
            frame[2],
            Call::Copy { dest: Rect { x: 183, width: 34, height: 24, .. }, .. }
        ));
        // First tick already spawned a pair: upper flipped, then lower.
        assert!(matches!(frame[3], Call::Copy { flip: Flip::Vertical, .. }));
        assert!(matches!(frame[4], Call::Copy { flip: Flip::None, .. }));
        assert_eq!(*frame[5], Call::Text("0".into()));
        assert!(matches!(
            frame[6],
            Call::Copy { dest: Rect { x: 395, y: 60, width: 10, height: 10 }, .. }
        ));
        assert!(matches!(frame[7], Call::DestroyTexture(_)));
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn quit_input_ends_the_scene() {
        let config = GameConfig {
            tick_period: Duration::from_secs(60),
            ..config()
        };
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        let event = run_round(&mut scene, &mut surface, &[InputEvent::Quit]);
        assert!(matches!(event, SceneEvent::Quit));
    }

    #[test]
    fn closed_input_ends_without_event() {
        let config = GameConfig {
            tick_period: Duration::from_secs(60),
            ..config()
        };
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        let (in_tx, in_rx) = unbounded::<InputEvent>();
        let (out_tx, out_rx) = bounded(1);
        drop(in_tx);
        scene.run(&in_rx, &out_tx, &mut surface);

        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn flap_input_lifts_the_bird() {
        let config = GameConfig {
            tick_period: Duration::from_secs(60),
            ..config()
        };
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        in_tx.send(InputEvent::KeyDown(KeyCode::ArrowUp)).unwrap();
        in_tx.send(InputEvent::KeyDown(KeyCode::KeyZ)).unwrap();
        in_tx.send(InputEvent::Quit).unwrap();
        scene.run(&in_rx, &out_tx, &mut surface);

        assert!(matches!(out_rx.try_recv(), Ok(SceneEvent::Quit)));
        assert!(scene.world.bird().is_jumping());
        assert_eq!(scene.world.bird().velocity(), -4.0);
    }

    #[test]
    fn render_failure_becomes_error_event() {
        let config = config();
        let mut surface = surface(&config).failing_copies();
        let mut scene = GameScene::new(&mut surface, &config).unwrap();

        let event = run_round(&mut scene, &mut surface, &[]);
        assert!(matches!(
            event,
            SceneEvent::Error(GameError::Render { what: "background", .. })
        ));
    }

    #[test]
    fn destroy_releases_everything() {
        let config = config();
        let mut surface = surface(&config);
        let mut scene = GameScene::new(&mut surface, &config).unwrap();
        assert_eq!((surface.live_textures(), surface.live_fonts()), (6, 1));

        scene.destroy(&mut surface);
        assert_eq!((surface.live_textures(), surface.live_fonts()), (0, 0));
    }

    #[test]
    fn missing_pipe_fails_and_releases_loaded_assets() {
        let config = config();
        let mut surface = surface(&config).missing(config.asset(PIPE_IMAGE));

        let result = GameScene::new(&mut surface, &config);

        assert!(matches!(result, Err(GameError::Asset { what: "pipe", .. })));
        assert_eq!(surface.live_textures(), 0);
    }
}
