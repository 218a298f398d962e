//=========================================================================
// Game Over Scene
//=========================================================================
//
// Dims the last game frame and shows the best score, then waits for a
// press to play again.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender};

//=== Internal Dependencies ===============================================

use super::assets::AssetLoader;
use super::{await_start, draw_text, TextPlacement, TITLE_FONT};
use crate::config::GameConfig;
use crate::core::input::{InputEvent, KeyCode};
use crate::core::render::{Color, FontId, Rect, Surface};
use crate::core::scene::{emit, Scene, SceneContext, SceneEvent, SceneKind};
use crate::error::GameError;

//=== Constants ===========================================================

const CAPTION: &str = "GAME OVER";
const CAPTION_SIZE: u32 = 42;
const CAPTION_Y: i32 = 200;
const BEST_SCORE_Y: i32 = 300;

const OVERLAY: Color = Color::rgba(0, 0, 0, 128);

//=== GameOverScene =======================================================

pub struct GameOverScene {
    caption_font: FontId,
    best_score: u32,

    width: i32,
    height: i32,
    flap_keys: Vec<KeyCode>,
}

impl GameOverScene {
    pub fn new(surface: &mut dyn Surface, config: &GameConfig) -> Result<Self, GameError> {
        let mut assets = AssetLoader::new(surface, config);
        let caption_font = assets.font("caption font", TITLE_FONT, CAPTION_SIZE)?;
        assets.keep();

        Ok(Self {
            caption_font,
            best_score: 0,
            width: config.width as i32,
            height: config.height as i32,
            flap_keys: config.flap_keys.clone(),
        })
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Draws over whatever the surface last showed; no clear.
    fn paint(&self, surface: &mut dyn Surface) -> Result<(), GameError> {
        let screen = Rect::new(0, 0, self.width, self.height);
        surface.fill_rect(screen, OVERLAY);
        surface.draw_rect(screen, OVERLAY);

        let centred = |y| TextPlacement::Centred { width: self.width, y };

        draw_text(surface, self.caption_font, CAPTION, Color::WHITE, centred(CAPTION_Y))
            .map_err(GameError::render("caption"))?;

        let best = format!("BEST SCORE: {}", self.best_score);
        draw_text(surface, self.caption_font, &best, Color::WHITE, centred(BEST_SCORE_Y))
            .map_err(GameError::render("best score"))?;

        surface.present();
        Ok(())
    }
}

impl Scene for GameOverScene {
    fn kind(&self) -> SceneKind {
        SceneKind::GameOver
    }

    fn on_enter(&mut self, context: &SceneContext) {
        self.best_score = context.best_score;
    }

    fn run(
        &mut self,
        inbound: &Receiver<InputEvent>,
        outbound: &Sender<SceneEvent>,
        surface: &mut dyn Surface,
    ) {
        if let Err(e) = self.paint(surface) {
            emit(outbound, SceneEvent::Error(e));
            return;
        }
        await_start(SceneKind::GameOver, inbound, outbound, &self.flap_keys);
    }

    fn destroy(&mut self, surface: &mut dyn Surface) {
        surface.destroy_font(self.caption_font);
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

    #[test]
    fn shows_best_score_from_context() {
        let mut surface = RecordingSurface::new();
        let mut scene = GameOverScene::new(&mut surface, &GameConfig::default()).unwrap();
        let log = surface.log();

        scene.on_enter(&SceneContext { best_score: 12 });
        assert_eq!(scene.best_score(), 12);

        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        in_tx.send(InputEvent::PointerDown { x: 0.0, y: 0.0 }).unwrap();
        scene.run(&in_rx, &out_tx, &mut surface);

        assert!(matches!(out_rx.try_recv(), Ok(SceneEvent::StartGame)));

        let calls = log.lock().unwrap();
        assert_eq!(calls[0], Call::FillRect(Rect::new(0, 0, 800, 600), OVERLAY));
        assert!(!calls.contains(&Call::Clear), "overlay keeps the last game frame");
        assert!(calls.contains(&Call::Text("GAME OVER".into())));
        assert!(calls.contains(&Call::Text("BEST SCORE: 12".into())));
        assert_eq!(calls.last(), Some(&Call::Present));
    }

    #[test]
    fn captions_are_centred() {
        let mut surface = RecordingSurface::new();
        let mut scene = GameOverScene::new(&mut surface, &GameConfig::default()).unwrap();
        let log = surface.log();

        let (in_tx, in_rx) = unbounded();
        let (out_tx, _out_rx) = bounded(1);
        in_tx.send(InputEvent::Quit).unwrap();
        scene.run(&in_rx, &out_tx, &mut surface);

        // "GAME OVER" is 90 px wide on the recording surface.
        let calls = log.lock().unwrap();
        assert!(calls.iter().any(|c| matches!(
            c,
            Call::Copy { dest: Rect { x: 355, y: 200, width: 90, .. }, .. }
        )));
    }

    #[test]
    fn quit_input_emits_quit() {
        let mut surface = RecordingSurface::new();
        let mut scene = GameOverScene::new(&mut surface, &GameConfig::default()).unwrap();

        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        in_tx.send(InputEvent::Quit).unwrap();
        scene.run(&in_rx, &out_tx, &mut surface);

        assert!(matches!(out_rx.try_recv(), Ok(SceneEvent::Quit)));
    }

    #[test]
    fn destroy_releases_font() {
        let mut surface = RecordingSurface::new();
        let mut scene = GameOverScene::new(&mut surface, &GameConfig::default()).unwrap();
        assert_eq!(surface.live_fonts(), 1);

        scene.destroy(&mut surface);
        assert_eq!(surface.live_fonts(), 0);
    }
}
