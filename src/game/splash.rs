//=========================================================================
// Splash Scene
//=========================================================================
//
// Title screen. Paints one static frame, then waits for a press.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender};

//=== Internal Dependencies ===============================================

use super::assets::AssetLoader;
use super::{await_start, draw_text, TextPlacement, BACKGROUND_IMAGE, PROMPT_FONT, TITLE_FONT};
use crate::config::GameConfig;
use crate::core::input::{InputEvent, KeyCode};
use crate::core::render::{Color, Flip, FontId, Rect, Surface, TextureId};
use crate::core::scene::{emit, Scene, SceneEvent, SceneKind};
use crate::error::GameError;

//=== Constants ===========================================================

const TITLE: &str = "FLAPPY BIRD";
const PROMPT: &str = "CLICK TO START";

const TITLE_SIZE: u32 = 26;
const PROMPT_SIZE: u32 = 16;

const TITLE_COLOR: Color = Color::rgba(255, 100, 0, 255);
const PROMPT_COLOR: Color = Color::rgba(150, 155, 45, 255);

//=== SplashScene =========================================================

pub struct SplashScene {
    background: TextureId,
    title_font: FontId,
    prompt_font: FontId,

    width: i32,
    height: i32,
    flap_keys: Vec<KeyCode>,
}

impl SplashScene {
    pub fn new(surface: &mut dyn Surface, config: &GameConfig) -> Result<Self, GameError> {
        let mut assets = AssetLoader::new(surface, config);
        let background = assets.texture("background", BACKGROUND_IMAGE)?;
        let title_font = assets.font("title font", TITLE_FONT, TITLE_SIZE)?;
        let prompt_font = assets.font("prompt font", PROMPT_FONT, PROMPT_SIZE)?;
        assets.keep();

        Ok(Self {
            background,
            title_font,
            prompt_font,
            width: config.width as i32,
            height: config.height as i32,
            flap_keys: config.flap_keys.clone(),
        })
    }

    fn paint(&self, surface: &mut dyn Surface) -> Result<(), GameError> {
        surface.clear();

        let screen = Rect::new(0, 0, self.width, self.height);
        surface
            .copy_texture(self.background, screen, 0.0, Flip::None)
            .map_err(GameError::render("background"))?;

        let title = Rect::new(50, 40, self.width - 100, self.height / 2);
        draw_text(surface, self.title_font, TITLE, TITLE_COLOR, TextPlacement::Fill(title))
            .map_err(GameError::render("title"))?;

        let prompt = Rect::new(100, 400, self.width - 200, 80);
        draw_text(surface, self.prompt_font, PROMPT, PROMPT_COLOR, TextPlacement::Fill(prompt))
            .map_err(GameError::render("prompt"))?;

        surface.present();
        Ok(())
    }
}

impl Scene for SplashScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Splash
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
        await_start(SceneKind::Splash, inbound, outbound, &self.flap_keys);
    }

    fn destroy(&mut self, surface: &mut dyn Surface) {
        surface.destroy_texture(self.background);
        surface.destroy_font(self.title_font);
        surface.destroy_font(self.prompt_font);
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

    fn scene(surface: &mut RecordingSurface) -> SplashScene {
        SplashScene::new(surface, &GameConfig::default()).unwrap()
    }

    #[test]
    fn paints_title_and_prompt_once() {
        let mut surface = RecordingSurface::new();
        let mut splash = scene(&mut surface);
        let log = surface.log();

        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        in_tx.send(InputEvent::PointerDown { x: 1.0, y: 1.0 }).unwrap();

        splash.run(&in_rx, &out_tx, &mut surface);

        assert!(matches!(out_rx.try_recv(), Ok(SceneEvent::StartGame)));
        let calls = log.lock().unwrap();
        assert_eq!(calls[0], Call::Clear);
        assert!(matches!(
            calls[1],
            Call::Copy { dest: Rect { x: 0, y: 0, width: 800, height: 600 }, .. }
        ));
        assert!(calls.contains(&Call::Text(TITLE.into())));
        assert!(calls.contains(&Call::Text(PROMPT.into())));
        assert!(calls.iter().any(|c| matches!(
            c,
            Call::Copy { dest: Rect { x: 50, y: 40, width: 700, height: 300 }, .. }
        )));
        assert_eq!(calls.iter().filter(|c| **c == Call::Present).count(), 1);
        assert_eq!(calls.last(), Some(&Call::Present));
    }

    #[test]
    fn flap_key_starts_the_game() {
        let mut surface = RecordingSurface::new();
        let mut splash = scene(&mut surface);

        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        in_tx.send(InputEvent::KeyDown(KeyCode::Escape)).unwrap();
        in_tx.send(InputEvent::KeyDown(KeyCode::Space)).unwrap();

        splash.run(&in_rx, &out_tx, &mut surface);

        assert!(matches!(out_rx.try_recv(), Ok(SceneEvent::StartGame)));
        // Nothing after the press was consumed.
        assert!(in_rx.is_empty());
    }

    #[test]
    fn paint_failure_is_reported() {
        let mut surface = RecordingSurface::new().failing_copies();
        let mut splash = scene(&mut surface);

        let (_in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(1);
        splash.run(&in_rx, &out_tx, &mut surface);

        assert!(matches!(
            out_rx.try_recv(),
            Ok(SceneEvent::Error(GameError::Render { what: "background", .. }))
        ));
    }

    #[test]
    fn destroy_releases_everything() {
        let mut surface = RecordingSurface::new();
        let mut splash = scene(&mut surface);
        assert_eq!((surface.live_textures(), surface.live_fonts()), (1, 2));

        splash.destroy(&mut surface);
        assert_eq!((surface.live_textures(), surface.live_fonts()), (0, 0));
    }

    #[test]
    fn missing_prompt_font_fails_construction() {
        let config = GameConfig::default();
        let mut surface = RecordingSurface::new().missing(config.asset(PROMPT_FONT));

        let result = SplashScene::new(&mut surface, &config);

        assert!(matches!(result, Err(GameError::Asset { what: "prompt font", .. })));
        assert_eq!((surface.live_textures(), surface.live_fonts()), (0, 0));
    }
}
