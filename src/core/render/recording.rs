//=========================================================================
// Recording Surface (test double)
//=========================================================================
//
// Surface that records every call instead of drawing. Textures and fonts
// are never read from disk; each loaded path gets a fixed size from the
// table passed at construction (default 10x10).
//
//=========================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{Color, Flip, FontId, Rect, RenderError, Surface, TextureId};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Clear,
    Present,
    FillRect(Rect, Color),
    DrawRect(Rect, Color),
    Copy {
        texture: TextureId,
        dest: Rect,
        angle: f64,
        flip: Flip,
    },
    Text(String),
    DestroyTexture(TextureId),
    DestroyFont(FontId),
}

/// Call log shared between the test and the surface after it moves into
/// a scene thread.
pub(crate) type CallLog = Arc<Mutex<Vec<Call>>>;

pub(crate) struct RecordingSurface {
    calls: CallLog,
    sizes: HashMap<PathBuf, (u32, u32)>,
    textures: Vec<Option<(u32, u32)>>,
    fonts: Vec<bool>,
    fail_copies: bool,
    missing: Option<PathBuf>,
}

impl RecordingSurface {
    pub(crate) fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            sizes: HashMap::new(),
            textures: Vec::new(),
            fonts: Vec::new(),
            fail_copies: false,
            missing: None,
        }
    }

    /// Reports `(width, height)` for textures loaded from `path`.
    pub(crate) fn with_size(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.sizes.insert(path.into(), (width, height));
        self
    }

    /// Every `copy_texture` fails with a backend error.
    pub(crate) fn failing_copies(mut self) -> Self {
        self.fail_copies = true;
        self
    }

    /// Loading `path` fails as if the file were missing.
    pub(crate) fn missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing = Some(path.into());
        self
    }

    pub(crate) fn log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    /// Number of live (not destroyed) textures.
    pub(crate) fn live_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    /// Number of live (not destroyed) fonts.
    pub(crate) fn live_fonts(&self) -> usize {
        self.fonts.iter().filter(|f| **f).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_missing(&self, path: &Path) -> Result<(), RenderError> {
        match &self.missing {
            Some(missing) if missing == path => Err(RenderError::AssetLoad {
                path: path.to_path_buf(),
                reason: "no such file".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.record(Call::Clear);
    }

    fn present(&mut self) {
        self.record(Call::Present);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.record(Call::FillRect(rect, color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.record(Call::DrawRect(rect, color));
    }

    fn copy_texture(
        &mut self,
        texture: TextureId,
        dest: Rect,
        angle: f64,
        flip: Flip,
    ) -> Result<(), RenderError> {
        if self.fail_copies {
            return Err(RenderError::Backend("copy failed".into()));
        }
        if !matches!(self.textures.get(texture.0), Some(Some(_))) {
            return Err(RenderError::UnknownTexture);
        }
        self.record(Call::Copy { texture, dest, angle, flip });
        Ok(())
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId, RenderError> {
        self.check_missing(path)?;
        let size = self.sizes.get(path).copied().unwrap_or((10, 10));
        self.textures.push(Some(size));
        Ok(TextureId(self.textures.len() - 1))
    }

    fn texture_size(&self, texture: TextureId) -> Result<(u32, u32), RenderError> {
        self.textures
            .get(texture.0)
            .copied()
            .flatten()
            .ok_or(RenderError::UnknownTexture)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.get_mut(texture.0) {
            *slot = None;
        }
        self.record(Call::DestroyTexture(texture));
    }

    fn load_font(&mut self, path: &Path, _size: u32) -> Result<FontId, RenderError> {
        self.check_missing(path)?;
        self.fonts.push(true);
        Ok(FontId(self.fonts.len() - 1))
    }

    fn destroy_font(&mut self, font: FontId) {
        if let Some(slot) = self.fonts.get_mut(font.0) {
            *slot = false;
        }
        self.record(Call::DestroyFont(font));
    }

    fn render_text(
        &mut self,
        font: FontId,
        text: &str,
        _color: Color,
    ) -> Result<TextureId, RenderError> {
        if !self.fonts.get(font.0).copied().unwrap_or(false) {
            return Err(RenderError::UnknownFont);
        }
        self.record(Call::Text(text.to_string()));
        let width = 10 * text.chars().count() as u32;
        self.textures.push(Some((width, 10)));
        Ok(TextureId(self.textures.len() - 1))
    }
}
