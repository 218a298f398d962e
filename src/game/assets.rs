//=========================================================================
// Asset Loader
//=========================================================================
//
// Scoped loading of a scene's textures and fonts.
//
// Every handle loaded through an `AssetLoader` is released again when the
// loader is dropped, unless `keep()` was called. A scene constructor that
// fails halfway therefore leaves nothing behind on the surface.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::config::GameConfig;
use crate::core::render::{FontId, Surface, TextureId};
use crate::error::GameError;

//=== AssetLoader =========================================================

pub(crate) struct AssetLoader<'a> {
    surface: &'a mut dyn Surface,
    config: &'a GameConfig,
    textures: Vec<TextureId>,
    fonts: Vec<FontId>,
}

impl<'a> AssetLoader<'a> {
    pub(crate) fn new(surface: &'a mut dyn Surface, config: &'a GameConfig) -> Self {
        Self {
            surface,
            config,
            textures: Vec::new(),
            fonts: Vec::new(),
        }
    }

    /// Loads an image relative to the asset root.
    pub(crate) fn texture(
        &mut self,
        what: &'static str,
        relative: &str,
    ) -> Result<TextureId, GameError> {
        let texture = self
            .surface
            .load_texture(&self.config.asset(relative))
            .map_err(GameError::asset(what))?;
        self.textures.push(texture);
        Ok(texture)
    }

    /// Loads a glyph-sheet font relative to the asset root.
    pub(crate) fn font(
        &mut self,
        what: &'static str,
        relative: &str,
        size: u32,
    ) -> Result<FontId, GameError> {
        let font = self
            .surface
            .load_font(&self.config.asset(relative), size)
            .map_err(GameError::asset(what))?;
        self.fonts.push(font);
        Ok(font)
    }

    /// Pixel size of a loaded texture.
    pub(crate) fn size(
        &self,
        what: &'static str,
        texture: TextureId,
    ) -> Result<(i32, i32), GameError> {
        let (w, h) = self
            .surface
            .texture_size(texture)
            .map_err(GameError::asset(what))?;
        Ok((w as i32, h as i32))
    }

    /// Hands ownership of everything loaded so far to the caller.
    pub(crate) fn keep(mut self) {
        self.textures.clear();
        self.fonts.clear();
    }
}

impl Drop for AssetLoader<'_> {
    fn drop(&mut self) {
        if self.textures.is_empty() && self.fonts.is_empty() {
            return;
        }

        debug!(
            target: "scene",
            "Releasing {} texture(s) and {} font(s) after failed load",
            self.textures.len(),
            self.fonts.len()
        );
        for texture in self.textures.drain(..) {
            self.surface.destroy_texture(texture);
        }
        for font in self.fonts.drain(..) {
            self.surface.destroy_font(font);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
