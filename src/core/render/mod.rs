//=========================================================================
// Render Surface
//=========================================================================
//
// The narrow drawing capability consumed by scenes.
//
// Architecture:
// ```text
//   SceneManager ──owns──> Box<dyn Surface>
//        │
//        └─ moves it into the active scene task, takes it back on join
// ```
//
// Exactly one scene task holds the surface at a time, so the trait
// needs `Send` but no interior locking.
//
// Components:
// - `Surface`: the capability trait (clear, present, primitives, assets)
// - `Canvas`: software implementation over an RGBA framebuffer
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::{Path, PathBuf};

//=== Module Declarations =================================================

mod canvas;
mod glyph_sheet;

#[cfg(test)]
pub(crate) mod recording;

//=== Public API ==========================================================

pub use canvas::{Canvas, Frame};

//=== Geometry & Colour ===================================================

/// Integer rectangle in playfield pixels (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Boundary-inclusive overlap test.
    ///
    /// Rectangles sharing exactly one edge coordinate count as touching.
    pub fn touches(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const RED: Self = Self::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Texture mirroring applied by `copy_texture`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
}

//=== Handles =============================================================

/// Opaque texture handle issued by a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Opaque font handle issued by a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) usize);

//=== Surface Trait =======================================================

/// Drawing capability handed to scenes.
///
/// Drawing primitives that cannot fail in any sensible backend return
/// `()`. Everything touching assets or backend state returns a
/// [`RenderError`].
pub trait Surface: Send {
    /// Clears the back buffer.
    fn clear(&mut self);

    /// Publishes the back buffer.
    fn present(&mut self);

    /// Fills `rect` with `color` (alpha blended).
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws the one-pixel outline of `rect`.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Copies a whole texture into `dest`, rotated by `angle` degrees
    /// clockwise around the centre of `dest`, then mirrored by `flip`.
    fn copy_texture(
        &mut self,
        texture: TextureId,
        dest: Rect,
        angle: f64,
        flip: Flip,
    ) -> Result<(), RenderError>;

    /// Loads an image file into a texture.
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, RenderError>;

    /// Returns `(width, height)` of a texture.
    fn texture_size(&self, texture: TextureId) -> Result<(u32, u32), RenderError>;

    /// Releases a texture. Unknown handles are ignored.
    fn destroy_texture(&mut self, texture: TextureId);

    /// Loads a font at the given pixel size.
    fn load_font(&mut self, path: &Path, size: u32) -> Result<FontId, RenderError>;

    /// Releases a font. Unknown handles are ignored.
    fn destroy_font(&mut self, font: FontId);

    /// Rasterizes `text` into a new texture owned by the caller.
    fn render_text(
        &mut self,
        font: FontId,
        text: &str,
        color: Color,
    ) -> Result<TextureId, RenderError>;
}

//=== RenderError =========================================================

/// Surface failures.
#[derive(Debug)]
pub enum RenderError {
    /// A file could not be read or decoded.
    AssetLoad { path: PathBuf, reason: String },

    /// The texture handle is not (or no longer) known to the surface.
    UnknownTexture,

    /// The font handle is not (or no longer) known to the surface.
    UnknownFont,

    /// Any other backend failure.
    Backend(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AssetLoad { path, reason } => {
                write!(f, "could not load {}: {}", path.display(), reason)
            }
            Self::UnknownTexture => write!(f, "unknown texture handle"),
            Self::UnknownFont => write!(f, "unknown font handle"),
            Self::Backend(e) => write!(f, "backend error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

//=========================================================================
// Unit Tests
//=========================================================================
