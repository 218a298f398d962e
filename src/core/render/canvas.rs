//=========================================================================
// Software Canvas
//=========================================================================
//
// `Surface` implementation over an in-memory RGBA framebuffer.
//
// Architecture:
// ```text
//   Scene task                         Platform (main thread)
//   ┌──────────────────────┐           ┌──────────────────────┐
//   │ Canvas               │           │ pixels::Pixels       │
//   │  back buffer (RGBA)  │  Frame    │                      │
//   │  present() ──────────┼──────────>│ RedrawRequested      │
//   └──────────────────────┘ bounded(1)└──────────────────────┘
// ```
//
// The frame channel is bounded; when the platform has not yet consumed
// the previous frame, the canvas takes it back and sends the new one in
// its place. Rendering never blocks a scene tick, and the last frame of
// a static scene always reaches the window.
//
// Frame buffers circulate: a withdrawn stale frame, or a buffer the
// platform hands back once it has shown it, is reused for the next
// `present()` instead of allocating.
//
// Unrotated copies take a scanline path with per-column texel lookup;
// only rotated copies (the falling bird) pay for the inverse transform.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::Path;

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::glyph_sheet::GlyphSheet;
use super::{Color, Flip, FontId, Rect, RenderError, Surface, TextureId};

//=== Frame ===============================================================

/// A presented frame: tightly packed RGBA rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

//=== Bitmap ==============================================================

/// Decoded RGBA image used for textures and glyph sheets.
#[derive(Debug, Clone)]
pub(crate) struct Bitmap {
    pub(crate) width: u32,
    pub(crate) height: u32,
    rgba: Vec<u8>,
}

impl Bitmap {
    pub(crate) fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; (width * height * 4) as usize],
        }
    }

    pub(crate) fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        (rgba.len() == (width * height * 4) as usize).then_some(Self { width, height, rgba })
    }

    fn open(path: &Path) -> Result<Self, RenderError> {
        let image = image::open(path).map_err(|e| RenderError::AssetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    pub(crate) fn set_pixel(&mut self, x: u32, y: u32, value: [u8; 4]) {
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba[i..i + 4].copy_from_slice(&value);
    }
}

//=== Canvas ==============================================================

struct LoadedFont {
    sheet: GlyphSheet,
    size: u32,
}

/// Software render surface.
///
/// Handles are indices into slot vectors; destroyed slots become `None`
/// and are never reused, so a stale handle reports `Unknown*` instead of
/// aliasing a newer asset.
pub struct Canvas {
    width: u32,
    height: u32,
    back: Vec<u8>,
    clear_color: Color,
    textures: Vec<Option<Bitmap>>,
    fonts: Vec<Option<LoadedFont>>,
    output: Option<(Sender<Frame>, Receiver<Frame>)>,
    recycled: Option<Receiver<Vec<u8>>>,
    spare: Vec<u8>,
    presented: u64,
}

impl Canvas {
    //--- Construction -----------------------------------------------------

    /// Creates a headless canvas; `present()` only counts frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            back: vec![0; (width * height * 4) as usize],
            clear_color: Color::BLACK,
            textures: Vec::new(),
            fonts: Vec::new(),
            output: None,
            recycled: None,
            spare: Vec::new(),
            presented: 0,
        }
    }

    /// Publishes presented frames on `sender`.
    ///
    /// `pending` is the receiving end of the same channel; it is used only
    /// to withdraw a frame the platform has not picked up yet.
    pub fn with_output(mut self, sender: Sender<Frame>, pending: Receiver<Frame>) -> Self {
        self.output = Some((sender, pending));
        self
    }

    /// Reuses pixel buffers the presenter has finished with.
    pub fn with_recycled(mut self, returned: Receiver<Vec<u8>>) -> Self {
        self.recycled = Some(returned);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of `present()` calls so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Current back buffer contents at `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([self.back[i], self.back[i + 1], self.back[i + 2], self.back[i + 3]])
    }

    /// Registers an already decoded RGBA texture.
    ///
    /// Returns `None` when `rgba` is not `width * height * 4` bytes.
    pub fn add_texture(&mut self, width: u32, height: u32, rgba: Vec<u8>) -> Option<TextureId> {
        Bitmap::from_rgba(width, height, rgba).map(|bitmap| self.push_texture(bitmap))
    }

    //--- Internal Helpers -------------------------------------------------

    fn push_texture(&mut self, bitmap: Bitmap) -> TextureId {
        self.textures.push(Some(bitmap));
        TextureId(self.textures.len() - 1)
    }

    fn texture(&self, texture: TextureId) -> Result<&Bitmap, RenderError> {
        self.textures
            .get(texture.0)
            .and_then(Option::as_ref)
            .ok_or(RenderError::UnknownTexture)
    }

    fn blend(&mut self, x: i32, y: i32, src: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        blend_pixel(&mut self.back[i..i + 4], src);
    }

    /// A buffer for the next frame: a spare one, a returned one, or new.
    fn frame_buffer(&mut self) -> Vec<u8> {
        if self.spare.capacity() >= self.back.len() {
            return std::mem::take(&mut self.spare);
        }
        if let Some(returned) = self.recycled.as_ref().and_then(|r| r.try_recv().ok()) {
            return returned;
        }
        Vec::with_capacity(self.back.len())
    }

    fn publish(&mut self) {
        if self.output.is_none() {
            return;
        }

        let mut pixels = self.frame_buffer();
        pixels.clear();
        pixels.extend_from_slice(&self.back);
        let frame = Frame {
            width: self.width,
            height: self.height,
            pixels,
        };

        let Some((sender, pending)) = &self.output else {
            return;
        };
        match sender.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                trace!(target: "render", "Presenter busy, replacing frame {}", self.presented);
                if let Ok(stale) = pending.try_recv() {
                    self.spare = stale.pixels;
                }
                if let Err(e) = sender.try_send(frame) {
                    trace!(target: "render", "Dropping frame {}", self.presented);
                    self.spare = e.into_inner().pixels;
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(target: "render", "Presenter gone, canvas continues headless");
                self.output = None;
            }
        }
    }
}

//=== Blitting ============================================================

fn blend_pixel(dst: &mut [u8], src: [u8; 4]) {
    match src[3] {
        0 => {}
        255 => dst.copy_from_slice(&src),
        alpha => {
            let alpha = alpha as u32;
            for channel in 0..3 {
                dst[channel] = ((src[channel] as u32 * alpha
                    + dst[channel] as u32 * (255 - alpha))
                    / 255) as u8;
            }
            dst[3] = 255;
        }
    }
}

/// Texel index sampled at the centre of destination pixel `offset`.
fn texel(offset: i32, extent: i32, size: u32) -> u32 {
    let t = (2 * offset as i64 + 1) * size as i64 / (2 * extent as i64);
    (t as u32).min(size - 1)
}

/// RGBA back buffer a texture is copied onto.
struct Target<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
}

impl Target<'_> {
    fn index(&self, x: i32, y: i32) -> usize {
        ((y as u32 * self.width + x as u32) * 4) as usize
    }

    /// Nearest-neighbour scaled copy without rotation.
    fn blit_scaled(&mut self, bitmap: &Bitmap, dest: Rect, flip: Flip) {
        let x0 = dest.x.max(0);
        let x1 = dest.right().min(self.width as i32);
        let y0 = dest.y.max(0);
        let y1 = dest.bottom().min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let columns: Vec<u32> = (x0..x1)
            .map(|px| {
                let tx = texel(px - dest.x, dest.width, bitmap.width);
                match flip {
                    Flip::Horizontal => bitmap.width - 1 - tx,
                    _ => tx,
                }
            })
            .collect();

        for py in y0..y1 {
            let mut ty = texel(py - dest.y, dest.height, bitmap.height);
            if let Flip::Vertical = flip {
                ty = bitmap.height - 1 - ty;
            }

            let start = self.index(x0, py);
            let row = &mut self.pixels[start..start + columns.len() * 4];
            for (dst, &tx) in row.chunks_exact_mut(4).zip(&columns) {
                blend_pixel(dst, bitmap.pixel(tx, ty));
            }
        }
    }

    /// Copy rotated clockwise by `angle` degrees about the centre of `dest`.
    fn blit_rotated(&mut self, bitmap: &Bitmap, dest: Rect, angle: f64, flip: Flip) {
        let (half_w, half_h) = (dest.width as f64 / 2.0, dest.height as f64 / 2.0);
        let (cx, cy) = (dest.x as f64 + half_w, dest.y as f64 + half_h);
        let (sin, cos) = angle.to_radians().sin_cos();

        let extent_x = (half_w * cos.abs() + half_h * sin.abs()).ceil();
        let extent_y = (half_w * sin.abs() + half_h * cos.abs()).ceil();
        let x0 = ((cx - extent_x).floor() as i32).max(0);
        let x1 = ((cx + extent_x).ceil() as i32).min(self.width as i32);
        let y0 = ((cy - extent_y).floor() as i32).max(0);
        let y1 = ((cy + extent_y).ceil() as i32).min(self.height as i32);

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                // Inverse of a clockwise rotation in y-down screen space.
                let lx = dx * cos + dy * sin + half_w;
                let ly = -dx * sin + dy * cos + half_h;
                if lx < 0.0 || ly < 0.0 || lx >= dest.width as f64 || ly >= dest.height as f64 {
                    continue;
                }

                let mut tx = ((lx / dest.width as f64) * bitmap.width as f64) as u32;
                let mut ty = ((ly / dest.height as f64) * bitmap.height as f64) as u32;
                tx = tx.min(bitmap.width - 1);
                ty = ty.min(bitmap.height - 1);
                match flip {
                    Flip::None => {}
                    Flip::Horizontal => tx = bitmap.width - 1 - tx,
                    Flip::Vertical => ty = bitmap.height - 1 - ty,
                }

                let i = self.index(px, py);
                blend_pixel(&mut self.pixels[i..i + 4], bitmap.pixel(tx, ty));
            }
        }
    }
}

//=== Surface Implementation ==============================================

impl Surface for Canvas {
    fn clear(&mut self) {
        let c = self.clear_color;
        for chunk in self.back.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    fn present(&mut self) {
        self.presented += 1;
        self.publish();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let src = [color.r, color.g, color.b, color.a];
        let x0 = rect.x.max(0);
        let x1 = rect.right().min(self.width as i32);
        if x0 >= x1 {
            return;
        }
        for y in rect.y.max(0)..rect.bottom().min(self.height as i32) {
            let start = ((y as u32 * self.width + x0 as u32) * 4) as usize;
            let end = start + (x1 - x0) as usize * 4;
            for dst in self.back[start..end].chunks_exact_mut(4) {
                blend_pixel(dst, src);
            }
        }
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        if rect.width <= 0 || rect.height <= 0 {
            return;
        }
        let src = [color.r, color.g, color.b, color.a];
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);

        for x in rect.x..=right {
            self.blend(x, rect.y, src);
            if bottom != rect.y {
                self.blend(x, bottom, src);
            }
        }
        for y in rect.y + 1..bottom {
            self.blend(rect.x, y, src);
            if right != rect.x {
                self.blend(right, y, src);
            }
        }
    }

    fn copy_texture(
        &mut self,
        texture: TextureId,
        dest: Rect,
        angle: f64,
        flip: Flip,
    ) -> Result<(), RenderError> {
        if dest.width <= 0 || dest.height <= 0 {
            return Ok(());
        }

        let bitmap = self
            .textures
            .get(texture.0)
            .and_then(Option::as_ref)
            .ok_or(RenderError::UnknownTexture)?;
        if bitmap.width == 0 || bitmap.height == 0 {
            return Ok(());
        }

        let mut target = Target {
            pixels: &mut self.back,
            width: self.width,
            height: self.height,
        };
        if angle == 0.0 {
            target.blit_scaled(bitmap, dest, flip);
        } else {
            target.blit_rotated(bitmap, dest, angle, flip);
        }
        Ok(())
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId, RenderError> {
        let bitmap = Bitmap::open(path)?;
        debug!(
            target: "render",
            "Loaded texture {} ({}x{})",
            path.display(),
            bitmap.width,
            bitmap.height
        );
        Ok(self.push_texture(bitmap))
    }

    fn texture_size(&self, texture: TextureId) -> Result<(u32, u32), RenderError> {
        self.texture(texture).map(|b| (b.width, b.height))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.get_mut(texture.0) {
            *slot = None;
        }
    }

    fn load_font(&mut self, path: &Path, size: u32) -> Result<FontId, RenderError> {
        let sheet = GlyphSheet::new(Bitmap::open(path)?).map_err(|reason| {
            RenderError::AssetLoad {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        self.fonts.push(Some(LoadedFont { sheet, size: size.max(1) }));
        Ok(FontId(self.fonts.len() - 1))
    }

    fn destroy_font(&mut self, font: FontId) {
        if let Some(slot) = self.fonts.get_mut(font.0) {
            *slot = None;
        }
    }

    fn render_text(
        &mut self,
        font: FontId,
        text: &str,
        color: Color,
    ) -> Result<TextureId, RenderError> {
        if text.is_empty() {
            return Err(RenderError::Backend("text has zero width".into()));
        }
        let loaded = self
            .fonts
            .get(font.0)
            .and_then(Option::as_ref)
            .ok_or(RenderError::UnknownFont)?;
        let bitmap = loaded.sheet.render(text, loaded.size, color);
        Ok(self.push_texture(bitmap))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
