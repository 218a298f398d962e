//=========================================================================
// Pipes
//=========================================================================
//
// Obstacles: a `PipePair` is one upper and one lower pipe sharing an x
// position, separated by a fixed vertical gap.
//
// ```text
//   y = 0 ┌──┐
//         │  │ upper (drawn flipped)
//         └──┘
//               gap
//         ┌──┐
//         │  │ lower
//   y = H └──┘
// ```
//
// Invariant: upper.height + gap + lower.height == playfield height.
//
//=========================================================================

//=== External Dependencies ===============================================

use rand::Rng;

//=== Internal Dependencies ===============================================

use super::bird::Bird;
use crate::config::GameConfig;
use crate::core::render::{Flip, Rect, RenderError, Surface, TextureId};

//=== PipeLayout ==========================================================

/// Vertical layout rules for new pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeLayout {
    pub playfield_height: i32,
    pub gap: i32,
    pub min_height: i32,
}

impl PipeLayout {
    /// Inclusive range the upper pipe height is drawn from.
    pub fn upper_range(&self) -> (i32, i32) {
        let max = self.playfield_height - self.min_height - self.gap;
        (self.min_height, max.max(self.min_height))
    }
}

impl From<&GameConfig> for PipeLayout {
    fn from(config: &GameConfig) -> Self {
        Self {
            playfield_height: config.height as i32,
            gap: config.pipe_gap,
            min_height: config.min_pipe_height,
        }
    }
}

//=== Pipe ================================================================

#[derive(Debug, Clone)]
struct Pipe {
    texture: TextureId,
    rect: Rect,
    upper: bool,
}

impl Pipe {
    fn hits(&self, bird: &Bird) -> bool {
        self.rect.touches(&bird.rect())
    }

    fn paint(&self, surface: &mut dyn Surface) -> Result<(), RenderError> {
        let flip = if self.upper { Flip::Vertical } else { Flip::None };
        surface.copy_texture(self.texture, self.rect, 0.0, flip)
    }
}

//=== PipePair ============================================================

#[derive(Debug, Clone)]
pub struct PipePair {
    x: i32,
    width: i32,
    counted: bool,

    upper: Pipe,
    lower: Pipe,
}

impl PipePair {
    //--- Construction -----------------------------------------------------

    /// Creates a pair at `x` with a random split drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(
        texture: TextureId,
        x: i32,
        width: i32,
        layout: &PipeLayout,
        rng: &mut R,
    ) -> Self {
        let (min, max) = layout.upper_range();
        let upper_height = rng.gen_range(min..=max);
        Self::with_split(texture, x, width, layout, upper_height)
    }

    /// Creates a pair with an explicit upper pipe height.
    pub fn with_split(
        texture: TextureId,
        x: i32,
        width: i32,
        layout: &PipeLayout,
        upper_height: i32,
    ) -> Self {
        let lower_height = layout.playfield_height - upper_height - layout.gap;
        let lower_y = layout.playfield_height - lower_height;

        Self {
            x,
            width,
            counted: false,
            upper: Pipe {
                texture,
                rect: Rect::new(x, 0, width, upper_height),
                upper: true,
            },
            lower: Pipe {
                texture,
                rect: Rect::new(x, lower_y, width, lower_height),
                upper: false,
            },
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// Trailing edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn upper_rect(&self) -> Rect {
        self.upper.rect
    }

    pub fn lower_rect(&self) -> Rect {
        self.lower.rect
    }

    pub fn is_counted(&self) -> bool {
        self.counted
    }

    /// Marks the pair as scored. Returns false if it already was.
    pub fn mark_counted(&mut self) -> bool {
        !std::mem::replace(&mut self.counted, true)
    }

    //--- Behaviour --------------------------------------------------------

    /// True if the bird touches either pipe.
    pub fn hits(&self, bird: &Bird) -> bool {
        self.upper.hits(bird) || self.lower.hits(bird)
    }

    /// Moves the pair horizontally by `dx`.
    pub fn shift(&mut self, dx: i32) {
        self.x += dx;
        self.upper.rect.x += dx;
        self.lower.rect.x += dx;
    }

    pub fn paint(&self, surface: &mut dyn Surface) -> Result<(), RenderError> {
        self.upper.paint(surface)?;
        self.lower.paint(surface)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
