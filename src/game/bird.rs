//=========================================================================
// Bird
//=========================================================================
//
// The player entity: integer position, float vertical velocity, a jump
// flag and a purely visual rotation and animation clock.
//
// Physics per tick:
//   velocity += gravity
//   y        += trunc(velocity)
//
// The animation clock advances once per paint, not per physics step,
// so the flap rate follows the render rate.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::config::GameConfig;
use crate::core::render::{Color, Flip, Rect, RenderError, Surface, TextureId};

//=== Constants ===========================================================

/// Paint calls per animation frame.
const TICKS_PER_FRAME: u64 = 8;

/// Velocity from which the bird starts nosing down.
const NOSE_DIVE_SPEED: f32 = 5.0;
const NOSE_DIVE_STEP: f64 = 3.0;
const MAX_ANGLE: f64 = 90.0;

//=== BirdPhysics =========================================================

/// Physics constants applied by [`Bird`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdPhysics {
    pub gravity: f32,
    pub jump_impulse: f32,
    pub fall_speed: f32,
}

impl From<&GameConfig> for BirdPhysics {
    fn from(config: &GameConfig) -> Self {
        Self {
            gravity: config.gravity,
            jump_impulse: config.jump_impulse,
            fall_speed: config.fall_speed,
        }
    }
}

impl Default for BirdPhysics {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

//=== Bird ================================================================

#[derive(Debug, Clone)]
pub struct Bird {
    frames: Vec<TextureId>,
    clock: u64,

    x: i32,
    y: i32,
    width: i32,
    height: i32,
    velocity: f32,
    angle: f64,
    jumping: bool,

    anchor: (i32, i32),
    physics: BirdPhysics,
}

impl Bird {
    //--- Construction -----------------------------------------------------

    /// Creates a bird centred on `anchor`.
    ///
    /// `size` is the sprite size; every frame is drawn stretched to it.
    pub fn new(
        frames: Vec<TextureId>,
        anchor: (i32, i32),
        size: (i32, i32),
        physics: BirdPhysics,
    ) -> Self {
        let mut bird = Self {
            frames,
            clock: 0,
            x: 0,
            y: 0,
            width: size.0,
            height: size.1,
            velocity: 0.0,
            angle: 0.0,
            jumping: false,
            anchor,
            physics,
        };
        bird.reset_position();
        bird
    }

    //--- Accessors --------------------------------------------------------

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn frames(&self) -> &[TextureId] {
        &self.frames
    }

    /// Collision box.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    //--- State Transitions ------------------------------------------------

    /// Returns the bird to its anchor, motionless and level.
    pub fn reset_position(&mut self) {
        self.x = self.anchor.0 - self.width / 2;
        self.y = self.anchor.1 - self.height / 2;
        self.velocity = 0.0;
        self.angle = 0.0;
        self.jumping = false;
    }

    /// Applies the jump impulse, or strengthens an ongoing ascent.
    ///
    /// Presses while already jumping stack without limit.
    pub fn jump(&mut self) {
        if self.jumping {
            self.velocity -= 1.0;
            return;
        }

        self.jumping = true;
        self.angle = 0.0;
        self.velocity = self.physics.jump_impulse;
    }

    /// Switches to the constant post-collision drop speed.
    pub fn fall(&mut self) {
        self.velocity = self.physics.fall_speed;
    }

    /// Integrates one tick of vertical motion.
    pub fn advance(&mut self) {
        self.velocity += self.physics.gravity;
        self.y += self.velocity as i32;

        if self.jumping && self.velocity >= 0.0 {
            self.jumping = false;
            self.velocity = 0.0;
        }
    }

    //--- Rendering --------------------------------------------------------

    /// Draws the current animation frame and advances the animation clock.
    pub fn paint(&mut self, surface: &mut dyn Surface, outline: bool) -> Result<(), RenderError> {
        self.clock += 1;

        let rect = self.rect();
        if outline {
            surface.fill_rect(rect, Color::RED);
            surface.draw_rect(rect, Color::RED);
        }

        if self.velocity >= NOSE_DIVE_SPEED && self.angle < MAX_ANGLE {
            self.angle = (self.angle + NOSE_DIVE_STEP).min(MAX_ANGLE);
        }

        match self.current_frame() {
            Some(frame) => surface.copy_texture(frame, rect, self.angle, Flip::None),
            None => Ok(()),
        }
    }

    fn current_frame(&self) -> Option<TextureId> {
        if self.frames.is_empty() {
            return None;
        }
        let index = (self.clock / TICKS_PER_FRAME) as usize % self.frames.len();
        Some(self.frames[index])
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
