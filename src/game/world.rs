//=========================================================================
// World
//=========================================================================
//
// Simulation state of one Game scene: the bird, the live pipe pairs and
// the round's score. Rendering lives in the scene; this module is pure
// state and rules so it can be driven tick by tick from tests.
//
// Tick order:
// ```text
//   collide? ──yes──> game_over (one-way)
//      │
//   game_over ? bird.fall() : spawn → scroll → score → retire
//      │
//   bird.advance() while its bottom edge is above or on the floor
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use super::bird::Bird;
use super::pipe::{PipeLayout, PipePair};
use crate::config::GameConfig;
use crate::core::render::TextureId;

//=== World ===============================================================

pub struct World {
    //--- Rules ------------------------------------------------------------
    width: i32,
    height: i32,
    scroll_speed: i32,
    spawn_distance: i32,
    layout: PipeLayout,

    pipe_texture: TextureId,
    pipe_width: i32,

    //--- State ------------------------------------------------------------
    bird: Bird,
    pairs: Vec<PipePair>,
    score: u32,
    best_score: u32,
    game_over: bool,

    rng: StdRng,
}

impl World {
    //--- Construction -----------------------------------------------------

    /// Creates a world around `bird`.
    ///
    /// The RNG is seeded once here, from `config.seed` when set and from
    /// OS entropy otherwise, and reused for every pair of every round.
    pub fn new(config: &GameConfig, bird: Bird, pipe_texture: TextureId, pipe_width: i32) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            width: config.width as i32,
            height: config.height as i32,
            scroll_speed: config.scroll_speed,
            spawn_distance: config.spawn_distance,
            layout: PipeLayout::from(config),
            pipe_texture,
            pipe_width,
            bird,
            pairs: Vec::new(),
            score: 0,
            best_score: 0,
            game_over: false,
            rng,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn pairs(&self) -> &[PipePair] {
        &self.pairs
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }

    /// True once the bird has crashed and landed on the floor.
    pub fn round_over(&self) -> bool {
        self.game_over && self.bird.rect().bottom() >= self.height
    }

    //--- Round Control ----------------------------------------------------

    /// Starts a fresh round. The best score is kept.
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.bird.reset_position();
        self.score = 0;
        self.game_over = false;
    }

    /// Raises the best score to at least `best`.
    pub fn set_best_score(&mut self, best: u32) {
        self.best_score = self.best_score.max(best);
    }

    /// Player input. Ignored once the round is lost.
    pub fn flap(&mut self) {
        if !self.game_over {
            self.bird.jump();
        }
    }

    //--- Tick -------------------------------------------------------------

    /// Advances the simulation by one tick.
    pub fn update(&mut self) {
        if !self.game_over && self.collides() {
            debug!(
                target: "game",
                "Collision at ({}, {}), score {}",
                self.bird.x(),
                self.bird.y(),
                self.score
            );
            self.game_over = true;
        }

        if self.game_over {
            self.bird.fall();
        } else {
            self.spawn();
            self.scroll();
            self.count_passed();
            self.retire();
        }

        if self.bird.rect().bottom() <= self.height {
            self.bird.advance();
        }
    }

    //--- Rules ------------------------------------------------------------

    fn collides(&self) -> bool {
        let bird = self.bird.rect();
        bird.y <= 0
            || bird.bottom() >= self.height
            || self.pairs.iter().any(|pair| pair.hits(&self.bird))
    }

    fn spawn(&mut self) {
        let due = match self.pairs.last() {
            None => true,
            Some(last) => self.width - last.right() >= self.spawn_distance,
        };
        if !due {
            return;
        }

        let pair = PipePair::new(
            self.pipe_texture,
            self.width,
            self.pipe_width,
            &self.layout,
            &mut self.rng,
        );
        debug!(
            target: "game",
            "Spawned pair at x={} with upper height {}",
            pair.x(),
            pair.upper_rect().height
        );
        self.pairs.push(pair);
    }

    fn scroll(&mut self) {
        for pair in self.pairs.iter_mut() {
            pair.shift(-self.scroll_speed);
        }
    }

    fn count_passed(&mut self) {
        let leading_edge = self.bird.rect().right();
        for pair in self.pairs.iter_mut() {
            if pair.right() < leading_edge && pair.mark_counted() {
                self.score += 1;
                self.best_score = self.best_score.max(self.score);
                debug!(target: "game", "Score {} (best {})", self.score, self.best_score);
            }
        }
    }

    fn retire(&mut self) {
        self.pairs.retain(|pair| pair.right() >= 0);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bird::BirdPhysics;

    const PIPE_WIDTH: i32 = 52;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        }
    }

    /// Config whose pipes never hit a bird hovering at the anchor.
    fn hover_config() -> GameConfig {
        GameConfig {
            gravity: 0.0,
            min_pipe_height: 220,
            ..config()
        }
    }

    fn world_with(config: &GameConfig, anchor: (i32, i32)) -> World {
        let bird = Bird::new(vec![], anchor, (34, 24), BirdPhysics::from(config));
        World::new(config, bird, TextureId(0), PIPE_WIDTH)
    }

    fn world(config: &GameConfig) -> World {
        world_with(config, config.bird_anchor())
    }

    fn run(world: &mut World, ticks: usize) {
        for _ in 0..ticks {
            world.update();
        }
    }

    //=====================================================================
    // Spawning
    //=====================================================================

    #[test]
    fn first_pair_spawns_on_first_tick() {
        let mut world = world(&hover_config());
        assert!(world.pairs().is_empty());

        world.update();

        assert_eq!(world.pairs().len(), 1);
        // Spawned at x = 800, then scrolled in the same tick.
        assert_eq!(world.pairs()[0].x(), 798);
    }

    #[test]
    fn second_pair_spawns_when_spawn_distance_opens() {
        let mut world = world(&GameConfig {
            gravity: 0.0,
            ..config()
        });

        run(&mut world, 176);
        assert_eq!(world.pairs().len(), 1);
        assert_eq!(world.pairs()[0].x(), 448);
        assert_eq!(800 - world.pairs()[0].right(), 300);

        world.update();
        assert_eq!(world.pairs().len(), 2);
        assert_eq!(world.pairs()[1].x(), 798);
    }

    #[test]
    fn spawned_pairs_respect_split_invariant() {
        let config = GameConfig {
            gravity: 0.0,
            ..config()
        };
        let mut world = world(&config);

        for _ in 0..280 {
            world.update();
            for pair in world.pairs() {
                let upper = pair.upper_rect().height;
                let lower = pair.lower_rect().height;
                assert_eq!(upper + config.pipe_gap + lower, 600);
                assert!(upper >= 100 && lower >= 100);
            }
        }
    }

    #[test]
    fn same_seed_same_pipes() {
        let config = GameConfig {
            gravity: 0.0,
            ..config()
        };
        let splits = |world: &mut World| {
            run(world, 400);
            world
                .pairs()
                .iter()
                .map(|p| p.upper_rect().height)
                .collect::<Vec<_>>()
        };

        let a = splits(&mut world(&config));
        let b = splits(&mut world(&config));
        assert_eq!(a, b);
    }

    //=====================================================================
    // Scoring
    //=====================================================================

    #[test]
    fn each_pair_scores_exactly_once() {
        let mut world = world(&hover_config());

        // Pair 1 trailing edge: 852 - 2k < 217 first at k = 318.
        run(&mut world, 317);
        assert_eq!(world.score(), 0);
        world.update();
        assert_eq!(world.score(), 1);

        // Pair 2 spawned on tick 177 scores 176 ticks later.
        run(&mut world, 175);
        assert_eq!(world.score(), 1);
        world.update();
        assert_eq!(world.score(), 2);

        let mut last = world.score();
        for _ in 494..600 {
            world.update();
            assert!(world.score() >= last);
            last = world.score();
        }
        assert_eq!(world.score(), 2);
        assert!(!world.is_game_over());
        assert_eq!(world.best_score(), 2);
    }

    #[test]
    fn passed_pairs_retire_off_the_left_edge() {
        let mut world = world(&hover_config());

        // Pair 1 right edge: 852 - 2k, negative first at k = 427.
        run(&mut world, 426);
        assert_eq!(world.pairs()[0].right(), 0);
        world.update();
        assert!(world.pairs().iter().all(|p| p.right() >= 0));
        assert_eq!(world.pairs().len(), 2);
    }

    //=====================================================================
    // Collisions
    //=====================================================================

    #[test]
    fn touching_the_ceiling_ends_the_round() {
        let config = hover_config();
        // Top edge at y = 0.
        let mut world = world_with(&config, (200, 12));
        world.update();
        assert!(world.is_game_over());
    }

    #[test]
    fn touching_the_floor_ends_the_round() {
        let config = hover_config();
        // Bottom edge exactly on the floor (576 + 24 = 600).
        let mut world = world_with(&config, (200, 588));
        world.update();
        assert!(world.is_game_over());
    }

    #[test]
    fn one_pixel_above_the_floor_keeps_flying() {
        let config = hover_config();
        // Bottom edge at 599.
        let mut world = world_with(&config, (200, 587));
        world.update();
        assert!(!world.is_game_over());
        assert_eq!(world.bird().rect().bottom(), 599);
    }

    #[test]
    fn falling_to_the_floor_ends_the_round() {
        let mut world = world(&config());

        let mut ticks = 0;
        while !world.round_over() {
            world.update();
            ticks += 1;
            assert!(ticks < 1_000, "bird never landed");
        }

        assert!(world.is_game_over());
        assert!(world.bird().rect().bottom() >= 600);
        assert_eq!(world.score(), 0);
    }

    #[test]
    fn hitting_a_pipe_freezes_the_pipes_and_drops_the_bird() {
        // Upper pipe covers 0..400 so the hovering bird flies into it.
        let config = GameConfig {
            gravity: 0.0,
            min_pipe_height: 400,
            pipe_gap: 100,
            ..config()
        };
        let mut world = world(&config);

        run(&mut world, 292);
        assert!(!world.is_game_over());
        // Pair x = 216 now overlaps the bird's right edge at 217.
        world.update();
        assert!(world.is_game_over());

        let frozen: Vec<i32> = world.pairs().iter().map(|p| p.x()).collect();
        let y = world.bird().y();
        world.update();

        assert_eq!(world.pairs().iter().map(|p| p.x()).collect::<Vec<_>>(), frozen);
        assert_eq!(world.bird().velocity(), 10.0);
        assert!(world.bird().y() > y);
    }

    #[test]
    fn flap_is_ignored_after_game_over() {
        let config = hover_config();
        let mut world = world_with(&config, (200, 12));
        world.update();
        assert!(world.is_game_over());

        world.flap();
        assert!(!world.bird().is_jumping());
    }

    #[test]
    fn flap_jumps_while_playing() {
        let mut world = world(&config());
        world.flap();
        assert!(world.bird().is_jumping());
        assert_eq!(world.bird().velocity(), -4.0);
    }

    #[test]
    fn bird_stops_once_below_the_floor() {
        let mut world = world(&config());
        while !world.round_over() {
            world.update();
        }

        // At most one more step can carry it past the floor.
        run(&mut world, 1);
        assert!(world.bird().rect().bottom() > 600);

        let landed = world.bird().y();
        run(&mut world, 5);
        assert_eq!(world.bird().y(), landed);
    }

    //=====================================================================
    // Reset
    //=====================================================================

    #[test]
    fn reset_starts_a_fresh_round_and_keeps_best() {
        let mut world = world(&hover_config());
        run(&mut world, 320);
        assert_eq!(world.score(), 1);

        world.flap();
        world.reset();

        assert!(world.pairs().is_empty());
        assert_eq!(world.score(), 0);
        assert!(!world.is_game_over());
        assert_eq!((world.bird().x(), world.bird().y()), (183, 288));
        assert_eq!(world.bird().velocity(), 0.0);
        assert!(!world.bird().is_jumping());
        assert_eq!(world.best_score(), 1);
    }

    #[test]
    fn best_score_only_rises() {
        let mut world = world(&config());
        world.set_best_score(5);
        world.set_best_score(3);
        assert_eq!(world.best_score(), 5);
    }
}
