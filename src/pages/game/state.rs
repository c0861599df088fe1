use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    constants::game,
    pages::game::{
        bird::Bird,
        object::{Object, Rectangle},
        pipe::Pipe,
    },
};

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub bird: Rectangle,
    /// Upper and lower segment of every active pipe, oldest first.
    pub pipes: Vec<(Rectangle, Rectangle)>,
    pub score: u32,
    pub game_over: bool,
}

/// One run of the game.
///
/// `pipes` is a FIFO queue: new pipes are pushed at the back and only the front (oldest,
/// left-most) pipe is ever evicted. x decreases with age, so it increases from front to back.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(super) bird: Bird,
    pub(super) pipes: VecDeque<Pipe>,
    pub(super) score: u32,
    pub(super) game_over: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            bird: Bird::new(game::BIRD_INITIAL_X, game::BIRD_INITIAL_Y),
            pipes: VecDeque::new(),
            score: 0,
            game_over: false,
        }
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &VecDeque<Pipe> {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Runs one tick of the simulation. Does nothing once the game is over.
    pub fn advance<R: Rng + ?Sized>(&mut self, jump_pressed: bool, rng: &mut R) {
        if self.game_over {
            return;
        }

        self.bird.update(game::GRAVITY);
        if jump_pressed {
            self.bird.up(game::JUMP_IMPULSE);
        }

        if self.should_spawn() {
            let pipe = Pipe::spawn(rng);
            trace!("spawned pipe with gap at {:.1}", pipe.gap_top());
            self.pipes.push_back(pipe);
        }

        let mut collided = false;
        for pipe in self.pipes.iter_mut() {
            pipe.move_left(game::PIPE_SPEED);

            if pipe.collides_with(&self.bird) {
                collided = true;
            }

            if !pipe.passed && pipe.x < self.bird.x {
                pipe.passed = true;
                self.score += 1;
            }
        }
        if collided {
            self.end("pipe");
        }

        // Spawn spacing keeps pipes far enough apart that at most one leaves per tick.
        if self.pipes.front().is_some_and(Pipe::off_screen) {
            self.pipes.pop_front();
            trace!("evicted pipe, {} left", self.pipes.len());
        }
        debug_assert!(!self.pipes.front().is_some_and(Pipe::off_screen));

        if self.bird.out_of_bounds(game::SCREEN_HEIGHT) {
            self.end("boundary");
        }
    }

    /// Starts a new run. Ignored (returns `false`) while the current run is still going.
    pub fn restart(&mut self) -> bool {
        if !self.game_over {
            return false;
        }
        *self = GameState::new();
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bird: self.bird.bounds(),
            pipes: self.pipes.iter().map(Pipe::segments).collect(),
            score: self.score,
            game_over: self.game_over,
        }
    }

    fn should_spawn(&self) -> bool {
        match self.pipes.back() {
            None => true,
            Some(newest) => newest.x < game::SCREEN_WIDTH - game::SPAWN_SPACING,
        }
    }

    fn end(&mut self, cause: &str) {
        if !self.game_over {
            debug!("game over ({cause}) with score {}", self.score);
        }
        self.game_over = true;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn with_pipes(pipes: Vec<Pipe>) -> GameState {
        GameState { pipes: pipes.into(), ..GameState::new() }
    }

    /// Keeps the bird hovering between roughly y=200 and y=315.
    fn hover(state: &GameState) -> bool {
        state.bird.y > game::BIRD_INITIAL_Y
    }

    fn free_fall_until_over(state: &mut GameState, rng: &mut ChaCha8Rng) {
        for _ in 0..100 {
            state.advance(false, rng);
            if state.is_over() {
                return;
            }
        }
        panic!("bird never hit the floor");
    }

    #[test]
    fn test_new_game_defaults() {
        let state = GameState::new();
        assert_eq!(state.bird, Bird::new(100.0, 300.0));
        assert_eq!(state.bird.velocity(), 0.0);
        assert!(state.pipes.is_empty());
        assert_eq!(state.score, 0);
        assert!(!state.is_over());
    }

    #[test]
    fn test_physics_without_jump() {
        let mut rng = rng();
        for velocity in [-10.0, -2.5, 0.0, 2.0, 9.5] {
            let mut state = GameState::new();
            state.bird.velocity = velocity;
            state.advance(false, &mut rng);
            assert_eq!(state.bird.velocity, velocity + 0.5);
            assert_eq!(state.bird.y, 300.0 + velocity + 0.5);
            assert_eq!(state.bird.x, 100.0);
        }
    }

    #[test]
    fn test_jump_overrides_velocity() {
        let mut rng = rng();
        for velocity in [-10.0, 0.0, 7.5, 15.0] {
            let mut state = GameState::new();
            state.bird.velocity = velocity;
            state.advance(true, &mut rng);
            assert_eq!(state.bird.velocity, -10.0);
            // Position still integrates the pre-jump velocity on the jump tick
            assert_eq!(state.bird.y, 300.0 + velocity + 0.5);
        }
    }

    #[test]
    fn test_repeated_jumps_do_not_accumulate() {
        let mut rng = rng();
        let mut state = GameState::new();
        for _ in 0..3 {
            state.advance(true, &mut rng);
            assert_eq!(state.bird.velocity, -10.0);
        }
        // 300 + 0.5, then -9.5 twice
        assert_eq!(state.bird.y, 281.5);
    }

    #[test]
    fn test_first_tick_spawns_pipe() {
        let mut rng = rng();
        let mut state = GameState::new();
        state.advance(false, &mut rng);
        assert_eq!(state.pipes.len(), 1);
        assert_eq!(state.pipes[0].x, game::SCREEN_WIDTH - game::PIPE_SPEED);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut rng = rng();
        let mut state = GameState::new();
        let mut spawn_ticks = Vec::new();

        // The first pipe reaches the bird around tick 224, so nothing can collide before that.
        for tick in 1..=223 {
            let before = state.pipes.len();
            let newest_x = state.pipes.back().map(Pipe::x);
            state.advance(hover(&state), &mut rng);
            assert!(!state.is_over(), "bird died at tick {tick}");

            let after = state.pipes.len();
            assert!(after <= before + 1, "more than one spawn at tick {tick}");
            if after > before {
                assert!(newest_x.map_or(true, |x| x < 500.0));
                spawn_ticks.push(tick);
            } else {
                assert!(newest_x.is_some_and(|x| x >= 500.0));
            }
        }
        assert_eq!(spawn_ticks, vec![1, 102, 203]);
    }

    #[test]
    fn test_score_counts_each_pipe_once() {
        let mut rng = rng();
        let mut state = with_pipes(vec![Pipe::new(101.0, 250.0)]);

        state.advance(false, &mut rng);
        assert_eq!(state.score, 1);
        assert!(state.pipes[0].passed);

        for _ in 0..10 {
            state.advance(false, &mut rng);
        }
        assert!(!state.is_over());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_score_requires_strictly_passing_leading_edge() {
        let mut rng = rng();
        let mut state = with_pipes(vec![Pipe::new(103.0, 250.0)]);

        state.advance(false, &mut rng);
        assert_eq!(state.pipes[0].x, 100.0);
        assert_eq!(state.score, 0);

        state.advance(false, &mut rng);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_collision_still_scores_that_tick() {
        let mut rng = rng();
        // Gap starts at 400, the bird at ~300 hits the upper segment
        let mut state = with_pipes(vec![Pipe::new(101.0, 400.0)]);

        state.advance(false, &mut rng);
        assert!(state.is_over());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_evicts_front_pipe_once_off_screen() {
        let mut rng = rng();
        let mut state = with_pipes(vec![Pipe::new(-78.0, 250.0), Pipe::new(400.0, 250.0)]);

        state.advance(false, &mut rng);
        let xs: Vec<f64> = state.pipes.iter().map(Pipe::x).collect();
        assert_eq!(xs, vec![397.0, 797.0]);
    }

    #[test]
    fn test_keeps_pipe_with_trailing_edge_at_zero() {
        let mut rng = rng();
        let mut state = with_pipes(vec![Pipe::new(-77.0, 250.0), Pipe::new(600.0, 250.0)]);

        state.advance(false, &mut rng);
        assert_eq!(state.pipes.len(), 2);
        assert_eq!(state.pipes[0].trailing_edge(), 0.0);

        state.advance(false, &mut rng);
        assert_eq!(state.pipes.len(), 1);
        assert_eq!(state.pipes[0].x, 594.0);
    }

    #[test]
    fn test_floor_kills_after_free_fall() {
        let mut rng = rng();
        let mut state = GameState::new();
        for _ in 0..34 {
            state.advance(false, &mut rng);
        }
        assert_eq!(state.bird.y, 597.5);
        assert!(!state.is_over());

        state.advance(false, &mut rng);
        assert_eq!(state.bird.y, 615.0);
        assert!(state.is_over());
    }

    #[test]
    fn test_ceiling_kills() {
        let mut rng = rng();
        let mut state = GameState::new();
        state.bird.y = 5.0;
        state.bird.velocity = -10.0;
        state.advance(false, &mut rng);
        assert!(state.is_over());
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut rng = rng();
        let mut state = GameState::new();
        free_fall_until_over(&mut state, &mut rng);

        let frozen = state.clone();
        for tick in 0..50 {
            state.advance(tick % 2 == 0, &mut rng);
            assert_eq!(state, frozen);
        }
    }

    #[test]
    fn test_restart_resets_fully() {
        let mut rng = rng();
        let mut state = GameState::new();
        state.score = 3;
        free_fall_until_over(&mut state, &mut rng);

        assert!(state.restart());
        assert_eq!(state, GameState::new());

        state.advance(false, &mut rng);
        assert_eq!(state.pipes.len(), 1);
    }

    #[test]
    fn test_restart_ignored_while_running() {
        let mut rng = rng();
        let mut state = GameState::new();
        for _ in 0..5 {
            state.advance(false, &mut rng);
        }
        let running = state.clone();
        assert!(!state.restart());
        assert_eq!(state, running);
    }

    #[test]
    fn test_snapshot() {
        let mut state = with_pipes(vec![Pipe::new(200.0, 150.0)]);
        state.score = 4;

        let snapshot = state.snapshot();
        assert_eq!(snapshot.bird, Rectangle::new(100.0, 300.0, 30.0, 30.0));
        assert_eq!(
            snapshot.pipes,
            vec![(Rectangle::new(200.0, 0.0, 80.0, 150.0), Rectangle::new(200.0, 350.0, 80.0, 250.0))]
        );
        assert_eq!(snapshot.score, 4);
        assert!(!snapshot.game_over);

        assert!(GameState::new().snapshot().pipes.is_empty());
    }

    #[test]
    fn test_invariants_over_long_run() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut state = GameState::new();

            for _ in 0..5000 {
                // Aim for the middle of the nearest gap still ahead of the bird's tail
                let target = state
                    .pipes
                    .iter()
                    .find(|pipe| pipe.trailing_edge() > state.bird.x)
                    .map_or(game::BIRD_INITIAL_Y, |pipe| pipe.gap_top + 100.0);
                let jump = state.bird.y > target;

                let before = state.clone();
                state.advance(jump, &mut rng);

                assert!(state.score >= before.score);
                assert!(state.score - before.score <= 1);
                assert!(state.pipes.len() + 1 >= before.pipes.len());
                // x decreases with age: the oldest pipe at the front is the left-most one
                for (older, newer) in state.pipes.iter().zip(state.pipes.iter().skip(1)) {
                    assert!(older.x < newer.x, "pipes out of order: {} >= {}", older.x, newer.x);
                }
                let passed = state.pipes.iter().filter(|pipe| pipe.passed).count() as u32;
                assert!(passed <= state.score);

                if state.is_over() {
                    break;
                }
            }
        }
    }
}
