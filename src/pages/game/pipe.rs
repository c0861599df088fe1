use rand::Rng;

use crate::{
    constants::game::{GAP_HEIGHT, MARGIN, PIPE_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH},
    pages::game::{
        bird::Bird,
        object::{Object, Rectangle},
    },
};

/// A top and a bottom segment separated by a gap of `GAP_HEIGHT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub(super) x: f64,
    pub(super) gap_top: f64,
    pub(super) passed: bool,
}

impl Pipe {
    pub fn new(x: f64, gap_top: f64) -> Self {
        Pipe { x, gap_top, passed: false }
    }

    /// A fresh pipe at the right edge of the screen. Both segments are at least `MARGIN` tall.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let gap_top = rng.gen_range(MARGIN..SCREEN_HEIGHT - GAP_HEIGHT - MARGIN);
        Pipe::new(SCREEN_WIDTH, gap_top)
    }

    pub fn move_left(&mut self, step: f64) {
        self.x -= step;
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn gap_top(&self) -> f64 {
        self.gap_top
    }

    pub fn gap_bottom(&self) -> f64 {
        self.gap_top + GAP_HEIGHT
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn trailing_edge(&self) -> f64 {
        self.x + PIPE_WIDTH
    }

    pub fn off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }

    /// The bird hits the pipe when it shares the pipe's column and is not fully inside the gap.
    /// Segments extend past the screen edges, so a bird above the ceiling still hits the top one.
    pub fn collides_with(&self, bird: &Bird) -> bool {
        if !bird.overlaps_horizontally(self) {
            return false;
        }
        let (_, top) = bird.get_pos();
        let (_, height) = bird.get_size();
        top < self.gap_top || top + height > self.gap_bottom()
    }

    /// Top and bottom segments as drawable rectangles.
    pub fn segments(&self) -> (Rectangle, Rectangle) {
        let upper = Rectangle::new(self.x, 0.0, PIPE_WIDTH, self.gap_top);
        let lower = Rectangle::new(self.x, self.gap_bottom(), PIPE_WIDTH, SCREEN_HEIGHT - self.gap_bottom());
        (upper, lower)
    }
}

impl Object for Pipe {
    fn get_size(&self) -> (f64, f64) {
        (PIPE_WIDTH, SCREEN_HEIGHT)
    }

    fn get_pos(&self) -> (f64, f64) {
        (self.x, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_collides_with_top_segment() {
        let bird = Bird::new(100.0, 50.0);
        let pipe = Pipe::new(90.0, 100.0);
        assert!(pipe.collides_with(&bird));
    }

    #[test]
    fn test_passes_through_gap() {
        let bird = Bird::new(100.0, 150.0);
        let pipe = Pipe::new(90.0, 100.0);
        assert!(!pipe.collides_with(&bird));

        // Exactly flush with the gap bottom is still inside
        let bird = Bird::new(100.0, 270.0);
        assert!(!pipe.collides_with(&bird));
    }

    #[test]
    fn test_collides_with_bottom_segment() {
        let bird = Bird::new(100.0, 290.0);
        let pipe = Pipe::new(90.0, 100.0);
        assert!(pipe.collides_with(&bird));
    }

    #[test]
    fn test_no_collision_without_horizontal_overlap() {
        let bird = Bird::new(100.0, 0.0);
        assert!(!Pipe::new(130.0, 300.0).collides_with(&bird));
        assert!(!Pipe::new(20.0, 300.0).collides_with(&bird));
        assert!(Pipe::new(21.0, 300.0).collides_with(&bird));
    }

    #[test]
    fn test_above_ceiling_still_hits_top_segment() {
        let bird = Bird::new(100.0, -200.0);
        assert!(Pipe::new(90.0, 100.0).collides_with(&bird));
    }

    #[test]
    fn test_spawn_gap_range() {
        for seed in 0..500 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let pipe = Pipe::spawn(&mut rng);
            assert_eq!(pipe.x(), SCREEN_WIDTH);
            assert!(!pipe.passed());
            assert!(pipe.gap_top() >= MARGIN, "gap_top {} below margin", pipe.gap_top());
            assert!(pipe.gap_top() < SCREEN_HEIGHT - GAP_HEIGHT - MARGIN, "gap_top {} too low", pipe.gap_top());

            let (upper, lower) = pipe.segments();
            assert!(upper.height >= MARGIN);
            assert!(lower.height > MARGIN);
        }
    }

    #[test]
    fn test_segments() {
        let (upper, lower) = Pipe::new(200.0, 150.0).segments();
        assert_eq!(upper, Rectangle::new(200.0, 0.0, 80.0, 150.0));
        assert_eq!(lower, Rectangle::new(200.0, 350.0, 80.0, 250.0));
    }

    #[test]
    fn test_off_screen() {
        let mut pipe = Pipe::new(-77.0, 100.0);
        pipe.move_left(3.0);
        assert_eq!(pipe.trailing_edge(), 0.0);
        assert!(!pipe.off_screen());
        pipe.move_left(3.0);
        assert!(pipe.off_screen());
    }
}
