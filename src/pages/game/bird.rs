use crate::{
    constants::game::BIRD_SIZE,
    pages::game::object::Object,
};

/// The player. Only the vertical axis moves; x is fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub(super) x: f64,
    pub(super) y: f64,
    pub(super) velocity: f64,
}

impl Bird {
    pub fn new(x: f64, y: f64) -> Self {
        Bird { x, y, velocity: 0.0 }
    }

    pub fn update(&mut self, gravity: f64) {
        self.velocity += gravity;
        self.y += self.velocity;
    }

    /// Replaces the current velocity, so repeated jumps never stack.
    pub fn up(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn out_of_bounds(&self, height: f64) -> bool {
        self.y < 0.0 || self.y > height
    }
}

impl Object for Bird {
    fn get_size(&self) -> (f64, f64) {
        (BIRD_SIZE, BIRD_SIZE)
    }

    fn get_pos(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}
