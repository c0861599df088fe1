pub mod game;
pub mod home;

/// Outer viewport size in terminal cells, border included.
pub const WIDTH: u16 = 82;
pub const HEIGHT: u16 = 32;

pub const WINDOW_TITLE: &str = "Flappy Bird Clone";
