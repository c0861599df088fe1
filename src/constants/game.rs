use ratatui::style::{Color, Style};

// World units. The play area is projected onto whatever canvas the page is given.
pub const SCREEN_WIDTH: f64 = 800.0;
pub const SCREEN_HEIGHT: f64 = 600.0;

pub const BIRD_SIZE: f64 = 30.0;
pub const BIRD_INITIAL_X: f64 = 100.0;
pub const BIRD_INITIAL_Y: f64 = SCREEN_HEIGHT / 2.0;

/// Velocity change per tick, positive is downward.
pub const GRAVITY: f64 = 0.5;
/// Velocity assigned (not added) on a jump.
pub const JUMP_IMPULSE: f64 = -10.0;

pub const PIPE_WIDTH: f64 = 80.0;
pub const GAP_HEIGHT: f64 = 200.0;
pub const PIPE_SPEED: f64 = 3.0;
/// A new pipe spawns once the newest one is this far from the right edge.
pub const SPAWN_SPACING: f64 = 300.0;
/// Minimum height of either pipe segment.
pub const MARGIN: f64 = 50.0;

pub const SKY_STYLE: Style = Style { bg: Some(Color::Indexed(117)), ..Style::new() };
pub const BIRD_STYLE: Style = Style { bg: Some(Color::Yellow), ..Style::new() };
pub const PIPE_STYLE: Style = Style { bg: Some(Color::Green), ..Style::new() };
pub const SCORE_STYLE: Style = Style { fg: Some(Color::White), ..Style::new() };
pub const BANNER_STYLE: Style = Style { fg: Some(Color::White), bg: Some(Color::Black), ..Style::new() };
