mod game;
mod home;

use serde::{Deserialize, Serialize};
use strum::Display;

pub use crate::action::{game::GameAction, home::HomeAction};

/// Where in a key press an action fired. Click bindings always fire `Start`; hold bindings
/// fire `Start`, `Repeat` and `End` for press, auto-repeat and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, Deserialize, Default)]
pub enum ActionState {
    #[default]
    Start,
    Repeat,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Deserialize)]
pub enum Command {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    ToggleShowHelp,
    StartGame,
    // Page commands
    Home(HomeAction),
    Game(GameAction),
}

impl Command {
    /// Human readable name, page commands included, e.g. `Game: Jump`.
    pub fn describe(&self) -> String {
        match self {
            Command::Home(action) => format!("Home: {action}"),
            Command::Game(action) => format!("Game: {action}"),
            Command::Resize(width, height) => format!("Resize to {width}x{height}"),
            Command::Error(message) => format!("Error: {message}"),
            command => command.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub command: Command,
    pub state: ActionState,
}

macro_rules! act {
    ($command:expr) => {
        $crate::action::Action { command: $command, state: $crate::action::ActionState::default() }
    };
    ($command:expr, $state:expr) => {
        $crate::action::Action { command: $command, state: $state }
    };
}

pub(crate) use act;
