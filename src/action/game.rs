use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum GameAction {
    Jump,
    Restart,
}
