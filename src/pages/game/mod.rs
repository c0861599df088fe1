mod bird;
mod object;
mod pipe;
mod state;

use std::collections::HashMap;

use color_eyre::eyre::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;

use self::object::Object;
pub use self::state::GameState;
use super::{Frame, Page, PageId};
use crate::{
    action::{act, Action, ActionState, Command, GameAction},
    config::{Config, PageKeyBindings, Styles},
    constants::game,
};

pub struct GamePage {
    pub action_tx: Option<UnboundedSender<Action>>,
    pub keymap: PageKeyBindings,
    styles: Styles,
    state: GameState,
    rng: StdRng,
    /// Set by any jump input since the last tick, consumed by the next tick.
    jump_queued: bool,
}

impl GamePage {
    /// `seed` fixes the pipe layout; without one a random seed is drawn and logged.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        info!("Seeding pipe generator with {seed}");
        GamePage {
            action_tx: None,
            keymap: PageKeyBindings::default(),
            styles: Styles::default(),
            state: GameState::new(),
            rng: StdRng::seed_from_u64(seed),
            jump_queued: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    fn tick(&mut self) {
        let jump = std::mem::take(&mut self.jump_queued);
        let was_over = self.state.is_over();
        self.state.advance(jump, &mut self.rng);
        if !was_over && self.state.is_over() {
            info!("Game over with score {}", self.state.score());
        }
    }

    fn restart(&mut self) {
        if self.state.restart() {
            self.jump_queued = false;
            info!("Restarted game");
        }
    }

    fn style(&self, name: &str, fallback: Style) -> Style {
        self.styles.get(name).copied().unwrap_or(fallback)
    }

    fn restart_key(&self) -> String {
        self.keymap.keys_for(&Command::Game(GameAction::Restart)).into_iter().next().unwrap_or_else(|| "R".to_string())
    }

    fn draw_object<T: Object>(&self, f: &mut Frame<'_>, area: Rect, object: &T, style: Style) {
        if let Some(cells) = object.transform(area) {
            f.render_widget(Block::default().style(style), cells);
        }
    }

    fn draw_banner(&self, f: &mut Frame<'_>, area: Rect, text: String) {
        let width = (text.chars().count() as u16 + 2).min(area.width);
        let [_, banner, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(1)]).areas(area);
        let [_, banner, _] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(width), Constraint::Fill(1)]).areas(banner);

        let paragraph = Paragraph::new(text).alignment(Alignment::Center).style(self.style("banner", game::BANNER_STYLE));
        f.render_widget(Clear, banner);
        f.render_widget(paragraph, banner);
    }
}

impl Page for GamePage {
    fn id(&self) -> PageId {
        PageId::Game
    }

    fn register_keymap(&mut self, keymaps: &HashMap<PageId, PageKeyBindings>) -> Result<()> {
        if let Some(keymap) = keymaps.get(&self.id()) {
            self.keymap = keymap.clone();
        }
        Ok(())
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        self.styles = config.styles;
        Ok(())
    }

    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Ok(Some(act!(Command::Game(GameAction::Jump)))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action.command {
            Command::Tick => self.tick(),
            Command::Game(GameAction::Jump) if action.state != ActionState::End => self.jump_queued = true,
            Command::Game(GameAction::Restart) if action.state == ActionState::Start => self.restart(),
            _ => {},
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let snapshot = self.state.snapshot();

        f.render_widget(Block::default().style(self.style("sky", game::SKY_STYLE)), area);

        let pipe_style = self.style("pipe", game::PIPE_STYLE);
        for (upper, lower) in &snapshot.pipes {
            self.draw_object(f, area, upper, pipe_style);
            self.draw_object(f, area, lower, pipe_style);
        }
        self.draw_object(f, area, &snapshot.bird, self.style("bird", game::BIRD_STYLE));

        let score_area = Rect { x: area.x + 1, width: area.width.saturating_sub(1), height: area.height.min(1), ..area };
        let score = Paragraph::new(format!("Score: {}", snapshot.score)).style(self.style("score", game::SCORE_STYLE));
        f.render_widget(score, score_area);

        if snapshot.game_over {
            self.draw_banner(f, area, format!("Game Over! Press {} to restart", self.restart_key()));
        }

        Ok(())
    }
}
