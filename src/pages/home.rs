use std::collections::HashMap;

use color_eyre::eyre::Result;
use derive_builder::Builder;
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use super::{Frame, Page, PageId};
use crate::{
    action::{act, Action, ActionState, Command, HomeAction},
    config::PageKeyBindings,
    constants::home::{OPTION_PADDING, TITLE_TEXT},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum OptionItem {
    Start,
    Quit,
}

impl OptionItem {
    fn command(self) -> Command {
        match self {
            OptionItem::Start => Command::StartGame,
            OptionItem::Quit => Command::Quit,
        }
    }
}

#[derive(Builder)]
pub struct HomePage {
    #[builder(default)]
    pub action_tx: Option<UnboundedSender<Action>>,
    #[builder(default)]
    pub keymap: PageKeyBindings,
    options: Vec<(OptionItem, &'static str)>,
    #[builder(default)]
    selected_option_index: usize,
}

impl HomePage {
    pub fn new() -> Result<Self> {
        let page = HomePageBuilder::default()
            .options(vec![(OptionItem::Start, "Start playing"), (OptionItem::Quit, "Quit")])
            .build()?;
        Ok(page)
    }

    pub fn up(&mut self) {
        self.selected_option_index = self.selected_option_index.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected_option_index + 1 < self.options.len() {
            self.selected_option_index += 1;
        }
    }

    fn select(&self) -> Option<Action> {
        let (option, _) = self.options.get(self.selected_option_index)?;
        trace!("Selected {option:?}");
        Some(act!(option.command()))
    }
}

impl Page for HomePage {
    fn id(&self) -> PageId {
        PageId::Home
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

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action.state != ActionState::Start {
            return Ok(None);
        }
        let next = match action.command {
            Command::Home(HomeAction::Up) => {
                self.up();
                None
            },
            Command::Home(HomeAction::Down) => {
                self.down();
                None
            },
            Command::Home(HomeAction::Select) => self.select(),
            _ => None,
        };
        Ok(next)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        f.render_widget(Clear, rect);

        let title_lines: Vec<&str> = TITLE_TEXT.lines().filter(|s| !s.is_empty()).collect();
        let num_title_lines = title_lines.len() as u16;

        let num_options = self.options.len() as u16;
        let option_height = (num_options * 2).saturating_sub(1);

        let [title_area, option_area] =
            Layout::vertical(vec![Constraint::Length(num_title_lines), Constraint::Length(option_height)])
                .flex(layout::Flex::SpaceAround)
                .areas(rect);

        let lines = title_lines.iter().map(|line| Line::from(*line)).collect::<Vec<_>>();
        let paragraph = Paragraph::new(lines).style(Style::default().fg(Color::Yellow)).alignment(Alignment::Center);
        f.render_widget(paragraph, title_area);

        let max_option_len = self.options.iter().map(|(_, title)| title.len()).max().unwrap_or(0);
        let padding = OPTION_PADDING as usize;

        let [option_area] = Layout::horizontal(vec![Constraint::Length((max_option_len + 2 * padding) as u16)])
            .flex(layout::Flex::SpaceAround)
            .areas(option_area);

        let mut lines = Vec::with_capacity(self.options.len() * 2);
        for (index, (_, title)) in self.options.iter().enumerate() {
            if index > 0 {
                lines.push(Line::from(""));
            }
            let padded = format!("{:padding$}{title:<max_option_len$}{:padding$}", "", "");
            let style =
                if index == self.selected_option_index { Style::default().bg(Color::Cyan) } else { Style::default() };
            lines.push(Line::from(padded).style(style));
        }

        let paragraph = Paragraph::new(lines).style(Style::default().fg(Color::White)).alignment(Alignment::Left);
        f.render_widget(paragraph, option_area);

        Ok(())
    }
}
