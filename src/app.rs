use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Style},
    text::Text,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::{
    action::{act, Action, Command},
    components::help::Help,
    config::Config,
    constants::{HEIGHT, WIDTH},
    pages::{game::GamePage, home::HomePage, Page, PageId},
    tui,
};

pub struct App {
    config: Config,
    tick_rate: f64,
    frame_rate: f64,
    should_quit: bool,
    should_suspend: bool,
    show_help: bool,
    pages: Vec<Box<dyn Page>>,
    active_page_index: usize,
}

impl App {
    pub fn new(tick_rate: f64, frame_rate: f64, seed: Option<u64>) -> Result<Self> {
        Self::with_config(Config::new()?, tick_rate, frame_rate, seed)
    }

    fn with_config(config: Config, tick_rate: f64, frame_rate: f64, seed: Option<u64>) -> Result<Self> {
        let home_page = HomePage::new()?;
        let game_page = GamePage::new(seed);

        let mut app = Self {
            tick_rate,
            frame_rate,
            should_quit: false,
            should_suspend: false,
            show_help: false,
            config,
            pages: vec![Box::new(home_page), Box::new(game_page)],
            active_page_index: 0,
        };
        for page in app.pages.iter_mut() {
            page.register_keymap(&app.config.keybindings.pages)?;
            page.register_config_handler(app.config.clone())?;
        }
        Ok(app)
    }

    fn active_page(&mut self) -> &mut Box<dyn Page> {
        &mut self.pages[self.active_page_index]
    }

    fn set_active_page(&mut self, id: PageId) {
        if let Some(index) = self.pages.iter().position(|page| page.id() == id) {
            info!("Switching to {id} page");
            self.active_page_index = index;
        }
    }

    /// Looks the key up in the active page's bindings, then in the global ones. Global wins.
    fn map_key(&mut self, key: KeyEvent) -> Option<Action> {
        let page_id = self.active_page().id();
        let global = self.config.keybindings.global.0.get(&key);
        let page = self.config.keybindings.pages.get(&page_id).and_then(|keymap| keymap.0.get(&key));
        global.or(page).cloned()
    }

    fn new_tui(&self) -> Result<tui::Tui> {
        let mut tui = tui::Tui::new()?;
        tui.tick_rate(self.tick_rate);
        tui.frame_rate(self.frame_rate);
        tui.mouse(true);
        tui.enter()?;
        Ok(tui)
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = self.new_tui()?;

        for page in self.pages.iter_mut() {
            page.register_action_handler(action_tx.clone())?;
        }

        for page in self.pages.iter_mut() {
            page.init()?;
        }

        loop {
            if let Some(e) = tui.next().await {
                match e {
                    tui::Event::Quit => action_tx.send(act!(Command::Quit))?,
                    tui::Event::Tick => action_tx.send(act!(Command::Tick))?,
                    tui::Event::Render => action_tx.send(act!(Command::Render))?,
                    tui::Event::Resize(x, y) => action_tx.send(act!(Command::Resize(x, y)))?,
                    tui::Event::Key(key) => {
                        if let Some(action) = self.map_key(key) {
                            debug!("Got action: {action:?}");
                            action_tx.send(action)?;
                        }
                    },
                    _ => {},
                }
                if let Some(action) = self.active_page().handle_events(Some(e))? {
                    action_tx.send(action)?;
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                let command = &action.command;
                if *command != Command::Tick && *command != Command::Render {
                    debug!("{command:?}");
                }
                match command {
                    Command::Quit => self.should_quit = true,
                    Command::Suspend => self.should_suspend = true,
                    Command::Resume => self.should_suspend = false,
                    Command::ToggleShowHelp => self.show_help = !self.show_help,
                    Command::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        self.render(&mut tui, &action_tx)?;
                    },
                    Command::Render => self.render(&mut tui, &action_tx)?,
                    Command::StartGame => self.set_active_page(PageId::Game),
                    Command::Error(message) => tracing::error!("{message}"),
                    _ => {},
                }
                if !self.show_help {
                    if let Some(action) = self.active_page().update(action)? {
                        action_tx.send(action)?
                    }
                }
            }
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(act!(Command::Resume))?;
                tui.resume()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn render(&mut self, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        let mut result = Ok(());
        tui.draw(|f| result = self.draw(f))?;
        if let Err(e) = result {
            action_tx.send(act!(Command::Error(format!("Failed to draw: {e:?}"))))?;
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame<'_>) -> Result<()> {
        let area = f.area();
        if area.width < WIDTH || area.height < HEIGHT {
            draw_resize_message(f, area);
            return Ok(());
        }

        let [_, area, _] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(HEIGHT), Constraint::Fill(1)]).areas(area);
        let [_, area, _] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(WIDTH), Constraint::Fill(1)]).areas(area);

        let border = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(Color::Black));
        f.render_widget(border, area);

        let area = area.inner(Margin { horizontal: 1, vertical: 1 });
        self.active_page().draw(f, area)?;

        if self.show_help {
            self.draw_help(f, area);
        }
        Ok(())
    }

    fn draw_help(&mut self, f: &mut Frame<'_>, rect: Rect) {
        let page_id = self.active_page().id();
        let mut groups = vec![("System".to_string(), self.config.keybindings.global.clone())];
        if let Some(keymap) = self.config.keybindings.pages.get(&page_id) {
            groups.push((page_id.to_string(), keymap.clone()));
        }
        f.render_widget(Help::new(groups), rect);
    }
}

fn draw_resize_message(f: &mut Frame<'_>, area: Rect) {
    let message = format!("Please resize the terminal to at least {WIDTH}x{HEIGHT}");
    let paragraph = Paragraph::new(Text::styled(message, Style::default().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::action::{ActionState, GameAction, HomeAction};

    fn app() -> Result<App> {
        App::with_config(Config::new()?, 60.0, 60.0, Some(1))
    }

    fn render(app: &mut App, width: u16, height: u16) -> Result<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height))?;
        let mut result = Ok(());
        terminal.draw(|f| result = app.draw(f))?;
        result?;
        Ok(terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_keys_follow_active_page() -> Result<()> {
        let mut app = app()?;
        assert_eq!(app.map_key(key(KeyCode::Char(' '))), Some(act!(Command::Home(HomeAction::Select))));
        assert_eq!(app.map_key(key(KeyCode::Char('r'))), None);

        app.set_active_page(PageId::Game);
        assert_eq!(app.map_key(key(KeyCode::Char(' '))), Some(act!(Command::Game(GameAction::Jump))));
        assert_eq!(app.map_key(key(KeyCode::Char('r'))), Some(act!(Command::Game(GameAction::Restart))));
        Ok(())
    }

    #[test]
    fn test_global_keys() -> Result<()> {
        let mut app = app()?;
        app.set_active_page(PageId::Game);
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Some(act!(Command::Quit)));
        assert_eq!(app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(act!(Command::Quit)));
        Ok(())
    }

    #[test]
    fn test_hold_binding_maps_repeat_and_release() -> Result<()> {
        let yaml = "keybindings:\n  pages:\n    Game:\n      hold:\n        \"<up>\": Jump\n";
        let mut app = App::with_config(serde_yaml::from_str(yaml)?, 60.0, 60.0, Some(1))?;
        app.set_active_page(PageId::Game);

        let jump = Command::Game(GameAction::Jump);
        let mut up = key(KeyCode::Up);
        assert_eq!(app.map_key(up), Some(act!(jump.clone(), ActionState::Start)));
        up.kind = KeyEventKind::Repeat;
        assert_eq!(app.map_key(up), Some(act!(jump.clone(), ActionState::Repeat)));
        up.kind = KeyEventKind::Release;
        assert_eq!(app.map_key(up), Some(act!(jump, ActionState::End)));
        Ok(())
    }

    #[test]
    fn test_releasing_click_binding_does_nothing() -> Result<()> {
        let mut app = app()?;
        let mut quit = key(KeyCode::Char('q'));
        quit.kind = KeyEventKind::Release;
        assert_eq!(app.map_key(quit), None);
        Ok(())
    }

    #[test]
    fn test_draw_home_page() -> Result<()> {
        let mut app = app()?;
        let text = render(&mut app, WIDTH + 10, HEIGHT + 4)?;
        assert!(text.contains("Start playing"));
        assert!(text.contains('╭'));
        Ok(())
    }

    #[test]
    fn test_draw_game_page() -> Result<()> {
        let mut app = app()?;
        app.set_active_page(PageId::Game);
        let text = render(&mut app, WIDTH, HEIGHT)?;
        assert!(text.contains("Score: 0"));
        Ok(())
    }

    #[test]
    fn test_draw_help_overlay() -> Result<()> {
        let mut app = app()?;
        app.show_help = true;
        let text = render(&mut app, WIDTH, HEIGHT)?;
        assert!(text.contains("System"));
        assert!(text.contains("Home: Select"));
        Ok(())
    }

    #[test]
    fn test_draw_resize_message() -> Result<()> {
        let mut app = app()?;
        let text = render(&mut app, 60, 10)?;
        assert!(text.contains("Please resize the terminal"));
        assert!(!text.contains("Start playing"));
        Ok(())
    }
}
