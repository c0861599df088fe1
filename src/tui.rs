use std::{
    io::{stdout, Stdout, Write},
    ops::{Deref, DerefMut},
    time::Duration,
};

use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event as CrosstermEvent,
        EventStream, KeyEvent, KeyboardEnhancementFlags, MouseEvent, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend as Backend;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::constants::WINDOW_TITLE;

pub type IO = Stdout;
pub fn io() -> IO {
    stdout()
}

#[derive(Clone, Debug)]
pub enum Event {
    Init,
    Quit,
    Error,
    Closed,
    Tick,
    Render,
    FocusGained,
    FocusLost,
    Paste(String),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

impl From<CrosstermEvent> for Event {
    /// Key presses, repeats and releases all pass through; hold bindings need the last two.
    fn from(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) => Event::Key(key),
            CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
            CrosstermEvent::Resize(x, y) => Event::Resize(x, y),
            CrosstermEvent::FocusLost => Event::FocusLost,
            CrosstermEvent::FocusGained => Event::FocusGained,
            CrosstermEvent::Paste(s) => Event::Paste(s),
        }
    }
}

pub struct Tui<W: Write = IO> {
    pub terminal: ratatui::Terminal<Backend<W>>,
    pub task: JoinHandle<()>,
    pub cancellation_token: CancellationToken,
    pub event_rx: UnboundedReceiver<Event>,
    pub event_tx: UnboundedSender<Event>,
    pub frame_rate: f64,
    pub tick_rate: f64,
    pub mouse: bool,
    pub paste: bool,
    pub raw_mode: bool,
    /// Whether this instance currently owns the terminal setup. Only then does `exit` undo it.
    entered: bool,
    keyboard_enhanced: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = ratatui::Terminal::new(Backend::new(io()))?;
        Ok(Self::with_terminal(terminal))
    }
}

impl<W: Write> Tui<W> {
    pub fn with_terminal(terminal: ratatui::Terminal<Backend<W>>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            terminal,
            task: tokio::spawn(async {}),
            cancellation_token: CancellationToken::new(),
            event_rx,
            event_tx,
            frame_rate: 60.0,
            tick_rate: 60.0,
            mouse: false,
            paste: false,
            raw_mode: true,
            entered: false,
            keyboard_enhanced: false,
        }
    }

    pub fn tick_rate(&mut self, tick_rate: f64) {
        self.tick_rate = tick_rate;
    }

    pub fn frame_rate(&mut self, frame_rate: f64) {
        self.frame_rate = frame_rate;
    }

    pub fn mouse(&mut self, mouse: bool) {
        self.mouse = mouse;
    }

    pub fn paste(&mut self, paste: bool) {
        self.paste = paste;
    }

    pub fn raw_mode(&mut self, raw_mode: bool) {
        self.raw_mode = raw_mode;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn start(&mut self) {
        let tick_delay = Duration::from_secs_f64(1.0 / self.tick_rate);
        let render_delay = Duration::from_secs_f64(1.0 / self.frame_rate);
        self.cancel();
        self.cancellation_token = CancellationToken::new();
        let cancellation_token = self.cancellation_token.clone();
        let event_tx = self.event_tx.clone();
        self.task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_delay);
            let mut render_interval = tokio::time::interval(render_delay);
            if event_tx.send(Event::Init).is_err() {
                return;
            }
            loop {
                let tick_delay = tick_interval.tick();
                let render_delay = render_interval.tick();
                let crossterm_event = reader.next().fuse();
                let event = tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    maybe_event = crossterm_event => match maybe_event {
                        Some(Ok(event)) => Event::from(event),
                        Some(Err(_)) => Event::Error,
                        None => Event::Closed,
                    },
                    _ = tick_delay => Event::Tick,
                    _ = render_delay => Event::Render,
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });
    }

    pub fn stop(&self) -> Result<()> {
        self.cancel();
        let mut counter = 0;
        while !self.task.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
            counter += 1;
            if counter > 50 {
                self.task.abort();
            }
            if counter > 100 {
                error!("Failed to abort task in 100 milliseconds for unknown reason");
                break;
            }
        }
        Ok(())
    }

    pub fn enter(&mut self) -> Result<()> {
        if self.raw_mode {
            crossterm::terminal::enable_raw_mode()?;
        }
        let writer = self.terminal.backend_mut();
        crossterm::execute!(writer, EnterAlternateScreen, cursor::Hide, SetTitle(WINDOW_TITLE))?;
        if self.mouse {
            crossterm::execute!(writer, EnableMouseCapture)?;
        }
        if self.paste {
            crossterm::execute!(writer, EnableBracketedPaste)?;
        }
        if self.raw_mode && crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false) {
            crossterm::execute!(writer, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
            self.keyboard_enhanced = true;
        }
        self.entered = true;
        debug!("Entered terminal");
        self.start();
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stop()?;
        if !self.entered {
            return Ok(());
        }
        self.flush()?;
        let writer = self.terminal.backend_mut();
        if self.keyboard_enhanced {
            crossterm::execute!(writer, PopKeyboardEnhancementFlags)?;
            self.keyboard_enhanced = false;
        }
        if self.paste {
            crossterm::execute!(writer, DisableBracketedPaste)?;
        }
        if self.mouse {
            crossterm::execute!(writer, DisableMouseCapture)?;
        }
        crossterm::execute!(writer, LeaveAlternateScreen, cursor::Show)?;
        if self.raw_mode {
            crossterm::terminal::disable_raw_mode()?;
        }
        self.entered = false;
        debug!("Left terminal");
        Ok(())
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::signal::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()?;
        Ok(())
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }
}

/// Puts the terminal back regardless of which `Tui` set it up. Used when panicking.
pub fn restore() -> Result<()> {
    if crossterm::terminal::is_raw_mode_enabled()? {
        crossterm::execute!(io(), PopKeyboardEnhancementFlags, DisableMouseCapture, LeaveAlternateScreen, cursor::Show)?;
        crossterm::terminal::disable_raw_mode()?;
    }
    Ok(())
}

impl<W: Write> Deref for Tui<W> {
    type Target = ratatui::Terminal<Backend<W>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl<W: Write> DerefMut for Tui<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl<W: Write> Drop for Tui<W> {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!("Failed to restore terminal: {e:?}");
        }
    }
}
