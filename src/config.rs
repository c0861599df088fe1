use std::{collections::HashMap, path::PathBuf};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use ratatui::style::{Color, Modifier, Style};
use serde::{
    de::{self, DeserializeOwned, Deserializer},
    Deserialize,
};

use crate::{
    action::{act, Action, ActionState, Command, GameAction, HomeAction},
    pages::PageId,
    utils::{get_config_dir, get_data_dir},
};

const CONFIG: &str = include_str!("../.config/config.yaml");
const CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub styles: Styles,
}

impl Config {
    /// Built-in defaults from `.config/config.yaml`, overridden key by key by the user's
    /// `config.yaml` in the config directory.
    pub fn new() -> Result<Self> {
        let default_config: Config = serde_yaml::from_str(CONFIG)?;
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let config_file = config_dir.join(CONFIG_FILE);
        if !config_file.exists() {
            log::info!("No configuration file at {}, using defaults", config_file.display());
        }

        let cfg = config::Config::builder()
            .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from(config_file).format(config::FileFormat::Yaml).required(false))
            .build()?;

        let mut cfg: Self = cfg.try_deserialize()?;
        cfg.merge_defaults(default_config);
        Ok(cfg)
    }

    fn merge_defaults(&mut self, defaults: Config) {
        for (page, default_bindings) in defaults.keybindings.pages {
            let user_bindings = self.keybindings.pages.entry(page).or_default();
            for (key, action) in default_bindings.0 {
                user_bindings.0.entry(key).or_insert(action);
            }
        }
        for (key, action) in defaults.keybindings.global.0 {
            self.keybindings.global.0.entry(key).or_insert(action);
        }
        for (name, style) in defaults.styles.0 {
            self.styles.0.entry(name).or_insert(style);
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawPageKeyBindings {
    #[serde(default)]
    click: HashMap<String, String>,
    #[serde(default)]
    hold: HashMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawKeyBindings {
    #[serde(default)]
    global: RawPageKeyBindings,
    #[serde(default)]
    pages: HashMap<String, RawPageKeyBindings>,
}

#[derive(Clone, Debug, Default)]
pub struct PageKeyBindings(pub HashMap<KeyEvent, Action>);

impl PageKeyBindings {
    /// Keys that start `command`, sorted by their display string.
    pub fn keys_for(&self, command: &Command) -> Vec<String> {
        let mut keys: Vec<String> = self
            .0
            .iter()
            .filter(|(_, action)| action.state == ActionState::Start && &action.command == command)
            .map(|(event, _)| key_event_to_string(event))
            .collect();
        keys.sort();
        keys
    }
}

#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    pub global: PageKeyBindings,
    pub pages: HashMap<PageId, PageKeyBindings>,
}

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_keybindings = RawKeyBindings::deserialize(deserializer)?;

        let global = parse_page_keybindings(&raw_keybindings.global, |command: Command| command)
            .map_err(de::Error::custom)?;
        let global = PageKeyBindings(global);

        let pages = raw_keybindings
            .pages
            .into_iter()
            .map(|(page, raw_page_keybindings)| -> Result<(PageId, PageKeyBindings), D::Error> {
                let page_id: PageId =
                    page.parse().map_err(|_| de::Error::custom(format!("Unknown page `{page}` in keybindings")))?;
                let bindings = match_page_keybindings(&page_id, &raw_page_keybindings).map_err(de::Error::custom)?;
                Ok((page_id, bindings))
            })
            .collect::<Result<HashMap<_, _>, D::Error>>()?;

        Ok(KeyBindings { global, pages })
    }
}

/// Generates `match_page_keybindings`, which parses a page's raw bindings with that page's
/// action type and wraps each action in the matching `Command` variant.
macro_rules! parse_and_map_actions {
    ( $( ( $page_id_variant:path, $action_type:ty, $command_variant:path ) ),* ) => {
        fn match_page_keybindings(
            page_id: &PageId,
            raw_page_keybindings: &RawPageKeyBindings,
        ) -> Result<PageKeyBindings, String> {
            let map = match page_id {
                $(
                    $page_id_variant => {
                        parse_page_keybindings(raw_page_keybindings, |action: $action_type| $command_variant(action))?
                    },
                )*
            };
            Ok(PageKeyBindings(map))
        }
    };
}

parse_and_map_actions![(PageId::Home, HomeAction, Command::Home), (PageId::Game, GameAction, Command::Game)];

fn parse_binding_pairs<T: DeserializeOwned>(map: &HashMap<String, String>) -> Result<Vec<(KeyEvent, T)>, String> {
    map.iter()
        .map(|(key_str, command_str)| -> Result<(KeyEvent, T), String> {
            let event = parse_key_event(key_str)?;
            let command = serde_yaml::from_str(command_str)
                .map_err(|e| format!("Unknown command `{command_str}` bound to `{key_str}`: {e}"))?;
            Ok((event, command))
        })
        .collect()
}

fn parse_page_keybindings<T, F>(raw: &RawPageKeyBindings, wrap: F) -> Result<HashMap<KeyEvent, Action>, String>
where
    T: DeserializeOwned,
    F: Fn(T) -> Command,
{
    let mut bindings = HashMap::new();
    for (event, command) in parse_binding_pairs(&raw.click)? {
        bindings.insert(event, act!(wrap(command)));
    }
    // A hold binding fires on press, on every auto-repeat and once more on release.
    for (mut event, command) in parse_binding_pairs(&raw.hold)? {
        let command = wrap(command);
        bindings.insert(event, act!(command.clone(), ActionState::Start));
        event.kind = KeyEventKind::Repeat;
        bindings.insert(event, act!(command.clone(), ActionState::Repeat));
        event.kind = KeyEventKind::Release;
        bindings.insert(event, act!(command, ActionState::End));
    }
    Ok(bindings)
}

/// Parses bindings like `<q>`, `<space>` or `<ctrl-alt-f5>`. Case is ignored except through
/// an explicit `shift-` modifier.
pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    let lowered = raw.to_ascii_lowercase();
    let inner = lowered.strip_prefix('<').and_then(|s| s.strip_suffix('>')).unwrap_or(&lowered);
    if inner.is_empty() || inner.contains(['<', '>']) {
        return Err(format!("Unable to parse `{raw}`"));
    }

    let mut modifiers = KeyModifiers::empty();
    let mut rest = inner;
    loop {
        if let Some(stripped) = rest.strip_prefix("ctrl-") {
            modifiers.insert(KeyModifiers::CONTROL);
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("alt-") {
            modifiers.insert(KeyModifiers::ALT);
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("shift-") {
            modifiers.insert(KeyModifiers::SHIFT);
            rest = stripped;
        } else {
            break;
        }
    }

    let code = match rest {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "tab" => KeyCode::Tab,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        },
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        single if single.chars().count() == 1 => {
            let c = single.chars().next().unwrap_or_default();
            if modifiers.contains(KeyModifiers::SHIFT) {
                KeyCode::Char(c.to_ascii_uppercase())
            } else {
                KeyCode::Char(c)
            }
        },
        function if function.starts_with('f') => match function[1..].parse::<u8>() {
            Ok(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(format!("Unable to parse `{raw}`")),
        },
        _ => return Err(format!("Unable to parse `{raw}`")),
    };
    Ok(KeyEvent::new(code, modifiers))
}

/// Display form of a key, e.g. `Ctrl-C`, `Space` or `R`.
pub fn key_event_to_string(key_event: &KeyEvent) -> String {
    let code = match key_event.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        other => format!("{other:?}"),
    };

    let mut parts = Vec::with_capacity(4);
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".to_string());
    }
    if key_event.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".to_string());
    }
    if key_event.modifiers.contains(KeyModifiers::SHIFT) && key_event.code != KeyCode::BackTab {
        parts.push("Shift".to_string());
    }
    parts.push(code);
    parts.join("-")
}

/// Named element styles, e.g. `bird: "on yellow"`.
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct Styles(pub HashMap<String, Style>);

impl<'de> Deserialize<'de> for Styles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(Styles(raw.into_iter().map(|(name, style)| (name.to_ascii_lowercase(), parse_style(&style))).collect()))
    }
}

/// Parses `"[modifiers] [fg] [on [modifiers] bg]"`, e.g. `"bold white on rgb245"`.
pub fn parse_style(line: &str) -> Style {
    let line = line.to_ascii_lowercase();
    let (foreground, background) = match line.split_once("on ") {
        Some((foreground, background)) => (foreground, background),
        None => (line.as_str(), ""),
    };
    let (foreground, foreground_modifiers) = process_color_string(foreground);
    let (background, background_modifiers) = process_color_string(background);

    let mut style = Style::default();
    if let Some(fg) = parse_color(&foreground) {
        style = style.fg(fg);
    }
    if let Some(bg) = parse_color(&background) {
        style = style.bg(bg);
    }
    style.add_modifier(foreground_modifiers | background_modifiers)
}

fn process_color_string(color_str: &str) -> (String, Modifier) {
    let mut modifiers = Modifier::empty();
    let mut color = Vec::new();
    for word in color_str.split_whitespace() {
        match word {
            "bold" => modifiers |= Modifier::BOLD,
            "italic" => modifiers |= Modifier::ITALIC,
            "underline" => modifiers |= Modifier::UNDERLINED,
            "inverse" => modifiers |= Modifier::REVERSED,
            word => color.push(word.replace("grey", "gray")),
        }
    }
    (color.join(" "), modifiers)
}

fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(base) = s.strip_prefix("bright ") {
        return match parse_color(base)? {
            Color::Indexed(index) if index < 8 => Some(Color::Indexed(index + 8)),
            _ => None,
        };
    }
    if let Some(index) = s.strip_prefix("color") {
        return index.parse::<u8>().ok().map(Color::Indexed);
    }
    if let Some(level) = s.strip_prefix("gray") {
        return level.parse::<u8>().ok().filter(|level| *level < 24).map(|level| Color::Indexed(232 + level));
    }
    if let Some(rgb) = s.strip_prefix("rgb") {
        let digits: Vec<u8> = rgb.chars().filter_map(|c| c.to_digit(6)).map(|d| d as u8).collect();
        return match digits.as_slice() {
            &[r, g, b] if rgb.len() == 3 => Some(Color::Indexed(16 + r * 36 + g * 6 + b)),
            _ => None,
        };
    }
    let index = match s {
        "black" => 0,
        "red" => 1,
        "green" => 2,
        "yellow" => 3,
        "blue" => 4,
        "magenta" => 5,
        "cyan" => 6,
        "white" => 7,
        _ => return None,
    };
    Some(Color::Indexed(index))
}
