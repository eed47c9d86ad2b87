//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! This module manages the keyboard shortcuts of the console's list and
//! profile views. It supports:
//! - Loading custom keybindings from a config file (`keybinds.conf`)
//! - Providing defaults if no config is present
//! - Resolving key presses (with modifiers) to semantic actions
//! - Exporting the current keymap back to a file for reference or customization
//!
//! Text entry inside forms and the search prompt is not remapped.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions that can be bound to key combinations.
///
/// Multiple key combinations can map to the same action (e.g. both `j` and the
/// Down arrow move down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Display the help/keybindings reference.
    OpenHelp,
    /// Start typing an account filter on the user list.
    StartSearch,
    /// Open the edit form for the selected row or the own profile.
    EditSelection,
    /// Ask to delete the selected row.
    DeleteSelection,
    /// Re-fetch the data behind the current tab.
    Refresh,
    /// Switch to the next tab.
    NextTab,
    /// Switch to the previous tab.
    PrevTab,
    /// Toggle the visibility of the keybindings panel on the right.
    ToggleKeybindsPane,
    /// Move up in the current list.
    MoveUp,
    /// Move down in the current list.
    MoveDown,
    /// Load the previous page of results.
    PrevPage,
    /// Load the next page of results.
    NextPage,
    /// Ignore this key.
    Ignore,
}

/// Maps `(KeyModifiers, KeyCode)` pairs to [`KeyAction`]s.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: std::collections::HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Create a keymap with default keybindings: arrows and vim-style keys
    /// for navigation, single letters for actions, Tab/BackTab for tabs.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = std::collections::HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Enter), KeyAction::EditSelection);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Tab), KeyAction::NextTab);
        // Shift+Tab arrives as BackTab, with or without SHIFT depending on the terminal
        bindings.insert((M::NONE, BackTab), KeyAction::PrevTab);
        bindings.insert((M::SHIFT, BackTab), KeyAction::PrevTab);

        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);

        bindings.insert((M::SHIFT, Char('K')), KeyAction::ToggleKeybindsPane);
        bindings.insert((M::NONE, Char('K')), KeyAction::ToggleKeybindsPane);

        Self { bindings }
    }

    /// Load a keymap from `path`, or write fresh defaults there.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        let _ = km.write_file(path);
        km
    }

    /// Load a keymap from a configuration file of `<Action> = <KeySpec>` lines,
    /// starting from the defaults. `None` if the file cannot be read.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut map = Self::default();
        for (lhs, rhs) in super::config::key_values(&contents) {
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        Some(map)
    }

    /// Write the default binding list in the `<Action> = <KeySpec>` format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-center-tui keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+c, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Delete, /, e, d, r\n");
        buf.push_str("# Actions: Quit, OpenHelp, StartSearch, EditSelection, DeleteSelection, Refresh, NextTab, PrevTab, ToggleKeybindsPane, MoveUp, MoveDown, PrevPage, NextPage, Ignore\n\n");

        let dump = [
            ("q", KeyAction::Quit),
            ("Ctrl+c", KeyAction::Quit),
            ("Esc", KeyAction::Ignore),
            ("?", KeyAction::OpenHelp),
            ("/", KeyAction::StartSearch),
            ("Enter", KeyAction::EditSelection),
            ("e", KeyAction::EditSelection),
            ("Delete", KeyAction::DeleteSelection),
            ("d", KeyAction::DeleteSelection),
            ("r", KeyAction::Refresh),
            ("Tab", KeyAction::NextTab),
            ("BackTab", KeyAction::PrevTab),
            ("K", KeyAction::ToggleKeybindsPane),
            ("Up", KeyAction::MoveUp),
            ("Down", KeyAction::MoveDown),
            ("k", KeyAction::MoveUp),
            ("j", KeyAction::MoveDown),
            ("Left", KeyAction::PrevPage),
            ("Right", KeyAction::NextPage),
            ("h", KeyAction::PrevPage),
            ("l", KeyAction::NextPage),
            ("PageUp", KeyAction::PrevPage),
            ("PageDown", KeyAction::NextPage),
        ];
        for (k, a) in dump {
            let _ = writeln!(&mut buf, "{} = {}", format_action(a), k);
        }

        std::fs::write(path, buf)
    }

    /// Resolve a key event to its action, if one is bound.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Format a key (modifiers + code) into a spec like "Ctrl+c" or "BackTab".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "Shift+Tab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) { format!("Ctrl+{}", base) } else { base }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    match s.trim() {
        "Quit" => Some(KeyAction::Quit),
        "OpenHelp" => Some(KeyAction::OpenHelp),
        "StartSearch" => Some(KeyAction::StartSearch),
        "EditSelection" => Some(KeyAction::EditSelection),
        "DeleteSelection" => Some(KeyAction::DeleteSelection),
        "Refresh" => Some(KeyAction::Refresh),
        "NextTab" => Some(KeyAction::NextTab),
        "PrevTab" => Some(KeyAction::PrevTab),
        "ToggleKeybindsPane" => Some(KeyAction::ToggleKeybindsPane),
        "MoveUp" => Some(KeyAction::MoveUp),
        "MoveDown" => Some(KeyAction::MoveDown),
        "PrevPage" => Some(KeyAction::PrevPage),
        "NextPage" => Some(KeyAction::NextPage),
        "Ignore" => Some(KeyAction::Ignore),
        _ => None,
    }
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::EditSelection => "EditSelection",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::Refresh => "Refresh",
        KeyAction::NextTab => "NextTab",
        KeyAction::PrevTab => "PrevTab",
        KeyAction::ToggleKeybindsPane => "ToggleKeybindsPane",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PrevPage => "PrevPage",
        KeyAction::NextPage => "NextPage",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_handles_ctrl_and_names() {
        assert_eq!(parse_key("Ctrl+c"), Some((KeyModifiers::CONTROL, KeyCode::Char('c'))));
        assert_eq!(parse_key("PageDown"), Some((KeyModifiers::NONE, KeyCode::PageDown)));
        assert_eq!(parse_key("xy"), None);
    }

    #[test]
    fn every_action_name_round_trips() {
        for a in [KeyAction::Quit, KeyAction::EditSelection, KeyAction::Refresh, KeyAction::NextPage] {
            assert_eq!(parse_action(format_action(a)), Some(a));
        }
    }
}
