//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state, the colour theme,
//! and the bootstrap that ties the backend client, the session and the
//! screens together. The event loop itself lives in `update` (re-exported as
//! `run`).
//!
pub mod config;
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::time::Instant;
use tracing::{info, warn};

use crate::api::{LoginRequest, UserApi};
use crate::screens::{Notice, ProfileScreen, RegisterScreen, UserListScreen};
use crate::session::Session;

/// Top-level tabs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Profile,
    Users,
    Register,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 3] = [ActiveTab::Profile, ActiveTab::Users, ActiveTab::Register];

    pub fn title(self) -> &'static str {
        match self {
            ActiveTab::Profile => "我的信息",
            ActiveTab::Users => "用户管理",
            ActiveTab::Register => "注册",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            success: Color::Green,
            error: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for (key, val) in config::key_values(&contents) {
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "success" => theme.success = color,
                    "error" => theme.error = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or the special name "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-center-tui theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                // Named colors get a best-effort hex approximation
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Magenta => "#FF00FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::LightRed => "#FF6666".to_string(),
                Color::LightGreen => "#66FF66".to_string(),
                Color::LightYellow => "#FFFF66".to_string(),
                Color::LightBlue => "#6666FF".to_string(),
                Color::LightMagenta => "#FF66FF".to_string(),
                Color::LightCyan => "#66FFFF".to_string(),
                Color::White => "#FFFFFF".to_string(),
                Color::Indexed(i) => format!("index:{}", i),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("success", self.success);
        kv("error", self.error);

        std::fs::write(path, buf)
    }

    /// Load the theme at `path`, writing the default there first if missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// App-level dialogs. Edit forms and delete confirmations belong to the
/// screens and are read from their state instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    Help,
    Info { message: String },
}

/// Which dialog currently owns the keyboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    App,
    EditUser,
    ConfirmDelete,
    EditProfile,
}

pub struct AppState {
    pub started_at: Instant,
    pub api: Box<dyn UserApi>,
    pub session: Session,
    pub active_tab: ActiveTab,
    pub input_mode: InputMode,
    pub search_query: String,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    pub modal: Option<ModalState>,
    pub show_keybinds: bool,
    pub profile: ProfileScreen,
    pub users: UserListScreen,
    pub register: RegisterScreen,
    pub notice: Option<Notice>,
}

impl AppState {
    /// Build the state around a backend client. Nothing is fetched yet.
    pub fn new(api: Box<dyn UserApi>, theme: Theme, keymap: keymap::Keymap, page_size: u32) -> Self {
        Self {
            started_at: Instant::now(),
            api,
            session: Session::new(),
            active_tab: ActiveTab::Profile,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            theme,
            keymap,
            modal: None,
            show_keybinds: false,
            profile: ProfileScreen::new(),
            users: UserListScreen::new(page_size),
            register: RegisterScreen::new(),
            notice: None,
        }
    }

    /// Log in with the given credentials; on success the session holds the
    /// returned record.
    pub fn login(&mut self, account: &str, password: &str) -> bool {
        let request = LoginRequest { user_account: account.to_string(), user_password: password.to_string() };
        match self.api.login(&request).and_then(|r| r.into_data()) {
            Ok(user) => {
                info!(account, "logged in");
                self.session.replace(user);
                true
            }
            Err(e) => {
                warn!(account, error = %e, "login failed");
                self.notice = Some(Notice::error(e.user_message("登录失败", "登录失败，请重试！")));
                false
            }
        }
    }

    /// End the backend session, if there is one. Failures are only logged.
    pub fn logout(&mut self) {
        if !self.session.is_logged_in() {
            return;
        }
        if let Err(e) = self.api.logout() {
            warn!(error = %e, "logout failed");
        }
        self.session.clear();
    }

    /// Side effects of showing a tab: the profile re-reads the current user
    /// and the user list reloads for admins, on every visit.
    pub fn enter_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
        match tab {
            ActiveTab::Profile => self.profile.mount(self.api.as_ref(), &mut self.session),
            ActiveTab::Users => {
                if UserListScreen::can_manage(&self.session) {
                    self.users.load(self.api.as_ref());
                }
            }
            ActiveTab::Register => {}
        }
    }

    pub fn active_modal(&self) -> Option<ActiveModal> {
        if self.modal.is_some() {
            return Some(ActiveModal::App);
        }
        match self.active_tab {
            ActiveTab::Users if self.users.editor.is_open() => Some(ActiveModal::EditUser),
            ActiveTab::Users if self.users.confirm.target().is_some() => Some(ActiveModal::ConfirmDelete),
            ActiveTab::Profile if self.profile.editor.is_open() => Some(ActiveModal::EditProfile),
            _ => None,
        }
    }

    /// Keep `input_mode` in step with the dialogs that are open.
    pub fn sync_input_mode(&mut self) {
        if self.active_modal().is_some() {
            self.input_mode = InputMode::Modal;
        } else if self.input_mode == InputMode::Modal {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn set_notice(&mut self, notice: Option<Notice>) {
        if notice.is_some() {
            self.notice = notice;
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
