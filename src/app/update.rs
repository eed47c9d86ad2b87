//! Event loop and key dispatch.
//!
//! `run_app` draws, polls and feeds key presses to [`handle_key`], which is
//! terminal-free so it can be driven directly from tests.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;
use tracing::debug;

use crate::app::keymap::KeyAction;
use crate::app::{ActiveModal, ActiveTab, AppState, InputMode, ModalState};
use crate::form::UserDraft;
use crate::screens::UserListScreen;
use crate::ui;

/// How long a notice stays in the status bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

const ADMIN_ONLY: &str = "仅管理员可以管理用户";

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !handle_key(app, key)
        {
            break;
        }

        if app.notice.as_ref().is_some_and(|n| n.at.elapsed() >= NOTICE_TTL) {
            app.notice = None;
        }
    }

    app.logout();
    debug!(uptime = ?app.started_at.elapsed(), "event loop finished");
    Ok(())
}

/// Apply one key press. Returns `false` when the application should exit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }
    let keep_running = match app.input_mode {
        InputMode::Modal => {
            handle_modal_key(app, key);
            true
        }
        InputMode::Search => {
            handle_search_key(app, key);
            true
        }
        InputMode::Normal if app.active_tab == ActiveTab::Register && is_form_key(&key) => {
            handle_register_key(app, key);
            true
        }
        InputMode::Normal => handle_normal_key(app, key),
    };
    app.sync_input_mode();
    keep_running
}

/// On the register tab plain keys type into the form; Tab and Ctrl chords
/// still reach the keymap.
fn is_form_key(key: &KeyEvent) -> bool {
    !key.modifiers.contains(KeyModifiers::CONTROL) && !matches!(key.code, KeyCode::Tab | KeyCode::BackTab)
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else { return true };
    match action {
        KeyAction::Quit => return false,
        KeyAction::Ignore => {}
        KeyAction::OpenHelp => app.modal = Some(ModalState::Help),
        KeyAction::ToggleKeybindsPane => app.show_keybinds = !app.show_keybinds,
        KeyAction::NextTab => {
            let tab = app.active_tab.next();
            app.enter_tab(tab);
        }
        KeyAction::PrevTab => {
            let tab = app.active_tab.prev();
            app.enter_tab(tab);
        }
        KeyAction::Refresh => match app.active_tab {
            ActiveTab::Profile => {
                app.profile.refresh(app.api.as_ref(), &mut app.session);
            }
            ActiveTab::Users if UserListScreen::can_manage(&app.session) => app.users.load(app.api.as_ref()),
            _ => {}
        },
        KeyAction::EditSelection => match app.active_tab {
            ActiveTab::Profile => {
                app.profile.open_edit(&app.session);
            }
            ActiveTab::Users => {
                if !UserListScreen::can_manage(&app.session) {
                    app.modal = Some(ModalState::Info { message: ADMIN_ONLY.to_string() });
                } else {
                    app.users.open_edit(&app.session);
                }
            }
            ActiveTab::Register => {}
        },
        _ if app.active_tab != ActiveTab::Users => {}
        _ if !UserListScreen::can_manage(&app.session) => {
            app.modal = Some(ModalState::Info { message: ADMIN_ONLY.to_string() });
        }
        KeyAction::StartSearch => {
            app.search_query = app.users.query.user_account.clone().unwrap_or_default();
            app.input_mode = InputMode::Search;
        }
        KeyAction::DeleteSelection => {
            app.users.request_delete(&app.session);
        }
        KeyAction::MoveUp => app.users.select_prev(),
        KeyAction::MoveDown => app.users.select_next(),
        KeyAction::PrevPage => {
            app.users.prev_page(app.api.as_ref());
        }
        KeyAction::NextPage => {
            app.users.next_page(app.api.as_ref());
        }
    }
    true
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.users.search(app.api.as_ref(), &app.search_query);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_query.clear();
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => app.search_query.push(c),
        _ => {}
    }
}

fn handle_register_key(app: &mut AppState, key: KeyEvent) {
    let form = &mut app.register.form;
    match key.code {
        KeyCode::Up => form.focus_prev(),
        KeyCode::Down => form.focus_next(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input_char(c),
        KeyCode::Enter => {
            let notice = app.register.submit(app.api.as_ref());
            app.notice = Some(notice);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) {
    match app.active_modal() {
        Some(ActiveModal::App) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?')) {
                app.modal = None;
            }
        }
        Some(ActiveModal::EditUser) => {
            let Some(edit) = app.users.editor.draft_mut() else { return };
            match form_key(&mut edit.draft, key) {
                FormKey::Cancel => app.users.cancel_edit(),
                FormKey::Submit => {
                    let notice = app.users.submit_edit(app.api.as_ref());
                    app.set_notice(notice);
                }
                FormKey::Handled => {}
            }
        }
        Some(ActiveModal::EditProfile) => {
            let Some(draft) = app.profile.editor.draft_mut() else { return };
            match form_key(draft, key) {
                FormKey::Cancel => app.profile.cancel_edit(),
                FormKey::Submit => {
                    let notice = app.profile.submit_edit(app.api.as_ref(), &mut app.session);
                    app.set_notice(notice);
                }
                FormKey::Handled => {}
            }
        }
        Some(ActiveModal::ConfirmDelete) => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let notice = app.users.confirm_delete(app.api.as_ref());
                app.set_notice(notice);
            }
            KeyCode::Char('n') | KeyCode::Esc => app.users.cancel_delete(),
            _ => {}
        },
        None => {}
    }
}

enum FormKey {
    Cancel,
    Submit,
    Handled,
}

fn form_key(draft: &mut UserDraft, key: KeyEvent) -> FormKey {
    let select = draft.focused().is_select();
    match key.code {
        KeyCode::Esc => return FormKey::Cancel,
        KeyCode::Enter => return FormKey::Submit,
        KeyCode::Up | KeyCode::BackTab => draft.focus_prev(),
        KeyCode::Down | KeyCode::Tab => draft.focus_next(),
        KeyCode::Left if select => draft.cycle(false),
        KeyCode::Right | KeyCode::Char(' ') if select => draft.cycle(true),
        KeyCode::Backspace => draft.backspace(),
        KeyCode::Char(c) => draft.input_char(c),
        _ => {}
    }
    FormKey::Handled
}
