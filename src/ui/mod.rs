pub mod components;
pub mod profile;
pub mod register;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveModal, ActiveTab, AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_header(f, root[0], app);

    let body = if app.show_keybinds {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
            .split(root[1]);
        components::render_keybinds_panel(f, split[1], app);
        split[0]
    } else {
        root[1]
    };

    match app.active_tab {
        ActiveTab::Profile => profile::render_profile(f, body, app),
        ActiveTab::Users => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(6), Constraint::Length(8)].as_ref())
                .split(body);
            users::render_users_table(f, parts[0], app);
            users::render_user_details(f, parts[1], app);
        }
        ActiveTab::Register => register::render_register(f, body, app),
    }

    components::render_status_bar(f, root[2], app);

    render_modal(f, f.area(), app);
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();
    for tab in ActiveTab::ALL {
        let style = if tab == app.active_tab {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted)
        };
        let label = if tab == app.active_tab { format!("[{}]", tab.title()) } else { format!(" {} ", tab.title()) };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    let who = app.session.current().map(|u| u.display_name()).unwrap_or_else(|| "未登录".to_string());
    spans.push(Span::raw(format!("  {who}")));
    if app.session.is_admin() {
        spans.push(Span::styled(" (管理员)", Style::default().fg(app.theme.title)));
    }
    if app.input_mode == InputMode::Search {
        spans.push(Span::raw(format!("  搜索账号: {}", app.search_query)));
    }

    let p = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .title("user-center")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    match app.active_modal() {
        Some(ActiveModal::App) => match &app.modal {
            Some(ModalState::Help) => components::render_help_modal(f, area, app),
            Some(state @ ModalState::Info { .. }) => components::render_info_modal(f, area, app, state),
            None => {}
        },
        Some(ActiveModal::EditUser) => {
            if let Some(edit) = app.users.editor.draft() {
                components::render_form_modal(f, area, app, "编辑用户", &edit.draft);
            }
        }
        Some(ActiveModal::EditProfile) => {
            if let Some(draft) = app.profile.editor.draft() {
                components::render_form_modal(f, area, app, "修改信息", draft);
            }
        }
        Some(ActiveModal::ConfirmDelete) => {
            if let Some(target) = app.users.confirm.target() {
                components::render_confirm_modal(f, area, app, target);
            }
        }
        None => {}
    }
}
