use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::app::AppState;
use crate::model::{UserRecord, non_empty};
use crate::screens::UserListScreen;

const HEADERS: [&str; 10] = ["ID", "用户账号", "用户名", "头像", "手机号", "邮箱", "性别", "用户状态", "创建时间", "角色"];

fn text(v: &Option<String>) -> String {
    non_empty(v).unwrap_or("").to_string()
}

fn row_cells(u: &UserRecord) -> Vec<Cell<'static>> {
    vec![
        Cell::from(u.id.map(|id| id.to_string()).unwrap_or_default()),
        Cell::from(text(&u.user_account)),
        Cell::from(text(&u.username)),
        Cell::from(u.avatar().to_string()),
        Cell::from(text(&u.phone)),
        Cell::from(text(&u.email)),
        Cell::from(u.gender_label()),
        Cell::from(u.status_label()),
        Cell::from(u.create_time_label()),
        Cell::from(u.role_label()),
    ]
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(app.theme.border));

    if !UserListScreen::can_manage(&app.session) {
        let p = Paragraph::new("无权限：仅管理员可以查看用户列表")
            .style(Style::default().fg(app.theme.muted))
            .block(block.title("用户管理"));
        f.render_widget(p, area);
        return;
    }

    let list = &app.users;
    // Keep the selected row on screen when the page is taller than the area.
    let body_height = (area.height.saturating_sub(3) as usize).max(1);
    let start = (list.selected / body_height) * body_height;
    let end = (start + body_height).min(list.rows.len());
    let slice = list.rows.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == list.selected {
            Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(row_cells(u)).style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(13),
        Constraint::Min(16),
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Length(19),
        Constraint::Length(8),
    ];

    let header = Row::new(HEADERS.to_vec()).style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let filter = list.query.user_account.as_deref().map(|a| format!("  账号: {a}")).unwrap_or_default();
    let title = if list.loaded {
        format!("用户 (第 {}/{} 页, 共 {} 条){}", list.query.current, list.page_count(), list.total, filter)
    } else {
        format!("用户 (加载失败){filter}")
    };

    let table = Table::new(rows, widths).header(header).block(block.title(title)).column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Details")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    let body = match app.users.selected_row() {
        Some(u) if UserListScreen::can_manage(&app.session) => format!(
            "{}  ({})\n邮箱: {}   手机号: {}\n性别: {}   状态: {}   角色: {}\n头像: {}\n创建时间: {}",
            u.display_name(),
            text(&u.user_account),
            text(&u.email),
            text(&u.phone),
            u.gender_label(),
            u.status_label(),
            u.role_label(),
            u.avatar(),
            u.create_time_label(),
        ),
        _ => String::new(),
    };

    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(block);
    f.render_widget(p, area);
}
