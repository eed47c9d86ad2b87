//! Shared UI components (status bar, modal helpers).
//!
//! Contains small building blocks reused by the profile, users and register
//! screens.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode, ModalState};
use crate::form::{DeleteTarget, UserDraft};
use std::collections::{BTreeMap, BTreeSet};

/// Render the bottom status bar: the latest notice if there is one, otherwise
/// mode and paging counters.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    if let Some(notice) = &app.notice {
        let fg = if notice.is_error() { app.theme.error } else { app.theme.success };
        let p = Paragraph::new(notice.message.clone())
            .style(Style::default().fg(fg).bg(app.theme.status_bg).add_modifier(Modifier::BOLD));
        f.render_widget(p, area);
        return;
    }

    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let filter = match &app.users.query.user_account {
        Some(account) => format!("  filter:{account}"),
        None => String::new(),
    };
    let msg = format!(
        "mode: {mode}  page:{}/{}  total:{}  rows/page:{}{}  ?: help",
        app.users.query.current,
        app.users.page_count(),
        app.users.total,
        app.users.query.page_size,
        filter
    );
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Render the right-side keybinds viewer with grouped sections.
pub fn render_keybinds_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Keybindings")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);

    let mut general: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    let mut users: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();

    for ((mods, code), action) in app.keymap.all_bindings() {
        let key = Keymap::format_key(mods, code);
        let (section, label) = match action {
            KeyAction::Quit => (&mut general, "Quit"),
            KeyAction::OpenHelp => (&mut general, "Help"),
            KeyAction::NextTab => (&mut general, "Next tab"),
            KeyAction::PrevTab => (&mut general, "Previous tab"),
            KeyAction::Refresh => (&mut general, "Refresh"),
            KeyAction::EditSelection => (&mut general, "Edit"),
            KeyAction::ToggleKeybindsPane => (&mut general, "Toggle pane"),
            KeyAction::StartSearch => (&mut users, "Search account"),
            KeyAction::DeleteSelection => (&mut users, "Delete user"),
            KeyAction::MoveUp => (&mut users, "Move up"),
            KeyAction::MoveDown => (&mut users, "Move down"),
            KeyAction::PrevPage => (&mut users, "Previous page"),
            KeyAction::NextPage => (&mut users, "Next page"),
            KeyAction::Ignore => continue,
        };
        section.entry(label).or_default().insert(key);
    }

    let contextual: [(&str, &str); 4] = [
        ("Cancel / Close", "Esc"),
        ("Confirm / Submit", "Enter"),
        ("Next / previous field", "Down / Up"),
        ("Change option", "Left / Right / Space"),
    ];

    let col1_w = general
        .keys()
        .chain(users.keys())
        .copied()
        .chain(contextual.iter().map(|(l, _)| *l))
        .map(str::len)
        .max()
        .unwrap_or(0)
        .min((inner.width as usize).saturating_sub(11));

    let row = |label: &str, value: String| -> Line<'static> {
        let lbl: String = label.chars().take(col1_w).collect();
        Line::from(vec![
            Span::raw(format!("  {:>width$} │ ", lbl, width = col1_w)),
            Span::styled(value, Style::default().add_modifier(Modifier::ITALIC)),
        ])
    };
    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)));

    let mut lines: Vec<Line> = vec![heading("General:")];
    for (label, keys) in &general {
        lines.push(row(*label, keys.iter().cloned().collect::<Vec<_>>().join(", ")));
    }
    lines.push(Line::raw(""));
    lines.push(heading("Users tab:"));
    for (label, keys) in &users {
        lines.push(row(*label, keys.iter().cloned().collect::<Vec<_>>().join(", ")));
    }
    lines.push(Line::raw(""));
    lines.push(heading("Forms:"));
    for (label, value) in contextual {
        lines.push(row(label, value.to_string()));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(block, area);
    f.render_widget(p, inner);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let min_w = 40u16.min(max_w);
        let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).min(max_h).max(5);
        let rect = centered_rect(min_w, height, area);
        let p = Paragraph::new(message.clone()).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("提示")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal with usage information and key tips.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = 20u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let tip = |label: &'static str, keys: &'static str| {
        Line::from(vec![
            Span::raw(label),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ])
    };
    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)));

    let lines = vec![
        tip("Switch tab: ", "Tab / Shift+Tab"),
        tip("Refresh: ", "r"),
        tip("Keybindings panel: ", "Shift+K"),
        tip("Quit: ", "q / Ctrl+c"),
        Line::raw(""),
        heading("我的信息"),
        tip("Edit own profile: ", "e / Enter"),
        Line::raw(""),
        heading("用户管理 (admin only)"),
        tip("Navigate: ", "Up / Down / j / k"),
        tip("Pages: ", "Left / Right / PageUp / PageDown"),
        tip("Search by account: ", "/ then Enter; Esc cancels"),
        tip("Edit user: ", "e / Enter"),
        tip("Delete user: ", "d / Delete, then y to confirm"),
        Line::raw(""),
        heading("注册"),
        tip("Type into the focused field, move with ", "Up / Down"),
        tip("Submit: ", "Enter"),
        Line::raw(""),
        tip("Close help: ", "Esc / Enter"),
    ];

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render an edit form for a user draft. The focused field carries the
/// selection marker; select fields show their current option.
pub fn render_form_modal(f: &mut Frame, area: Rect, app: &AppState, title: &str, draft: &UserDraft) {
    let fields = draft.fields();
    let extra = if draft.error.is_some() { 2 } else { 0 };
    let height = fields.len() as u16 + 4 + extra;
    let width = 56u16.min(area.width.saturating_sub(4)).max(30);
    let rect = centered_rect(width, height, area);

    let focused = draft.focused();
    let mut lines: Vec<Line> = Vec::new();
    for field in fields {
        let marker = if *field == focused { "▶ " } else { "  " };
        let value = draft.value(*field);
        let value = if field.is_select() { format!("< {value} >") } else { value };
        let style = if field.is_read_only() {
            Style::default().fg(app.theme.muted)
        } else if *field == focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}: ", field.label()), Style::default().fg(app.theme.title)),
            Span::styled(value, style),
        ]));
    }
    if let Some(err) = &draft.error {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(app.theme.error))));
    }
    lines.push(Line::from(Span::styled("Enter 提交  Esc 取消", Style::default().fg(app.theme.muted))));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the delete confirmation prompt.
pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, target: &DeleteTarget) {
    let rect = centered_rect(40, 6, area);
    let body = format!("确认删除该用户吗？\n{}\n\n[y] 确定   [n] 取消", target.label);
    let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("删除用户")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.error)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
