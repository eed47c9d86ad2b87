use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::AppState;
use crate::form::RegisterField;

pub fn render_register(f: &mut Frame, area: Rect, app: &AppState) {
    let screen = &app.register;
    let form = &screen.form;
    let focused = form.focused();

    let mut lines = vec![Line::raw("")];
    for field in RegisterField::ALL {
        let raw = match field {
            RegisterField::Account => form.account.clone(),
            // passwords are never echoed
            RegisterField::Password => "*".repeat(form.password.chars().count()),
            RegisterField::Check => "*".repeat(form.check.chars().count()),
        };
        let (value, value_style) = if raw.is_empty() {
            (field.placeholder().to_string(), Style::default().fg(app.theme.muted))
        } else {
            (raw, Style::default().fg(app.theme.text))
        };
        let marker = if field == focused { "▶ " } else { "  " };
        let value_style = if field == focused { value_style.add_modifier(Modifier::UNDERLINED) } else { value_style };
        lines.push(Line::from(vec![Span::raw(marker), Span::styled(value, value_style)]));
    }

    lines.push(Line::raw(""));
    if let Some(err) = &screen.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(app.theme.error))));
    } else if let Some(account) = &screen.registered {
        lines.push(Line::from(Span::styled(format!("已注册: {account}"), Style::default().fg(app.theme.success))));
    }
    lines.push(Line::from(Span::styled("Enter 注册   Up/Down 切换输入框", Style::default().fg(app.theme.muted))));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("注册")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}
