use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::AppState;
use crate::model::non_empty;
use crate::screens::ProfileScreen;

/// The signed-in user's card. Missing values render as `-`.
pub fn render_profile(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("我的信息")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    let Some(user) = app.session.current() else {
        let p = Paragraph::new("未登录").style(Style::default().fg(app.theme.muted)).block(block);
        f.render_widget(p, area);
        return;
    };

    let or_dash = |s: String| if s.is_empty() { "-".to_string() } else { s };
    let field = |v: &Option<String>| non_empty(v).unwrap_or("-").to_string();
    let entries = [
        ("用户名", field(&user.username)),
        ("用户账号", field(&user.user_account)),
        ("头像", user.avatar().to_string()),
        ("性别", or_dash(user.gender_label())),
        ("手机号", field(&user.phone)),
        ("邮箱", field(&user.email)),
        ("用户状态", or_dash(user.status_label())),
        ("角色", user.role_label()),
        ("创建时间", user.create_time_label()),
    ];

    let mut lines = vec![
        Line::from(Span::styled(user.display_name(), Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))),
        Line::raw(""),
    ];
    for (label, value) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("{label:>6}: "), Style::default().fg(app.theme.muted)),
            Span::styled(value, Style::default().fg(app.theme.text)),
        ]));
    }
    lines.push(Line::raw(""));
    let hint = if ProfileScreen::can_edit(&app.session) { "e: 修改信息   r: 刷新" } else { "r: 刷新" };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(app.theme.muted))));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(p, area);
}
