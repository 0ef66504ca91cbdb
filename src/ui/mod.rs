use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod tabs;

use crate::app::{App, InputMode, StatusLevel};
use crate::core::{Module, View};

pub fn draw(f: &mut Frame, app: &mut App) {
    app.sync_context();
    let areas = layout::areas(f.size());

    tabs::draw_header(f, areas.header, app);
    draw_main(f, areas.main, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size, app);
    }
}

/// Exactly one view body is on screen at a time
fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    match app.current_view() {
        View::Summary => app.dashboard.render(f, area, &app.ctx),
        View::TakingAttendance => app.attendance.render(f, area, &app.ctx),
        View::GroupList => app.groups.render(f, area, &app.ctx),
    }
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("View ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.current_view().title())),
    ];
    if app.ctx.stats_loading {
        spans.push(Span::styled(
            "Loading… ",
            Style::default().fg(Color::LightYellow),
        ));
    }
    if let Some(updated) = app.ctx.stats_updated.as_ref() {
        spans.push(Span::styled("Updated ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(updated.clone()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("dashboard", "Show the summary"),
        ("attendance", "Take attendance [group id]"),
        ("groups", "List my groups"),
        ("refresh", "Reload the current view"),
        ("logout", "Sign out"),
        ("quit", "Leave without signing out"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn action_hints(app: &App) -> Line<'static> {
    let hints: &[(&str, &str)] = match app.current_view() {
        View::Summary => &[("a", "attendance"), ("g", "groups"), ("Enter", "open")],
        View::GroupList => &[("j/k", "move"), ("Enter", "take attendance")],
        View::TakingAttendance => &[("Space", "toggle"), ("s", "submit"), ("Esc", "back")],
    };
    let mut spans = Vec::new();
    for (key, label) in hints
        .iter()
        .chain([("r", "refresh"), ("L", "logout"), ("?", "help")].iter())
    {
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint_text = command_hint(&app.command.input).unwrap_or("dashboard | attendance | groups");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(80, 60, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default().title("Help").borders(Borders::ALL);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let left = vec![
        Line::from("Views"),
        Line::from("  1 / 2 / 3  Dashboard / Attendance / Groups"),
        Line::from(""),
        Line::from("Dashboard"),
        Line::from("  Tab / ←→   Select quick action"),
        Line::from("  a g h      Take attendance, groups, history"),
        Line::from(""),
        Line::from("Attendance"),
        Line::from("  j / k      Move selection"),
        Line::from("  Space      Toggle present"),
        Line::from("  a / n      Mark all present / absent"),
        Line::from("  s          Submit"),
        Line::from("  Esc        Back to groups"),
    ];
    let right = vec![
        Line::from("Groups"),
        Line::from("  Enter      Take attendance"),
        Line::from("  Esc        Back to dashboard"),
        Line::from(""),
        Line::from("General"),
        Line::from("  : or /     Command bar"),
        Line::from("  r          Refresh"),
        Line::from("  L          Sign out"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from(format!("Signed in as {}", app.ctx.user_name)),
    ];

    for (lines, column) in [(left, columns[0]), (right, columns[1])] {
        let paragraph = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, column);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
