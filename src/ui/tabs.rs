//! Header with the view tab bar

use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs as RataTabs};
use ratatui::Frame;

use crate::app::App;
use crate::core::View;

pub fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Instructor Dashboard ",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);
    draw_tab_bar(f, inner, app);

    let greeting = Line::from(vec![
        Span::styled("Hello, ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.ctx.user_name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            Local::now().format("%A, %B %-d %Y").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let right = Paragraph::new(greeting)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Right);
    f.render_widget(right, chunks[1]);
}

/// Draw the tab bar, highlighting the active view
pub fn draw_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|view| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", view.shortcut()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(view.title()),
            ])
        })
        .collect();

    let current = app.current_view();
    let selected = View::ALL.iter().position(|v| *v == current).unwrap_or(0);

    let tabs = RataTabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, area);
}
