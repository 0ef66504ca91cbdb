//! Dashboard module - statistics cards and quick actions

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::core::{Action, Context, Module, NotifyLevel, View};
use crate::domain::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    TakeAttendance,
    MyGroups,
    History,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [
        QuickAction::TakeAttendance,
        QuickAction::MyGroups,
        QuickAction::History,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            QuickAction::TakeAttendance => "Take Attendance",
            QuickAction::MyGroups => "View My Groups",
            QuickAction::History => "Attendance History",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            QuickAction::TakeAttendance => 'a',
            QuickAction::MyGroups => 'g',
            QuickAction::History => 'h',
        }
    }

    fn color(&self) -> Color {
        match self {
            QuickAction::TakeAttendance => Color::LightBlue,
            QuickAction::MyGroups => Color::LightGreen,
            QuickAction::History => Color::LightMagenta,
        }
    }

    fn action(&self) -> Action {
        match self {
            QuickAction::TakeAttendance => Action::Navigate(View::TakingAttendance),
            QuickAction::MyGroups => Action::Navigate(View::GroupList),
            QuickAction::History => Action::Notify(
                "Attendance history is not available yet".to_string(),
                NotifyLevel::Info,
            ),
        }
    }
}

/// Label/value pairs for the four summary cards
pub fn card_values(stats: &Statistics) -> [(&'static str, String); 4] {
    [
        ("My Courses", stats.course_count.to_string()),
        ("Total Students", stats.student_count.to_string()),
        ("Today's Classes", stats.todays_class_count.to_string()),
        ("Average Attendance", stats.attendance_label()),
    ]
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    selected_action: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self { selected_action: 0 }
    }

    pub fn selected_action(&self) -> QuickAction {
        QuickAction::ALL[self.selected_action]
    }

    pub fn next_action(&mut self) {
        self.selected_action = (self.selected_action + 1) % QuickAction::ALL.len();
    }

    pub fn prev_action(&mut self) {
        let len = QuickAction::ALL.len();
        self.selected_action = (self.selected_action + len - 1) % len;
    }
}

impl Module for Dashboard {
    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Action {
        match key.code {
            KeyCode::Tab | KeyCode::Right => {
                self.next_action();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.prev_action();
                Action::None
            }
            KeyCode::Enter => self.selected_action().action(),
            KeyCode::Char(c) => QuickAction::ALL
                .iter()
                .find(|quick| quick.shortcut() == c)
                .map(|quick| quick.action())
                .unwrap_or(Action::None),
            _ => Action::None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // cards
                Constraint::Length(1),
                Constraint::Length(5), // quick actions
                Constraint::Min(0),
            ])
            .split(area);

        self.render_cards(frame, chunks[0], ctx);
        self.render_quick_actions(frame, chunks[2]);
    }
}

impl Dashboard {
    fn render_cards(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(area);

        let value_style = if ctx.stats_loading {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };

        for (column, (label, value)) in columns.iter().zip(card_values(&ctx.statistics)) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(label, Style::default().fg(Color::Gray)));
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(value, value_style)),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, *column);
        }
    }

    fn render_quick_actions(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("QUICK ACTIONS");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(inner);

        for (index, (column, quick)) in columns.iter().zip(QuickAction::ALL).enumerate() {
            let selected = index == self.selected_action;
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(quick.color())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(quick.color())
            };
            let line = Line::from(vec![
                Span::styled(format!("{} ", quick.shortcut()), Style::default().fg(Color::Yellow)),
                Span::styled(format!(" {} ", quick.title()), style),
            ]);
            let paragraph = Paragraph::new(vec![Line::from(""), line]).alignment(Alignment::Center);
            frame.render_widget(paragraph, *column);
        }
    }
}
