//! Group list module - the instructor's groups, with a way into attendance

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::block::{Position, Title};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::core::{Action, Context, Module, View};

#[derive(Debug, Clone, Default)]
pub struct GroupList {
    selected: usize,
}

impl GroupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called each time the list becomes the active view
    pub fn on_enter(&mut self) -> Action {
        self.selected = 0;
        Action::LoadGroups
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

impl Module for GroupList {
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        let len = ctx.groups.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Enter | KeyCode::Char('a') => match ctx.groups.get(self.selected) {
                Some(group) => Action::BeginAttendance(group.clone()),
                None => Action::None,
            },
            KeyCode::Esc => Action::Navigate(View::Summary),
            _ => Action::None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("MY GROUPS");

        if ctx.groups.is_empty() {
            let text = if ctx.groups_loading {
                "Loading groups…"
            } else {
                "No groups assigned"
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = ctx
            .groups
            .iter()
            .map(|group| {
                let students = group
                    .student_count
                    .map(|n| format!("  {n} students"))
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::raw(group.display_name()),
                    Span::styled(students, Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                block.title(
                    Title::from(" Enter take attendance · r reload ").position(Position::Bottom),
                ),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
