//! Attendance module - pick a group, mark the roster, submit
//!
//! Entered with an optional preselected group. Without one, the form
//! starts on a group picker fed by the shared group list.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::core::{Action, Context, Module, NotifyLevel};
use crate::domain::{ApiError, AttendanceMark, AttendanceRecord, Group, Student};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student: Student,
    pub present: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceForm {
    group: Option<Group>,
    picker_selected: usize,
    roster: Vec<RosterEntry>,
    roster_loading: bool,
    selected: usize,
    submitting: bool,
}

impl AttendanceForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the form for a fresh visit
    pub fn enter(&mut self, preselected: Option<Group>, ctx: &Context) -> Action {
        *self = Self::default();
        match preselected {
            Some(group) => self.choose(group),
            None if ctx.groups.is_empty() => Action::LoadGroups,
            None => Action::None,
        }
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn choose(&mut self, group: Group) -> Action {
        let id = group.id.clone();
        self.group = Some(group);
        self.roster.clear();
        self.selected = 0;
        self.roster_loading = true;
        Action::LoadRoster(id)
    }

    /// Roster responses for a group no longer on screen are ignored
    pub fn apply_roster(&mut self, group_id: &str, result: Result<Vec<Student>, ApiError>) -> Action {
        if self.group.as_ref().map(|g| g.id.as_str()) != Some(group_id) {
            return Action::None;
        }
        self.roster_loading = false;
        match result {
            Ok(students) => {
                self.roster = students
                    .into_iter()
                    .map(|student| RosterEntry {
                        student,
                        present: true,
                    })
                    .collect();
                Action::None
            }
            Err(err) => Action::Notify(format!("Could not load roster: {err}"), NotifyLevel::Error),
        }
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    pub fn toggle_selected(&mut self) {
        if let Some(entry) = self.roster.get_mut(self.selected) {
            entry.present = !entry.present;
        }
    }

    pub fn mark_all(&mut self, present: bool) {
        for entry in &mut self.roster {
            entry.present = present;
        }
    }

    pub fn build_record(&self, date: &str) -> Option<AttendanceRecord> {
        let group = self.group.as_ref()?;
        if self.roster.is_empty() {
            return None;
        }
        Some(AttendanceRecord {
            group_id: group.id.clone(),
            date: date.to_string(),
            marks: self
                .roster
                .iter()
                .map(|entry| AttendanceMark {
                    student_id: entry.student.id.clone(),
                    present: entry.present,
                })
                .collect(),
        })
    }

    fn submit(&mut self) -> Action {
        if self.submitting {
            return Action::None;
        }
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        match self.build_record(&today) {
            Some(record) => {
                self.submitting = true;
                Action::SubmitAttendance(record)
            }
            None => Action::Notify("Nothing to submit".to_string(), NotifyLevel::Warn),
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent, ctx: &Context) -> Action {
        let len = ctx.groups.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.picker_selected + 1 < len {
                    self.picker_selected += 1;
                }
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.picker_selected = self.picker_selected.saturating_sub(1);
                Action::None
            }
            // Re-enter with the group so the view carries the selection
            KeyCode::Enter => match ctx.groups.get(self.picker_selected) {
                Some(group) => Action::BeginAttendance(group.clone()),
                None => Action::None,
            },
            _ => Action::None,
        }
    }

    fn handle_roster_key(&mut self, key: KeyEvent) -> Action {
        let len = self.roster.len();
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
            KeyCode::Char(' ') => {
                self.toggle_selected();
                Action::None
            }
            KeyCode::Char('a') => {
                self.mark_all(true);
                Action::None
            }
            KeyCode::Char('n') => {
                self.mark_all(false);
                Action::None
            }
            KeyCode::Char('s') => self.submit(),
            _ => Action::None,
        }
    }
}

impl Module for AttendanceForm {
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Action {
        if key.code == KeyCode::Esc {
            return Action::ReturnFromAttendance;
        }
        if self.group.is_none() {
            self.handle_picker_key(key, ctx)
        } else {
            self.handle_roster_key(key)
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        match self.group.as_ref() {
            None => self.render_picker(frame, area, ctx),
            Some(group) => self.render_roster(frame, area, group),
        }
    }
}

impl AttendanceForm {
    fn render_picker(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("TAKE ATTENDANCE · choose a group");

        if ctx.groups.is_empty() {
            let text = if ctx.groups_loading {
                "Loading groups…"
            } else {
                "No groups assigned"
            };
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        }

        let items: Vec<ListItem> = ctx
            .groups
            .iter()
            .map(|group| ListItem::new(group.display_name()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.picker_selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_roster(&self, frame: &mut Frame, area: Rect, group: &Group) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let present = self.roster.iter().filter(|entry| entry.present).count();
        let summary = Line::from(vec![
            Span::styled(
                group.display_name(),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled("Present ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{present}/{}", self.roster.len())),
            Span::raw(if self.submitting { "   Submitting…" } else { "" }),
        ]);
        frame.render_widget(
            Paragraph::new(summary).block(Block::default().borders(Borders::ALL)),
            chunks[0],
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("STUDENTS");
        if self.roster.is_empty() {
            let text = if self.roster_loading {
                "Loading students…"
            } else {
                "No students in this group"
            };
            frame.render_widget(Paragraph::new(text).block(block), chunks[1]);
        } else {
            let items: Vec<ListItem> = self
                .roster
                .iter()
                .map(|entry| {
                    let (mark, color) = if entry.present {
                        ("[x]", Color::Green)
                    } else {
                        ("[ ]", Color::Red)
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(mark, Style::default().fg(color)),
                        Span::raw(" "),
                        Span::raw(entry.student.full_name()),
                    ]))
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut state = ListState::default();
            state.select(Some(self.selected));
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }

        let hints = Line::from(Span::styled(
            " Space toggle · a all present · n all absent · s submit · Esc back",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(hints), chunks[2]);
    }
}
