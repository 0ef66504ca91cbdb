//! Rendered output, checked on an in-memory terminal

use attendance_dash::app::App;
use attendance_dash::core::View;
use attendance_dash::domain::{
    Group, Session, SessionGate, StalePolicy, Statistics, StatsFetchError, User,
};
use attendance_dash::infrastructure::{RuntimeCommand, RuntimeEvent};
use attendance_dash::ui;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn app() -> App {
    let session = Session {
        token: "t".to_string(),
        user: User::named("Ana Ruiz"),
    };
    App::new(SessionGate::new(session, None), StalePolicy::LastWriteWins)
}

fn first_generation(app: &mut App) -> u64 {
    app.drain_commands()
        .into_iter()
        .find_map(|cmd| match cmd {
            RuntimeCommand::FetchStatistics { generation } => Some(generation),
            _ => None,
        })
        .unwrap()
}

fn render(app: &mut App) -> String {
    let backend = TestBackend::new(120, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer.get(x, y).symbol());
        }
        out.push('\n');
    }
    out
}

#[test]
fn test_loaded_statistics_are_rendered() {
    let mut app = app();
    let generation = first_generation(&mut app);
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation,
        result: Ok(Statistics::new(3, 42, 2, 87.5)),
    });

    let screen = render(&mut app);
    assert!(screen.contains("My Courses"));
    assert!(screen.contains("42"));
    assert!(screen.contains("87.5%"));
    assert!(screen.contains("Hello, Ana Ruiz"));
}

#[test]
fn test_failed_fetch_renders_zeros() {
    let mut app = app();
    let generation = first_generation(&mut app);
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation,
        result: Err(StatsFetchError::Transport("refused".to_string())),
    });

    let screen = render(&mut app);
    assert!(screen.contains("0.0%"));
    assert!(screen.contains("Could not load statistics"));
}

#[test]
fn test_one_view_body_at_a_time() {
    let mut app = app();
    app.navigate(View::GroupList);
    app.apply_event(RuntimeEvent::GroupsLoaded {
        result: Ok(vec![Group::new("G1", "Álgebra 1A")]),
    });

    let screen = render(&mut app);
    assert!(screen.contains("MY GROUPS"));
    assert!(screen.contains("Álgebra 1A"));
    assert!(!screen.contains("QUICK ACTIONS"));
}

#[test]
fn test_help_popup() {
    let mut app = app();
    app.help_open = true;
    let screen = render(&mut app);
    assert!(screen.contains("Toggle help"));
    assert!(screen.contains("Signed in as"));

    // Esc is listed per view, each with where it leads
    assert!(screen.contains("Esc        Back to groups"));
    assert!(screen.contains("Esc        Back to dashboard"));
    assert!(screen
        .lines()
        .filter(|line| line.contains("Esc  "))
        .all(|line| line.contains("Back to")));
}
