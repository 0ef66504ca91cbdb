//! Dashboard flow through the App, without a terminal or a backend
//!
//! Runtime commands are drained by hand and answers are fed back as
//! runtime events, in whatever order a test wants them delivered.

use attendance_dash::app::{App, Destination, InputMode, StatusLevel};
use attendance_dash::core::View;
use attendance_dash::domain::{
    ApiError, Group, Session, SessionGate, SignOutState, StalePolicy, Statistics,
    StatsFetchError, Student, User,
};
use attendance_dash::infrastructure::{RuntimeCommand, RuntimeEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn session() -> Session {
    Session {
        token: "token-abc".to_string(),
        user: User::named("Ana Ruiz"),
    }
}

fn app_with(policy: StalePolicy) -> App {
    App::new(SessionGate::new(session(), None), policy)
}

fn app() -> App {
    app_with(StalePolicy::LastWriteWins)
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_command(app: &mut App, command: &str) {
    press(app, KeyCode::Char(':'));
    for c in command.chars() {
        press(app, KeyCode::Char(c));
    }
    press(app, KeyCode::Enter);
}

fn stats_generations(commands: &[RuntimeCommand]) -> Vec<u64> {
    commands
        .iter()
        .filter_map(|cmd| match cmd {
            RuntimeCommand::FetchStatistics { generation } => Some(*generation),
            _ => None,
        })
        .collect()
}

fn groups() -> Vec<Group> {
    vec![Group::new("G1", "1A"), Group::new("G2", "2B")]
}

fn student(id: &str, name: &str) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        last_name: None,
    }
}

// =============================================================================
// VIEW TRANSITIONS
// =============================================================================

#[test]
fn test_starts_on_summary_with_zero_statistics() {
    let mut app = app();
    assert_eq!(app.current_view(), View::Summary);
    assert_eq!(app.ctx.statistics, Statistics::default());
    assert_eq!(app.ctx.user_name, "Ana Ruiz");

    let commands = app.drain_commands();
    assert_eq!(stats_generations(&commands).len(), 1);
    assert!(app.drain_commands().is_empty());
}

#[test]
fn test_last_navigation_wins() {
    let mut app = app();
    app.navigate(View::GroupList);
    app.navigate(View::TakingAttendance);
    app.navigate(View::GroupList);
    assert_eq!(app.current_view(), View::GroupList);
}

#[test]
fn test_only_summary_entries_fetch_statistics() {
    let mut app = app();
    app.drain_commands();

    app.navigate(View::GroupList);
    app.navigate(View::TakingAttendance);
    assert!(stats_generations(&app.drain_commands()).is_empty());

    app.navigate(View::Summary);
    assert_eq!(stats_generations(&app.drain_commands()).len(), 1);

    // Already on Summary: no transition, no fetch
    app.navigate(View::Summary);
    press(&mut app, KeyCode::Char('1'));
    assert!(stats_generations(&app.drain_commands()).is_empty());

    // An explicit refresh still reloads
    press(&mut app, KeyCode::Char('r'));
    assert_eq!(stats_generations(&app.drain_commands()).len(), 1);
    assert_eq!(app.current_view(), View::Summary);
}

#[test]
fn test_group_list_then_begin_attendance() {
    let mut app = app();
    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.current_view(), View::GroupList);
    assert!(app
        .drain_commands()
        .iter()
        .any(|cmd| matches!(cmd, RuntimeCommand::FetchGroups)));

    app.apply_event(RuntimeEvent::GroupsLoaded { result: Ok(groups()) });
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.current_view(), View::TakingAttendance);
    assert_eq!(app.views.selected_group().map(|g| g.id.as_str()), Some("G1"));
    let commands = app.drain_commands();
    assert!(commands.iter().any(|cmd| matches!(
        cmd,
        RuntimeCommand::FetchRoster { group_id } if group_id == "G1"
    )));
}

#[test]
fn test_return_from_attendance_lands_on_group_list() {
    let mut app = app();
    app.begin_attendance(Group::new("G1", "1A"));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.current_view(), View::GroupList);
    assert!(app.views.selected_group().is_none());
}

#[test]
fn test_generic_attendance_loads_groups_for_picker() {
    let mut app = app();
    app.drain_commands();
    app.navigate(View::TakingAttendance);
    assert!(app.views.selected_group().is_none());
    assert!(app
        .drain_commands()
        .iter()
        .any(|cmd| matches!(cmd, RuntimeCommand::FetchGroups)));
}

#[test]
fn test_picker_choice_becomes_selected_group() {
    let mut app = app();
    app.navigate(View::TakingAttendance);
    app.apply_event(RuntimeEvent::GroupsLoaded { result: Ok(groups()) });
    app.drain_commands();

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.views.selected_group().map(|g| g.id.as_str()), Some("G2"));
    assert!(app.drain_commands().iter().any(|cmd| matches!(
        cmd,
        RuntimeCommand::FetchRoster { group_id } if group_id == "G2"
    )));
}

// =============================================================================
// COMMAND BAR
// =============================================================================

#[test]
fn test_command_navigation() {
    let mut app = app();
    type_command(&mut app, "groups");
    assert_eq!(app.current_view(), View::GroupList);
    assert_eq!(app.input_mode, InputMode::Normal);

    type_command(&mut app, "dashboard");
    assert_eq!(app.current_view(), View::Summary);
    assert_eq!(app.command.last.as_deref(), Some("dashboard"));
}

#[test]
fn test_attendance_command_with_group_id() {
    let mut app = app();
    app.apply_event(RuntimeEvent::GroupsLoaded { result: Ok(groups()) });
    type_command(&mut app, "attendance G2");
    assert_eq!(app.current_view(), View::TakingAttendance);
    let group = app.views.selected_group().cloned();
    assert_eq!(group, Some(Group::new("G2", "2B")));
}

#[test]
fn test_unknown_command_warns() {
    let mut app = app();
    type_command(&mut app, "frobnicate");
    assert_eq!(app.current_view(), View::Summary);
    assert!(matches!(app.status_text(), Some((_, StatusLevel::Warn))));
}

#[test]
fn test_quit_key() {
    let mut app = app();
    press(&mut app, KeyCode::Char('q'));
    assert_eq!(app.exit, Some(Destination::Quit));
}

// =============================================================================
// STATISTICS
// =============================================================================

#[test]
fn test_fetch_failure_keeps_zero_statistics() {
    let mut app = app();
    let generation = stats_generations(&app.drain_commands())[0];
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation,
        result: Err(StatsFetchError::Transport("connection refused".into())),
    });
    app.sync_context();
    assert_eq!(app.ctx.statistics, Statistics::default());
    assert!(matches!(app.status_text(), Some((_, StatusLevel::Warn))));
}

#[test]
fn test_failure_after_success_keeps_previous_value() {
    let mut app = app();
    let first = stats_generations(&app.drain_commands())[0];
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation: first,
        result: Ok(Statistics::new(3, 42, 2, 87.5)),
    });

    app.refresh();
    let second = stats_generations(&app.drain_commands())[0];
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation: second,
        result: Err(StatsFetchError::Unauthorized),
    });
    app.sync_context();
    assert_eq!(app.ctx.statistics, Statistics::new(3, 42, 2, 87.5));
}

#[test]
fn test_overlapping_fetches_follow_delivery_order() {
    let mut app = app();
    let initial = stats_generations(&app.drain_commands())[0];
    app.navigate(View::GroupList);
    app.navigate(View::Summary);
    let generations = [initial, stats_generations(&app.drain_commands())[0]];

    // Newer request answers first, older one lands last and wins
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation: generations[1],
        result: Ok(Statistics::new(2, 20, 1, 50.0)),
    });
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation: generations[0],
        result: Ok(Statistics::new(1, 10, 0, 25.0)),
    });
    app.sync_context();
    assert_eq!(app.ctx.statistics, Statistics::new(1, 10, 0, 25.0));
    assert!(!app.ctx.stats_loading);
}

#[test]
fn test_latest_only_ignores_superseded_response() {
    let mut app = app_with(StalePolicy::LatestOnly);
    let initial = stats_generations(&app.drain_commands())[0];
    app.navigate(View::GroupList);
    app.navigate(View::Summary);
    let generations = [initial, stats_generations(&app.drain_commands())[0]];

    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation: generations[1],
        result: Ok(Statistics::new(2, 20, 1, 50.0)),
    });
    app.apply_event(RuntimeEvent::StatisticsLoaded {
        generation: generations[0],
        result: Ok(Statistics::new(1, 10, 0, 25.0)),
    });
    app.sync_context();
    assert_eq!(app.ctx.statistics, Statistics::new(2, 20, 1, 50.0));
}

// =============================================================================
// ATTENDANCE
// =============================================================================

#[test]
fn test_submit_attendance_and_return() {
    let mut app = app();
    app.begin_attendance(Group::new("G1", "1A"));
    app.drain_commands();
    app.apply_event(RuntimeEvent::RosterLoaded {
        group_id: "G1".to_string(),
        result: Ok(vec![student("s1", "Luis"), student("s2", "Marta")]),
    });

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('s'));

    let record = app
        .drain_commands()
        .into_iter()
        .find_map(|cmd| match cmd {
            RuntimeCommand::SubmitAttendance { record } => Some(record),
            _ => None,
        })
        .expect("submit command");
    assert_eq!(record.group_id, "G1");
    assert_eq!(record.marks.len(), 2);
    assert!(record.marks[0].present);
    assert!(!record.marks[1].present);

    app.apply_event(RuntimeEvent::AttendanceSubmitted {
        group_id: "G1".to_string(),
        result: Ok(()),
    });
    assert_eq!(app.current_view(), View::GroupList);
    assert!(matches!(app.status_text(), Some((_, StatusLevel::Info))));
}

#[test]
fn test_submit_failure_stays_on_form() {
    let mut app = app();
    app.begin_attendance(Group::new("G1", "1A"));
    app.apply_event(RuntimeEvent::RosterLoaded {
        group_id: "G1".to_string(),
        result: Ok(vec![student("s1", "Luis")]),
    });
    press(&mut app, KeyCode::Char('s'));
    app.drain_commands();

    app.apply_event(RuntimeEvent::AttendanceSubmitted {
        group_id: "G1".to_string(),
        result: Err(ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        }),
    });
    assert_eq!(app.current_view(), View::TakingAttendance);
    assert!(!app.attendance.is_submitting());
    assert!(matches!(app.status_text(), Some((_, StatusLevel::Error))));
}

#[test]
fn test_roster_for_other_group_is_ignored() {
    let mut app = app();
    app.begin_attendance(Group::new("G1", "1A"));
    app.apply_event(RuntimeEvent::RosterLoaded {
        group_id: "G2".to_string(),
        result: Ok(vec![student("s9", "Otro")]),
    });
    assert!(app.attendance.roster().is_empty());
}

// =============================================================================
// SIGN-OUT
// =============================================================================

#[test]
fn test_logout_waits_for_auth_then_exits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{}").unwrap();

    let mut app = App::new(
        SessionGate::new(session(), Some(path.clone())),
        StalePolicy::LastWriteWins,
    );
    app.drain_commands();

    press(&mut app, KeyCode::Char('L'));
    press(&mut app, KeyCode::Char('L'));
    let sign_outs = app
        .drain_commands()
        .into_iter()
        .filter(|cmd| matches!(cmd, RuntimeCommand::SignOut { .. }))
        .count();
    assert_eq!(sign_outs, 1);
    assert_eq!(app.session.state(), SignOutState::Pending);
    assert!(app.exit.is_none());

    app.apply_event(RuntimeEvent::SignedOut { error: None });
    assert_eq!(app.exit, Some(Destination::SignedOut { warning: None }));
    assert_eq!(app.session.state(), SignOutState::SignedOut);
    assert!(!path.exists());
}

#[test]
fn test_remote_sign_out_failure_still_exits() {
    let mut app = app();
    type_command(&mut app, "logout");
    app.drain_commands();
    app.apply_event(RuntimeEvent::SignedOut {
        error: Some("sign-out request failed: timeout".to_string()),
    });
    assert!(matches!(
        app.exit,
        Some(Destination::SignedOut { warning: Some(_) })
    ));
}

#[test]
fn test_sign_out_completes_when_worker_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{}").unwrap();

    let mut app = App::new(
        SessionGate::new(session(), Some(path.clone())),
        StalePolicy::LastWriteWins,
    );
    app.drain_commands();
    type_command(&mut app, "logout");

    for cmd in app.drain_commands() {
        app.command_failed(cmd, "Worker channel closed".to_string());
    }
    match &app.exit {
        Some(Destination::SignedOut { warning: Some(warning) }) => {
            assert!(warning.contains("Worker channel closed"));
        }
        other => panic!("expected sign-out with warning, got {other:?}"),
    }
    assert_eq!(app.session.state(), SignOutState::SignedOut);
    assert!(!path.exists());
}

#[test]
fn test_unsent_statistics_request_settles_as_failure() {
    let mut app = app();
    for cmd in app.drain_commands() {
        app.command_failed(cmd, "Worker channel closed".to_string());
    }
    app.sync_context();
    assert!(!app.ctx.stats_loading);
    assert_eq!(app.ctx.statistics, Statistics::default());
    assert!(matches!(app.status_text(), Some((_, StatusLevel::Warn))));
}
