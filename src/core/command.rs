//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation commands
    Dashboard,
    Attendance(Option<String>),
    Groups,

    // Session
    Refresh,
    Logout,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        "dashboard" | "summary" | "home" | "dash" => Command::Dashboard,
        "attendance" | "asistencia" | "att" => Command::Attendance(args),
        "groups" | "grupos" | "grp" => Command::Groups,
        "refresh" | "reload" => Command::Refresh,
        "logout" | "signout" => Command::Logout,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(input.to_string()),
    }
}
