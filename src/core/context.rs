//! Shared context passed to modules

use crate::domain::{Group, Statistics};

/// Shared context available to all modules
#[derive(Debug, Default)]
pub struct Context {
    /// Display name of the signed-in instructor
    pub user_name: String,

    /// Groups taught by the instructor, as last loaded
    pub groups: Vec<Group>,

    /// Whether a group listing request is outstanding
    pub groups_loading: bool,

    /// Latest statistics held by the loader
    pub statistics: Statistics,

    /// Whether any statistics fetch is in flight
    pub stats_loading: bool,

    /// Local time of the last successful statistics load
    pub stats_updated: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }
}
