//! Backend collaborators consumed by the dashboard

mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ApiError, AttendanceRecord, AuthError, Group, Session, Statistics, StatsFetchError, Student,
};

pub use http::HttpBackend;

/// Source of the instructor's aggregate statistics
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
    async fn fetch_instructor_statistics(
        &self,
        session: &Session,
    ) -> Result<Statistics, StatsFetchError>;
}

/// Group listing and attendance submission
#[async_trait]
pub trait GroupSource: Send + Sync + 'static {
    async fn list_groups(&self, session: &Session) -> Result<Vec<Group>, ApiError>;

    async fn list_students(&self, session: &Session, group_id: &str)
        -> Result<Vec<Student>, ApiError>;

    async fn submit_attendance(
        &self,
        session: &Session,
        record: &AttendanceRecord,
    ) -> Result<(), ApiError>;
}

/// Invalidates a session on the server
#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

/// The set of collaborators the runtime worker talks to
#[derive(Clone)]
pub struct Collaborators {
    pub stats: Arc<dyn StatsSource>,
    pub groups: Arc<dyn GroupSource>,
    pub auth: Arc<dyn AuthService>,
}

impl Collaborators {
    /// One backend serving every concern
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: StatsSource + GroupSource + AuthService,
    {
        let backend = Arc::new(backend);
        Self {
            stats: backend.clone(),
            groups: backend.clone(),
            auth: backend,
        }
    }
}
