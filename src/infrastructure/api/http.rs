//! JSON-over-HTTP implementation of the backend collaborators

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::{AuthService, GroupSource, StatsSource};
use crate::config::{normalize_base_url, ApiConfig};
use crate::domain::{
    ApiError, AttendanceRecord, AuthError, Group, Session, Statistics, StatsFetchError, Student,
};

/// Talks to the attendance backend with bearer-token authentication
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    config: ApiConfig,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: normalize_base_url(&config.base_url),
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let body = read_body(response).await?;
        serde_json::from_str(&body).map_err(|err| ApiError::Malformed(err.to_string()))
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: truncate(&body, 200),
        });
    }
    Ok(body)
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let head: String = value.chars().take(max).collect();
        format!("{head}…")
    }
}

fn stats_error(err: ApiError) -> StatsFetchError {
    match err {
        ApiError::Transport(msg) => StatsFetchError::Transport(msg),
        ApiError::Status { status, body } => StatsFetchError::Status { status, body },
        ApiError::Unauthorized => StatsFetchError::Unauthorized,
        ApiError::Malformed(msg) => StatsFetchError::Malformed(msg),
    }
}

#[async_trait]
impl StatsSource for HttpBackend {
    async fn fetch_instructor_statistics(
        &self,
        session: &Session,
    ) -> Result<Statistics, StatsFetchError> {
        let stats: Statistics = self
            .get_json(session, &self.config.stats_path)
            .await
            .map_err(stats_error)?;
        stats.validate()
    }
}

#[async_trait]
impl GroupSource for HttpBackend {
    async fn list_groups(&self, session: &Session) -> Result<Vec<Group>, ApiError> {
        self.get_json(session, &self.config.groups_path).await
    }

    async fn list_students(
        &self,
        session: &Session,
        group_id: &str,
    ) -> Result<Vec<Student>, ApiError> {
        let path = self.config.students_path.replace("{id}", group_id);
        self.get_json(session, &path).await
    }

    async fn submit_attendance(
        &self,
        session: &Session,
        record: &AttendanceRecord,
    ) -> Result<(), ApiError> {
        let url = self.url(&self.config.attendance_path);
        tracing::debug!(%url, group = %record.group_id, "POST attendance");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .json(record)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        read_body(response).await.map(|_| ())
    }
}

#[async_trait]
impl AuthService for HttpBackend {
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let url = self.url(&self.config.logout_path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        let status = response.status();
        // An already-expired session is as good as signed out
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = ApiConfig {
            base_url: "localhost:3000/api/".into(),
            ..ApiConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:3000/api");
        assert_eq!(
            backend.url("/estadisticas/profesor"),
            "http://localhost:3000/api/estadisticas/profesor"
        );
        assert_eq!(backend.url("grupos"), "http://localhost:3000/api/grupos");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
