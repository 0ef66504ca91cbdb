//! Groups, rosters and attendance records exchanged with the backend

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A roster of students the instructor teaches in one course section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "curso", default)]
    pub course: Option<String>,
    #[serde(rename = "cantidadEstudiantes", default)]
    pub student_count: Option<u32>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            course: None,
            student_count: None,
        }
    }

    pub fn display_name(&self) -> String {
        let name = if self.name.trim().is_empty() {
            format!("Group {}", self.id)
        } else {
            self.name.clone()
        };
        match self.course.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(course) => format!("{name} · {course}"),
            None => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(last) => format!("{} {}", self.name, last),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceMark {
    #[serde(rename = "estudianteId")]
    pub student_id: String,
    #[serde(rename = "presente")]
    pub present: bool,
}

/// One class meeting's presence/absence list for a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    #[serde(rename = "grupoId")]
    pub group_id: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "asistencias")]
    pub marks: Vec<AttendanceMark>,
}

impl AttendanceRecord {
    pub fn present_count(&self) -> usize {
        self.marks.iter().filter(|mark| mark.present).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("session rejected by server")]
    Unauthorized,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Backends disagree on numeric vs string ids; keep them as strings
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}
