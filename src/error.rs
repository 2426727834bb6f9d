use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use thiserror::Error;

/// Failures surfaced by the scheduling state and its exports.
///
/// Running out of slots is not an error: those sessions come back as
/// unscheduled items in a successful result.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("No courses available. Please add courses first.")]
    NoCourses,
    #[error("No faculty available. Please add faculty first.")]
    NoFaculty,
    #[error("No rooms available. Please add rooms first.")]
    NoRooms,
    #[error("Invalid {entity}: {reason}")]
    InvalidEntity { entity: &'static str, reason: String },
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("No {0} available to export")]
    NothingToExport(&'static str),
    #[error("'{0}' is not a class time slot")]
    NotAClassSlot(String),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV export produced invalid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Scheduling state is unavailable")]
    StateUnavailable,
}

impl SchedulerError {
    pub fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        SchedulerError::InvalidEntity {
            entity,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        SchedulerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SchedulerError::NoCourses
            | SchedulerError::NoFaculty
            | SchedulerError::NoRooms
            | SchedulerError::InvalidEntity { .. }
            | SchedulerError::NothingToExport(_)
            | SchedulerError::NotAClassSlot(_) => StatusCode::BAD_REQUEST,
            SchedulerError::NotFound { .. } => StatusCode::NOT_FOUND,
            SchedulerError::Csv(_)
            | SchedulerError::Json(_)
            | SchedulerError::Utf8(_)
            | SchedulerError::StateUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, self.to_string()).into_response()
    }
}

pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;
