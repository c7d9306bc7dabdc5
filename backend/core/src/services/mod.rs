/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod ai;
pub mod project;
pub mod tag;
pub mod task;

pub use ai::{
    AiError, AiService, ChatMessage, ChatMessageInput, ChatRole, CompletionModel, OpenAiClient,
    SummaryPeriod, parse_chat_messages,
};
pub use project::{ProjectInput, ProjectService};
pub use tag::TagService;
pub use task::{TaskInput, TaskService, TaskStatsSummary};

use crate::input::InputError;
use crate::repositories::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Access denied: You do not have permission to access this resource")]
    AccessDenied,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(#[from] RepoError),
    #[error(transparent)]
    Ai(#[from] AiError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<InputError> for ServiceError {
    fn from(err: InputError) -> Self {
        ServiceError::Invalid(err.to_string())
    }
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }
}

pub(crate) fn ensure_owner(resource_user_id: &str, user_id: &str) -> ServiceResult<()> {
    if resource_user_id == user_id {
        Ok(())
    } else {
        Err(ServiceError::AccessDenied)
    }
}

/// Collects the names of every field that is missing or blank.
pub(crate) fn require_fields(fields: &[(&'static str, Option<&str>)]) -> ServiceResult<()> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::MissingFields(missing))
    }
}
