/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::{greater_than_zero, port_in_range};
use super::repositories::Page;
use super::services::{AiService, ProjectService, TagService, TaskService};
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(name = "WorkMind", display_name = "WorkMind", bin_name = "workmind-server", author = "Wavelens", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "WORKMIND_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "WORKMIND_LOG_JSON", default_value = "false")]
    pub log_json: bool,
    #[arg(long, env = "WORKMIND_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "WORKMIND_PORT", value_parser = port_in_range, default_value_t = 3000)]
    pub port: u16,
    #[arg(
        long,
        env = "WORKMIND_SERVE_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    pub serve_url: String,
    #[arg(long, env = "WORKMIND_DEBUG", default_value = "false")]
    pub debug: bool,
    #[arg(long, env = "WORKMIND_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "WORKMIND_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    /// Keep everything in process memory instead of PostgreSQL.
    #[arg(long, env = "WORKMIND_IN_MEMORY", default_value = "false")]
    pub in_memory: bool,
    #[arg(long, env = "WORKMIND_STATE_FILE")]
    pub state_file: Option<String>,
    #[arg(long, env = "WORKMIND_OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
    #[arg(long, env = "WORKMIND_OPENAI_API_KEY_FILE")]
    pub openai_api_key_file: Option<String>,
    #[arg(
        long,
        env = "WORKMIND_OPENAI_BASE_URL",
        default_value = crate::consts::OPENAI_BASE_URL
    )]
    pub openai_base_url: String,
    #[arg(long, env = "WORKMIND_AI_MODEL", default_value = crate::consts::DEFAULT_AI_MODEL)]
    pub ai_model: String,
    /// Seconds before a completion request is abandoned.
    #[arg(long, env = "WORKMIND_AI_TIMEOUT", value_parser = greater_than_zero::<u64>, default_value = "60")]
    pub ai_timeout: u64,
    #[arg(long, env = "WORKMIND_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "WORKMIND_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

pub struct ServerState {
    pub cli: Cli,
    pub tasks: TaskService,
    pub projects: ProjectService,
    pub tags: TagService,
    pub ai: AiService,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

/// Envelope wrapped around every JSON response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            pagination: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(page: Page<T>) -> Self {
        let pagination = Pagination::from(&page);

        Self {
            success: true,
            data: Some(page.data),
            error: None,
            message: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            pagination: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

pub type DBConn = Arc<DatabaseConnection>;

pub type EProject = project::Entity;
pub type ETag = tag::Entity;
pub type ETask = task::Entity;
pub type ETaskTag = task_tag::Entity;
pub type EUser = user::Entity;

pub type MProject = project::Model;
pub type MTag = tag::Model;
pub type MTask = task::Model;
pub type MTaskTag = task_tag::Model;
pub type MUser = user::Model;

pub type AProject = project::ActiveModel;
pub type ATag = tag::ActiveModel;
pub type ATask = task::ActiveModel;
pub type ATaskTag = task_tag::ActiveModel;
pub type AUser = user::ActiveModel;

pub type CProject = project::Column;
pub type CTag = tag::Column;
pub type CTask = task::Column;
pub type CTaskTag = task_tag::Column;
pub type CUser = user::Column;
