/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use chrono::NaiveDateTime;
use clap::Parser;
use std::sync::Arc;
use workmind::repositories::Repositories;
use workmind::services::{CompletionModel, ProjectInput, TaskInput};
use workmind::types::{Cli, ServerState};

pub fn create_mock_cli() -> Cli {
    Cli::parse_from(["workmind-server", "--in-memory"])
}

pub fn create_mock_state(model: Option<Arc<dyn CompletionModel>>) -> ServerState {
    ServerState::new(create_mock_cli(), &Repositories::in_memory(), model)
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn task_input(title: &str, user_id: &str) -> TaskInput {
    TaskInput {
        title: Some(title.to_string()),
        user_id: Some(user_id.to_string()),
        ..Default::default()
    }
}

pub fn project_input(name: &str, user_id: &str) -> ProjectInput {
    ProjectInput {
        name: Some(name.to_string()),
        user_id: Some(user_id.to_string()),
        ..Default::default()
    }
}
