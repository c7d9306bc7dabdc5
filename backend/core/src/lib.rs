/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod consts;
pub mod database;
pub mod input;
pub mod repositories;
pub mod services;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use database::connect_db;
use input::load_secret;
use repositories::Repositories;
use services::*;
use std::sync::Arc;
use std::time::Duration;
use types::*;

impl ServerState {
    pub fn new(cli: Cli, repositories: &Repositories, model: Option<Arc<dyn CompletionModel>>) -> Self {
        let tasks = TaskService::new(repositories);
        let projects = ProjectService::new(repositories);
        let tags = TagService::new(repositories);
        let ai = AiService::new(model, tasks.clone(), projects.clone());

        Self {
            cli,
            tasks,
            projects,
            tags,
            ai,
        }
    }
}

fn completion_model(cli: &Cli) -> Result<Option<Arc<dyn CompletionModel>>> {
    let api_key = match (&cli.openai_api_key_file, &cli.openai_api_key) {
        (Some(file), _) => load_secret(file),
        (None, Some(key)) => key.clone(),
        (None, None) => {
            tracing::warn!("No OpenAI API key configured, AI endpoints are disabled");
            return Ok(None);
        }
    };

    if api_key.is_empty() {
        anyhow::bail!("OpenAI API key is empty");
    }

    let client = OpenAiClient::new(
        api_key,
        &cli.openai_base_url,
        cli.ai_model.clone(),
        Duration::from_secs(cli.ai_timeout),
    )
    .context("Failed to build completion client")?;

    tracing::info!("AI endpoints enabled with model {}", client.model());
    Ok(Some(Arc::new(client)))
}

pub async fn init_state(cli: Cli) -> Result<Arc<ServerState>> {
    tracing::info!("Starting WorkMind Server on {}:{}", cli.ip, cli.port);

    let (db, repositories) = if cli.in_memory {
        tracing::warn!("Running with in-memory storage, data is lost on shutdown");
        (None, Repositories::in_memory())
    } else {
        let db: DBConn = Arc::new(connect_db(&cli).await?);
        let repositories = Repositories::from_database(Arc::clone(&db));
        (Some(db), repositories)
    };

    state::load_and_apply_state(db.as_deref(), &repositories, cli.state_file.as_deref())
        .await
        .context("Failed to apply state configuration")?;

    let model = completion_model(&cli)?;
    Ok(Arc::new(ServerState::new(cli, &repositories, model)))
}
