/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;

use crate::repositories::{NewProject, NewTag, Repositories};
use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_preferences")]
    pub preferences: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTag {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfiguration {
    #[serde(default)]
    pub users: Vec<StateUser>,
    #[serde(default)]
    pub projects: Vec<StateProject>,
    #[serde(default)]
    pub tags: Vec<StateTag>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Validation error in field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub is_valid: bool,
}

fn default_true() -> bool {
    true
}

fn default_preferences() -> serde_json::Value {
    serde_json::json!({})
}

impl StateConfiguration {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path))?;
        serde_json::from_str(&content).context("Failed to parse state file")
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let user_ids: HashSet<&str> = self.users.iter().map(|u| u.id.as_str()).collect();

        let mut seen_ids = HashSet::new();
        let mut seen_emails = HashSet::new();
        for user in &self.users {
            if user.id.trim().is_empty() {
                errors.push(ValidationError {
                    field: "users.id".to_string(),
                    message: "User id must not be empty".to_string(),
                });
            }

            if !seen_ids.insert(user.id.as_str()) {
                errors.push(ValidationError {
                    field: format!("users.{}.id", user.id),
                    message: "Duplicate user id found".to_string(),
                });
            }

            if !seen_emails.insert(user.email.as_str()) {
                errors.push(ValidationError {
                    field: format!("users.{}.email", user.id),
                    message: "Duplicate email found".to_string(),
                });
            }

            if !user.email.contains('@') {
                errors.push(ValidationError {
                    field: format!("users.{}.email", user.id),
                    message: "Invalid email format".to_string(),
                });
            }
        }

        let mut seen_projects = HashSet::new();
        for project in &self.projects {
            if !seen_projects.insert((project.user.as_str(), project.name.as_str())) {
                errors.push(ValidationError {
                    field: format!("projects.{}.name", project.name),
                    message: "Duplicate project name found".to_string(),
                });
            }

            if !user_ids.contains(project.user.as_str()) {
                errors.push(ValidationError {
                    field: format!("projects.{}.user", project.name),
                    message: format!("User '{}' does not exist", project.user),
                });
            }
        }

        let mut seen_tags = HashSet::new();
        for tag in &self.tags {
            if !seen_tags.insert((tag.user.as_str(), tag.name.as_str())) {
                errors.push(ValidationError {
                    field: format!("tags.{}.name", tag.name),
                    message: "Duplicate tag name found".to_string(),
                });
            }

            if !user_ids.contains(tag.user.as_str()) {
                errors.push(ValidationError {
                    field: format!("tags.{}.user", tag.name),
                    message: format!("User '{}' does not exist", tag.user),
                });
            }
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Loads the state file, validates it and creates whatever is missing.
/// Rows that already exist are left untouched.
pub async fn load_and_apply_state(
    db: Option<&DatabaseConnection>,
    repositories: &Repositories,
    state_file_path: Option<&str>,
) -> Result<()> {
    let Some(path) = state_file_path else {
        tracing::info!("No state file configured, skipping state management");
        return Ok(());
    };

    tracing::info!("Loading state configuration from: {}", path);
    let config = StateConfiguration::from_file(path)?;

    let validation = config.validate();
    if !validation.is_valid {
        let error_messages: Vec<String> = validation
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();

        anyhow::bail!(
            "State configuration validation failed:\n{}",
            error_messages.join("\n")
        );
    }

    apply_state(db, repositories, &config).await
}

pub async fn apply_state(
    db: Option<&DatabaseConnection>,
    repositories: &Repositories,
    config: &StateConfiguration,
) -> Result<()> {
    if let Some(db) = db {
        apply_users(db, &config.users).await?;
    }

    apply_projects(repositories, &config.projects).await?;
    apply_tags(repositories, &config.tags).await?;

    tracing::info!("State applied successfully");
    Ok(())
}

async fn apply_users(db: &DatabaseConnection, state_users: &[StateUser]) -> Result<()> {
    for state_user in state_users {
        let existing = EUser::find_by_id(state_user.id.clone())
            .one(db)
            .await
            .context("Failed to query user")?;

        if existing.is_some() {
            continue;
        }

        let now = Utc::now().naive_utc();
        let auser = AUser {
            id: Set(state_user.id.clone()),
            email: Set(state_user.email.clone()),
            name: Set(state_user.name.clone()),
            avatar_url: Set(state_user.avatar_url.clone()),
            preferences: Set(state_user.preferences.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        auser.insert(db).await.context("Failed to insert user")?;
        tracing::info!("Created managed user: {}", state_user.id);
    }

    Ok(())
}

async fn apply_projects(repositories: &Repositories, state_projects: &[StateProject]) -> Result<()> {
    for state_project in state_projects {
        let existing = repositories
            .projects
            .find_by_user(&state_project.user, true)
            .await
            .context("Failed to query projects")?;

        if existing
            .iter()
            .any(|p| p.project.name == state_project.name)
        {
            continue;
        }

        let project = repositories
            .projects
            .create(NewProject {
                name: state_project.name.clone(),
                description: state_project.description.clone(),
                color: state_project.color.clone(),
                user_id: state_project.user.clone(),
            })
            .await
            .context("Failed to insert project")?;

        if !state_project.active {
            repositories
                .projects
                .update(
                    project.project.id,
                    crate::repositories::ProjectChanges {
                        is_active: Some(false),
                        ..Default::default()
                    },
                )
                .await
                .context("Failed to deactivate project")?;
        }

        tracing::info!("Created managed project: {}", state_project.name);
    }

    Ok(())
}

async fn apply_tags(repositories: &Repositories, state_tags: &[StateTag]) -> Result<()> {
    for state_tag in state_tags {
        let existing = repositories
            .tags
            .find_by_name(&state_tag.user, &state_tag.name)
            .await
            .context("Failed to query tag")?;

        if existing.is_some() {
            continue;
        }

        repositories
            .tags
            .create(NewTag {
                name: state_tag.name.clone(),
                color: state_tag.color.clone(),
                user_id: state_tag.user.clone(),
            })
            .await
            .context("Failed to insert tag")?;

        tracing::info!("Created managed tag: {}", state_tag.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StateConfiguration {
        serde_json::from_value(serde_json::json!({
            "users": [
                { "id": "u1", "email": "ada@example.com", "name": "Ada" }
            ],
            "projects": [
                { "name": "Website", "user": "u1" },
                { "name": "Archive", "user": "u1", "active": false }
            ],
            "tags": [
                { "name": "backend", "color": "#ff0000", "user": "u1" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_configuration() {
        let validation = config().validate();
        assert!(validation.is_valid, "{:?}", validation.errors);
        assert_eq!(config().users[0].preferences, serde_json::json!({}));
    }

    #[test]
    fn test_invalid_configuration() {
        let mut config = config();
        config.users.push(StateUser {
            id: "u2".to_string(),
            email: "ada@example.com".to_string(),
            name: "Other".to_string(),
            avatar_url: None,
            preferences: default_preferences(),
        });
        config.tags.push(StateTag {
            name: "backend".to_string(),
            color: None,
            user: "u1".to_string(),
        });
        config.projects.push(StateProject {
            name: "Ghost".to_string(),
            description: None,
            color: None,
            active: true,
            user: "nobody".to_string(),
        });

        let validation = config.validate();
        assert!(!validation.is_valid);

        let fields: Vec<&str> = validation.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["users.u2.email", "projects.Ghost.user", "tags.backend.name"]
        );
    }

    #[tokio::test]
    async fn test_apply_state_is_idempotent() -> Result<()> {
        let repositories = Repositories::in_memory();
        let config = config();

        apply_state(None, &repositories, &config).await?;
        apply_state(None, &repositories, &config).await?;

        let projects = repositories.projects.find_by_user("u1", true).await?;
        assert_eq!(projects.len(), 2);
        assert!(
            projects
                .iter()
                .any(|p| p.project.name == "Archive" && !p.project.is_active)
        );

        let active = repositories.projects.find_by_user("u1", false).await?;
        assert_eq!(active.len(), 1);

        let tags = repositories.tags.find_by_user("u1").await?;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag.color.as_deref(), Some("#ff0000"));

        Ok(())
    }
}
