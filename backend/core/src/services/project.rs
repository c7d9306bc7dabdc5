/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, ensure_owner, require_fields};
use crate::input::sanitize;
use crate::repositories::{
    NewProject, ProjectChanges, ProjectRepository, ProjectWithStats, Repositories,
};

#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            projects: Arc::clone(&repositories.projects),
        }
    }

    pub async fn create_project(&self, input: ProjectInput) -> ServiceResult<ProjectWithStats> {
        let name = sanitize(input.name);
        let user_id = sanitize(input.user_id);
        require_fields(&[("name", name.as_deref()), ("userId", user_id.as_deref())])?;

        let project = self
            .projects
            .create(NewProject {
                name: name.unwrap_or_default(),
                description: sanitize(input.description),
                color: sanitize(input.color),
                user_id: user_id.unwrap_or_default(),
            })
            .await?;

        tracing::debug!(project = %project.project.id, "created project");
        Ok(project)
    }

    pub async fn get_project_by_id(&self, id: Uuid, user_id: &str) -> ServiceResult<ProjectWithStats> {
        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        ensure_owner(&project.project.user_id, user_id)?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        changes: ProjectChanges,
        user_id: &str,
    ) -> ServiceResult<ProjectWithStats> {
        self.get_project_by_id(id, user_id).await?;

        let changes = ProjectChanges {
            name: sanitize(changes.name),
            description: sanitize(changes.description),
            color: sanitize(changes.color),
            is_active: changes.is_active,
        };

        Ok(self.projects.update(id, changes).await?)
    }

    pub async fn delete_project(&self, id: Uuid, user_id: &str) -> ServiceResult<ProjectWithStats> {
        self.get_project_by_id(id, user_id).await?;

        let project = self.projects.delete(id).await?;
        tracing::debug!(project = %id, "deleted project");
        Ok(project)
    }

    pub async fn get_user_projects(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> ServiceResult<Vec<ProjectWithStats>> {
        require_fields(&[("userId", Some(user_id))])?;
        Ok(self.projects.find_by_user(user_id, include_inactive).await?)
    }

    pub async fn get_active_user_projects(&self, user_id: &str) -> ServiceResult<Vec<ProjectWithStats>> {
        self.get_user_projects(user_id, false).await
    }

    pub async fn toggle_project_status(&self, id: Uuid, user_id: &str) -> ServiceResult<ProjectWithStats> {
        let existing = self.get_project_by_id(id, user_id).await?;

        let changes = ProjectChanges {
            is_active: Some(!existing.project.is_active),
            ..Default::default()
        };

        Ok(self.projects.update(id, changes).await?)
    }
}
