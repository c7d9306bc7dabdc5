/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use chrono::Utc;
use entity::task::TaskStatus;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::types::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub pending: u64,
}

impl TaskStats {
    pub fn add(&mut self, status: TaskStatus, count: u64) {
        self.total += count;

        match status {
            TaskStatus::Completed => self.completed += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::Pending => self.pending += count,
            TaskStatus::Canceled => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithStats {
    #[serde(flatten)]
    pub project: MProject,
    pub task_count: u64,
    pub task_stats: TaskStats,
}

impl ProjectWithStats {
    pub fn new(project: MProject, task_stats: TaskStats) -> Self {
        Self {
            project,
            task_count: task_stats.total,
            task_stats,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl ProjectChanges {
    pub fn apply(&self, project: &mut MProject) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(color) = &self.color {
            project.color = Some(color.clone());
        }
        if let Some(is_active) = self.is_active {
            project.is_active = is_active;
        }
    }
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: NewProject) -> RepoResult<ProjectWithStats>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProjectWithStats>>;
    /// Most recently updated first.
    async fn find_by_user(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> RepoResult<Vec<ProjectWithStats>>;
    async fn update(&self, id: Uuid, changes: ProjectChanges) -> RepoResult<ProjectWithStats>;
    /// Tasks of the project survive with their project cleared.
    async fn delete(&self, id: Uuid) -> RepoResult<ProjectWithStats>;
}

pub struct SeaOrmProjectRepository {
    db: DBConn,
}

#[derive(Debug, FromQueryResult)]
struct StatusCount {
    project_id: Uuid,
    status: TaskStatus,
    count: i64,
}

/// One grouped count over every requested project.
async fn task_stats<C: ConnectionTrait>(
    db: &C,
    project_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, TaskStats>, DbErr> {
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ETask::find()
        .select_only()
        .column(CTask::ProjectId)
        .column(CTask::Status)
        .column_as(CTask::Id.count(), "count")
        .filter(CTask::ProjectId.is_in(project_ids))
        .group_by(CTask::ProjectId)
        .group_by(CTask::Status)
        .into_model::<StatusCount>()
        .all(db)
        .await?;

    let mut stats: HashMap<Uuid, TaskStats> = HashMap::new();
    for row in rows {
        stats
            .entry(row.project_id)
            .or_default()
            .add(row.status, row.count.max(0) as u64);
    }

    Ok(stats)
}

impl SeaOrmProjectRepository {
    pub fn new(db: DBConn) -> Self {
        Self { db }
    }

    async fn with_stats(&self, projects: Vec<MProject>) -> RepoResult<Vec<ProjectWithStats>> {
        let mut stats = task_stats(self.db.as_ref(), projects.iter().map(|p| p.id).collect()).await?;

        Ok(projects
            .into_iter()
            .map(|project| {
                let project_stats = stats.remove(&project.id).unwrap_or_default();
                ProjectWithStats::new(project, project_stats)
            })
            .collect())
    }

    async fn one_with_stats(&self, project: MProject) -> RepoResult<ProjectWithStats> {
        self.with_stats(vec![project])
            .await?
            .pop()
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProjectRepository for SeaOrmProjectRepository {
    async fn create(&self, new: NewProject) -> RepoResult<ProjectWithStats> {
        let now = Utc::now().naive_utc();

        let aproject = AProject {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            description: Set(new.description),
            color: Set(new.color),
            is_active: Set(true),
            user_id: Set(new.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let project = aproject.insert(self.db.as_ref()).await?;
        Ok(ProjectWithStats::new(project, TaskStats::default()))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProjectWithStats>> {
        match EProject::find_by_id(id).one(self.db.as_ref()).await? {
            Some(project) => Ok(Some(self.one_with_stats(project).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> RepoResult<Vec<ProjectWithStats>> {
        let mut query = EProject::find().filter(CProject::UserId.eq(user_id));

        if !include_inactive {
            query = query.filter(CProject::IsActive.eq(true));
        }

        let projects = query
            .order_by_desc(CProject::UpdatedAt)
            .all(self.db.as_ref())
            .await?;

        self.with_stats(projects).await
    }

    async fn update(&self, id: Uuid, changes: ProjectChanges) -> RepoResult<ProjectWithStats> {
        let mut project = EProject::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepoError::NotFound)?;
        changes.apply(&mut project);

        let mut aproject = AProject::from(project).reset_all();
        aproject.updated_at = Set(Utc::now().naive_utc());
        let project = aproject.update(self.db.as_ref()).await?;

        self.one_with_stats(project).await
    }

    async fn delete(&self, id: Uuid) -> RepoResult<ProjectWithStats> {
        let project = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;

        let res = EProject::delete_by_id(id).exec(self.db.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(project)
    }
}
