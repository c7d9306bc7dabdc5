/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{NaiveDateTime, Utc};
use entity::task::{Priority, TaskStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, ensure_owner, require_fields};
use crate::input::{duration_minutes, sanitize};
use crate::repositories::{
    NewTask, Page, PageRequest, ProjectRepository, Repositories, TagRepository, TaskChanges,
    TaskFilters, TaskRepository, TaskWithRelations,
};

/// Raw task creation request. Required fields are optional here so that
/// every missing one can be reported at once.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<i32>,
    pub user_id: Option<String>,
    pub project_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsSummary {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub pending: u64,
    pub canceled: u64,
    /// Minutes, summed over completed tasks with a recorded duration.
    pub total_duration: i64,
    pub average_duration: i64,
}

impl TaskStatsSummary {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a TaskWithRelations>) -> Self {
        let mut stats = TaskStatsSummary::default();
        let mut timed = 0i64;

        for task in tasks {
            let task = &task.task;
            stats.total += 1;

            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Canceled => stats.canceled += 1,
            }

            if let (TaskStatus::Completed, Some(duration)) = (task.status, task.duration) {
                stats.total_duration += i64::from(duration);
                timed += 1;
            }
        }

        if timed > 0 {
            stats.average_duration =
                (stats.total_duration as f64 / timed as f64 + 0.5).floor() as i64;
        }

        stats
    }
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    tags: Arc<dyn TagRepository>,
}

impl TaskService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            tasks: Arc::clone(&repositories.tasks),
            projects: Arc::clone(&repositories.projects),
            tags: Arc::clone(&repositories.tags),
        }
    }

    async fn check_project(&self, project_id: Uuid, user_id: &str) -> ServiceResult<()> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        ensure_owner(&project.project.user_id, user_id)
    }

    async fn check_tags(&self, tag_ids: &[Uuid], user_id: &str) -> ServiceResult<()> {
        for tag_id in tag_ids {
            let tag = self
                .tags
                .find_by_id(*tag_id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("Tag with id {}", tag_id)))?;

            ensure_owner(&tag.tag.user_id, user_id)?;
        }

        Ok(())
    }

    pub async fn create_task(&self, input: TaskInput) -> ServiceResult<TaskWithRelations> {
        let title = sanitize(input.title);
        let user_id = sanitize(input.user_id);
        require_fields(&[("title", title.as_deref()), ("userId", user_id.as_deref())])?;
        let title = title.unwrap_or_default();
        let user_id = user_id.unwrap_or_default();

        if let Some(project_id) = input.project_id {
            self.check_project(project_id, &user_id).await?;
        }

        let tag_ids = input.tag_ids.unwrap_or_default();
        self.check_tags(&tag_ids, &user_id).await?;

        let duration = match (input.start_time, input.end_time) {
            (Some(start), Some(end)) => Some(duration_minutes(start, end)?),
            _ => input.duration,
        };

        let task = self
            .tasks
            .create(NewTask {
                title,
                description: sanitize(input.description),
                status: input.status.unwrap_or(TaskStatus::Pending),
                priority: input.priority.unwrap_or(Priority::Medium),
                start_time: input.start_time,
                end_time: input.end_time,
                duration,
                user_id,
                project_id: input.project_id,
                tag_ids,
            })
            .await?;

        tracing::debug!(task = %task.task.id, user = %task.task.user_id, "created task");
        Ok(task)
    }

    pub async fn get_task_by_id(&self, id: Uuid, user_id: &str) -> ServiceResult<TaskWithRelations> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task"))?;

        ensure_owner(&task.task.user_id, user_id)?;
        Ok(task)
    }

    /// Applies a partial update. Duration is recomputed whenever the task
    /// ends up with both a start and an end time.
    pub async fn update_task(
        &self,
        id: Uuid,
        mut changes: TaskChanges,
        user_id: &str,
    ) -> ServiceResult<TaskWithRelations> {
        let existing = self.get_task_by_id(id, user_id).await?;

        changes.title = sanitize(changes.title);
        changes.description = sanitize(changes.description);

        if let Some(project_id) = changes.project_id {
            self.check_project(project_id, user_id).await?;
        }

        if let Some(tag_ids) = &changes.tag_ids {
            self.check_tags(tag_ids, user_id).await?;
        }

        let start = changes.start_time.or(existing.task.start_time);
        let end = changes.end_time.or(existing.task.end_time);
        if let (Some(start), Some(end)) = (start, end) {
            changes.duration = Some(duration_minutes(start, end)?);
        }

        let task = self.tasks.update(id, changes).await?;
        tracing::debug!(task = %id, "updated task");
        Ok(task)
    }

    pub async fn delete_task(&self, id: Uuid, user_id: &str) -> ServiceResult<TaskWithRelations> {
        self.get_task_by_id(id, user_id).await?;

        let task = self.tasks.delete(id).await?;
        tracing::debug!(task = %id, "deleted task");
        Ok(task)
    }

    /// Moving to `IN_PROGRESS` stamps the start time unless one exists.
    /// Moving to `COMPLETED` stamps the end time only for started tasks.
    pub async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        user_id: &str,
    ) -> ServiceResult<TaskWithRelations> {
        let existing = self.get_task_by_id(id, user_id).await?;
        let now = Utc::now().naive_utc();

        let mut changes = TaskChanges {
            status: Some(status),
            ..Default::default()
        };

        match status {
            TaskStatus::InProgress if existing.task.start_time.is_none() => {
                changes.start_time = Some(now);
            }
            TaskStatus::Completed if existing.task.start_time.is_some() => {
                changes.end_time = Some(now);
            }
            _ => {}
        }

        self.update_task(id, changes, user_id).await
    }

    pub async fn get_tasks_by_filters(
        &self,
        mut filters: TaskFilters,
        page: PageRequest,
    ) -> ServiceResult<Page<TaskWithRelations>> {
        require_fields(&[("userId", Some(filters.user_id.as_str()))])?;
        filters.search = sanitize(filters.search);

        Ok(self.tasks.find_page(&filters, page).await?)
    }

    /// Counts per status over the user's tasks, restricted to the date range
    /// only when both bounds are given.
    pub async fn get_task_stats(
        &self,
        user_id: &str,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> ServiceResult<TaskStatsSummary> {
        require_fields(&[("userId", Some(user_id))])?;

        let mut filters = TaskFilters::for_user(user_id);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            filters.start_date = Some(start);
            filters.end_date = Some(end);
        }

        let tasks = self.tasks.find_all(&filters).await?;
        Ok(TaskStatsSummary::from_tasks(&tasks))
    }
}
