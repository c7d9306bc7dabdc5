/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Process-local store behind the repository traits. Mirrors the relational
//! constraints of the schema: unique tag names per user, foreign keys on task
//! links and `project_id` cleared when a project goes away.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::project::{NewProject, ProjectChanges, ProjectRepository, ProjectWithStats, TaskStats};
use super::tag::{NewTag, TagChanges, TagRepository, TagWithStats, rank_popular};
use super::task::{
    NewTask, ProjectRef, TagRef, TaskChanges, TaskFilters, TaskRepository, TaskWithRelations,
};
use super::{Page, PageRequest, RepoError, RepoResult};
use crate::types::*;

#[derive(Debug, Default)]
struct Tables {
    tasks: Vec<MTask>,
    task_tags: Vec<MTaskTag>,
    projects: Vec<MProject>,
    tags: Vec<MTag>,
}

impl Tables {
    fn project(&self, id: Uuid) -> Option<&MProject> {
        self.projects.iter().find(|p| p.id == id)
    }

    fn tag(&self, id: Uuid) -> Option<&MTag> {
        self.tags.iter().find(|t| t.id == id)
    }

    fn check_task_refs(&self, project_id: Option<Uuid>, tag_ids: &[Uuid]) -> RepoResult<()> {
        if project_id.is_some_and(|id| self.project(id).is_none()) {
            return Err(RepoError::ForeignKey);
        }

        if tag_ids.iter().any(|id| self.tag(*id).is_none()) {
            return Err(RepoError::ForeignKey);
        }

        Ok(())
    }

    fn link_tags(&mut self, task_id: Uuid, tag_ids: &[Uuid]) {
        let mut seen = HashSet::new();

        for tag_id in tag_ids.iter().filter(|id| seen.insert(**id)) {
            self.task_tags.push(MTaskTag {
                id: Uuid::new_v4(),
                task: task_id,
                tag: *tag_id,
            });
        }
    }

    fn with_relations(&self, task: &MTask) -> TaskWithRelations {
        let project = task
            .project_id
            .and_then(|id| self.project(id))
            .cloned()
            .map(ProjectRef::from);

        let mut tags: Vec<TagRef> = self
            .task_tags
            .iter()
            .filter(|link| link.task == task.id)
            .filter_map(|link| self.tag(link.tag))
            .cloned()
            .map(TagRef::from)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        TaskWithRelations {
            task: task.clone(),
            project,
            tags,
        }
    }

    /// Newest first. Ties on `created_at` fall back to insertion order,
    /// later inserts first, so the order is total across pages.
    fn filtered_tasks(&self, filters: &TaskFilters) -> Vec<TaskWithRelations> {
        let mut tasks: Vec<(usize, TaskWithRelations)> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(position, task)| (position, self.with_relations(task)))
            .filter(|(_, task)| filters.matches(task))
            .collect();

        tasks.sort_by(|(pa, a), (pb, b)| (b.task.created_at, pb).cmp(&(a.task.created_at, pa)));
        tasks.into_iter().map(|(_, task)| task).collect()
    }

    fn project_stats(&self, project: &MProject) -> ProjectWithStats {
        let mut stats = TaskStats::default();

        for task in self.tasks.iter().filter(|t| t.project_id == Some(project.id)) {
            stats.add(task.status, 1);
        }

        ProjectWithStats::new(project.clone(), stats)
    }

    fn tag_stats(&self, tag: &MTag) -> TagWithStats {
        TagWithStats {
            tag: tag.clone(),
            task_count: self.task_tags.iter().filter(|l| l.tag == tag.id).count() as u64,
        }
    }

    fn tag_name_taken(&self, user_id: &str, name: &str, except: Option<Uuid>) -> bool {
        self.tags
            .iter()
            .any(|t| t.user_id == user_id && t.name == name && Some(t.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create(&self, new: NewTask) -> RepoResult<TaskWithRelations> {
        let mut tables = self.tables.write().await;
        tables.check_task_refs(new.project_id, &new.tag_ids)?;

        let now = Utc::now().naive_utc();
        let task = MTask {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            start_time: new.start_time,
            end_time: new.end_time,
            duration: new.duration,
            user_id: new.user_id,
            project_id: new.project_id,
            created_at: now,
            updated_at: now,
        };

        tables.link_tags(task.id, &new.tag_ids);
        tables.tasks.push(task.clone());

        Ok(tables.with_relations(&task))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<TaskWithRelations>> {
        let tables = self.tables.read().await;

        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| tables.with_relations(t)))
    }

    async fn find_page(
        &self,
        filters: &TaskFilters,
        page: PageRequest,
    ) -> RepoResult<Page<TaskWithRelations>> {
        let tables = self.tables.read().await;
        Ok(Page::slice(tables.filtered_tasks(filters), page))
    }

    async fn find_all(&self, filters: &TaskFilters) -> RepoResult<Vec<TaskWithRelations>> {
        let tables = self.tables.read().await;
        Ok(tables.filtered_tasks(filters))
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> RepoResult<TaskWithRelations> {
        let mut tables = self.tables.write().await;
        tables.check_task_refs(changes.project_id, changes.tag_ids.as_deref().unwrap_or(&[]))?;

        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(RepoError::NotFound)?;
        changes.apply(task);
        task.updated_at = Utc::now().naive_utc();
        let task = task.clone();

        if let Some(tag_ids) = &changes.tag_ids {
            tables.task_tags.retain(|link| link.task != id);
            tables.link_tags(id, tag_ids);
        }

        Ok(tables.with_relations(&task))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<TaskWithRelations> {
        let mut tables = self.tables.write().await;

        let index = tables
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(RepoError::NotFound)?;
        let deleted = tables.with_relations(&tables.tasks[index]);

        tables.tasks.remove(index);
        tables.task_tags.retain(|link| link.task != id);

        Ok(deleted)
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn create(&self, new: NewProject) -> RepoResult<ProjectWithStats> {
        let mut tables = self.tables.write().await;
        let now = Utc::now().naive_utc();

        let project = MProject {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            color: new.color,
            is_active: true,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };

        tables.projects.push(project.clone());
        Ok(ProjectWithStats::new(project, TaskStats::default()))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProjectWithStats>> {
        let tables = self.tables.read().await;
        Ok(tables.project(id).map(|p| tables.project_stats(p)))
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> RepoResult<Vec<ProjectWithStats>> {
        let tables = self.tables.read().await;

        let mut projects: Vec<ProjectWithStats> = tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id && (include_inactive || p.is_active))
            .map(|p| tables.project_stats(p))
            .collect();
        projects.sort_by(|a, b| b.project.updated_at.cmp(&a.project.updated_at));

        Ok(projects)
    }

    async fn update(&self, id: Uuid, changes: ProjectChanges) -> RepoResult<ProjectWithStats> {
        let mut tables = self.tables.write().await;

        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        changes.apply(project);
        project.updated_at = Utc::now().naive_utc();
        let project = project.clone();

        Ok(tables.project_stats(&project))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<ProjectWithStats> {
        let mut tables = self.tables.write().await;

        let index = tables
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        let deleted = tables.project_stats(&tables.projects[index]);

        tables.projects.remove(index);
        for task in tables.tasks.iter_mut().filter(|t| t.project_id == Some(id)) {
            task.project_id = None;
        }

        Ok(deleted)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create(&self, new: NewTag) -> RepoResult<TagWithStats> {
        let mut tables = self.tables.write().await;

        if tables.tag_name_taken(&new.user_id, &new.name, None) {
            return Err(RepoError::Duplicate);
        }

        let tag = MTag {
            id: Uuid::new_v4(),
            name: new.name,
            color: new.color,
            user_id: new.user_id,
            created_at: Utc::now().naive_utc(),
        };

        tables.tags.push(tag.clone());
        Ok(TagWithStats { tag, task_count: 0 })
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<TagWithStats>> {
        let tables = self.tables.read().await;
        Ok(tables.tag(id).map(|t| tables.tag_stats(t)))
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<TagWithStats>> {
        let tables = self.tables.read().await;

        let mut tags: Vec<TagWithStats> = tables
            .tags
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| tables.tag_stats(t))
            .collect();
        tags.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));

        Ok(tags)
    }

    async fn find_by_name(&self, user_id: &str, name: &str) -> RepoResult<Option<TagWithStats>> {
        let tables = self.tables.read().await;

        Ok(tables
            .tags
            .iter()
            .find(|t| t.user_id == user_id && t.name == name)
            .map(|t| tables.tag_stats(t)))
    }

    async fn find_popular(&self, user_id: &str, limit: u64) -> RepoResult<Vec<TagWithStats>> {
        let tags = TagRepository::find_by_user(self, user_id).await?;
        Ok(rank_popular(tags, limit))
    }

    async fn update(&self, id: Uuid, changes: TagChanges) -> RepoResult<TagWithStats> {
        let mut tables = self.tables.write().await;

        let current = tables.tag(id).cloned().ok_or(RepoError::NotFound)?;
        let renamed_to_taken = changes
            .name
            .as_deref()
            .is_some_and(|name| tables.tag_name_taken(&current.user_id, name, Some(id)));
        if renamed_to_taken {
            return Err(RepoError::Duplicate);
        }

        let tag = tables
            .tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(RepoError::NotFound)?;
        changes.apply(tag);
        let tag = tag.clone();

        Ok(tables.tag_stats(&tag))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<TagWithStats> {
        let mut tables = self.tables.write().await;

        let index = tables
            .tags
            .iter()
            .position(|t| t.id == id)
            .ok_or(RepoError::NotFound)?;
        let deleted = tables.tag_stats(&tables.tags[index]);

        tables.tags.remove(index);
        tables.task_tags.retain(|link| link.tag != id);

        Ok(deleted)
    }
}
