/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use entity::task::{Priority, TaskStatus};
use entity::{tag, task, task_tag};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::{Page, PageRequest, RepoError, RepoResult};
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl From<MProject> for ProjectRef {
    fn from(project: MProject) -> Self {
        Self {
            id: project.id,
            name: project.name,
            color: project.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl From<MTag> for TagRef {
    fn from(tag: MTag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
        }
    }
}

/// A task together with its project summary and tags, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithRelations {
    #[serde(flatten)]
    pub task: MTask,
    pub project: Option<ProjectRef>,
    pub tags: Vec<TagRef>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<i32>,
    pub user_id: String,
    pub project_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

/// Partial update. `None` leaves the stored value untouched; `tag_ids`
/// replaces the whole tag set when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<i32>,
    pub project_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
}

impl TaskChanges {
    pub fn apply(&self, task: &mut MTask) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(start_time) = self.start_time {
            task.start_time = Some(start_time);
        }
        if let Some(end_time) = self.end_time {
            task.end_time = Some(end_time);
        }
        if let Some(duration) = self.duration {
            task.duration = Some(duration);
        }
        if let Some(project_id) = self.project_id {
            task.project_id = Some(project_id);
        }
    }
}

/// Task query. All supplied criteria must hold. The date range is half-open,
/// `[start_date, end_date)`, and matches when either the start or end time of
/// a task falls inside it; either bound may be omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    pub user_id: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub search: Option<String>,
}

impl TaskFilters {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    fn time_in_range(&self, time: Option<NaiveDateTime>) -> bool {
        time.is_some_and(|t| {
            self.start_date.is_none_or(|start| t >= start)
                && self.end_date.is_none_or(|end| t < end)
        })
    }

    fn column_in_range(&self, column: CTask) -> Condition {
        let mut condition = Condition::all().add(column.is_not_null());

        if let Some(start) = self.start_date {
            condition = condition.add(column.gte(start));
        }

        if let Some(end) = self.end_date {
            condition = condition.add(column.lt(end));
        }

        condition
    }

    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all().add(CTask::UserId.eq(self.user_id.as_str()));

        if let Some(status) = self.status {
            condition = condition.add(CTask::Status.eq(status));
        }

        if let Some(priority) = self.priority {
            condition = condition.add(CTask::Priority.eq(priority));
        }

        if let Some(project_id) = self.project_id {
            condition = condition.add(CTask::ProjectId.eq(project_id));
        }

        if !self.tag_ids.is_empty() {
            condition = condition.add(
                CTask::Id.in_subquery(
                    Query::select()
                        .column(CTaskTag::Task)
                        .from(task_tag::Entity)
                        .and_where(CTaskTag::Tag.is_in(self.tag_ids.clone()))
                        .to_owned(),
                ),
            );
        }

        if self.has_date_range() {
            condition = condition.add(
                Condition::any()
                    .add(self.column_in_range(CTask::StartTime))
                    .add(self.column_in_range(CTask::EndTime)),
            );
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));

            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((task::Entity, CTask::Title))))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((task::Entity, CTask::Description))))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }

        condition
    }

    /// Newest first, with the id as tie-break so pages never overlap.
    pub fn query(&self) -> Select<task::Entity> {
        ETask::find()
            .filter(self.condition())
            .order_by_desc(CTask::CreatedAt)
            .order_by_desc(CTask::Id)
    }

    pub fn matches(&self, task: &TaskWithRelations) -> bool {
        let t = &task.task;

        if t.user_id != self.user_id {
            return false;
        }

        if self.status.is_some_and(|status| t.status != status)
            || self.priority.is_some_and(|priority| t.priority != priority)
        {
            return false;
        }

        if self.project_id.is_some() && t.project_id != self.project_id {
            return false;
        }

        if !self.tag_ids.is_empty() && !task.tags.iter().any(|tag| self.tag_ids.contains(&tag.id))
        {
            return false;
        }

        if self.has_date_range()
            && !self.time_in_range(t.start_time)
            && !self.time_in_range(t.end_time)
        {
            return false;
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_title = t.title.to_lowercase().contains(&needle);
            let in_description = t
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));

            if !in_title && !in_description {
                return false;
            }
        }

        true
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> RepoResult<TaskWithRelations>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<TaskWithRelations>>;
    /// Newest first.
    async fn find_page(
        &self,
        filters: &TaskFilters,
        page: PageRequest,
    ) -> RepoResult<Page<TaskWithRelations>>;
    async fn find_all(&self, filters: &TaskFilters) -> RepoResult<Vec<TaskWithRelations>>;
    async fn update(&self, id: Uuid, changes: TaskChanges) -> RepoResult<TaskWithRelations>;
    async fn delete(&self, id: Uuid) -> RepoResult<TaskWithRelations>;
}

pub struct SeaOrmTaskRepository {
    db: DBConn,
}

impl SeaOrmTaskRepository {
    pub fn new(db: DBConn) -> Self {
        Self { db }
    }

    async fn with_relations(&self, task: MTask) -> RepoResult<TaskWithRelations> {
        load_relations(self.db.as_ref(), vec![task])
            .await?
            .pop()
            .ok_or(RepoError::NotFound)
    }
}

/// Attaches project summaries and tags with two batched queries.
async fn load_relations<C: ConnectionTrait>(
    db: &C,
    tasks: Vec<MTask>,
) -> Result<Vec<TaskWithRelations>, DbErr> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let project_ids: Vec<Uuid> = tasks
        .iter()
        .filter_map(|t| t.project_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();

    let projects: HashMap<Uuid, ProjectRef> = if project_ids.is_empty() {
        HashMap::new()
    } else {
        EProject::find()
            .filter(CProject::Id.is_in(project_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, ProjectRef::from(p)))
            .collect()
    };

    let links = ETaskTag::find()
        .filter(CTaskTag::Task.is_in(task_ids))
        .find_also_related(tag::Entity)
        .all(db)
        .await?;

    let mut tags: HashMap<Uuid, Vec<TagRef>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            tags.entry(link.task).or_default().push(TagRef::from(tag));
        }
    }

    Ok(tasks
        .into_iter()
        .map(|task| {
            let project = task.project_id.and_then(|id| projects.get(&id).cloned());
            let mut task_tags = tags.remove(&task.id).unwrap_or_default();
            task_tags.sort_by(|a, b| a.name.cmp(&b.name));

            TaskWithRelations {
                task,
                project,
                tags: task_tags,
            }
        })
        .collect())
}

async fn insert_tag_links<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), DbErr> {
    let mut seen = HashSet::new();
    let links: Vec<ATaskTag> = tag_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|tag_id| ATaskTag {
            id: Set(Uuid::new_v4()),
            task: Set(task_id),
            tag: Set(*tag_id),
        })
        .collect();

    if links.is_empty() {
        return Ok(());
    }

    ETaskTag::insert_many(links).exec(db).await?;
    Ok(())
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    async fn create(&self, new: NewTask) -> RepoResult<TaskWithRelations> {
        let now = Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let atask = ATask {
            id: Set(Uuid::new_v4()),
            title: Set(new.title),
            description: Set(new.description),
            status: Set(new.status),
            priority: Set(new.priority),
            start_time: Set(new.start_time),
            end_time: Set(new.end_time),
            duration: Set(new.duration),
            user_id: Set(new.user_id),
            project_id: Set(new.project_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let task = atask.insert(&txn).await?;
        insert_tag_links(&txn, task.id, &new.tag_ids).await?;
        txn.commit().await?;

        self.with_relations(task).await
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<TaskWithRelations>> {
        match ETask::find_by_id(id).one(self.db.as_ref()).await? {
            Some(task) => Ok(Some(self.with_relations(task).await?)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filters: &TaskFilters,
        page: PageRequest,
    ) -> RepoResult<Page<TaskWithRelations>> {
        let paginator = filters.query().paginate(self.db.as_ref(), page.limit);

        let (tasks, total) = futures::try_join!(
            paginator.fetch_page(page.page.saturating_sub(1)),
            paginator.num_items()
        )?;

        let tasks = load_relations(self.db.as_ref(), tasks).await?;
        Ok(Page::new(tasks, total, page.page, page.limit))
    }

    async fn find_all(&self, filters: &TaskFilters) -> RepoResult<Vec<TaskWithRelations>> {
        let tasks = filters.query().all(self.db.as_ref()).await?;

        Ok(load_relations(self.db.as_ref(), tasks).await?)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> RepoResult<TaskWithRelations> {
        let txn = self.db.begin().await?;

        let mut task = ETask::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepoError::NotFound)?;
        changes.apply(&mut task);

        // Every column is written back; `apply` already merged the untouched ones.
        let mut atask = ATask::from(task).reset_all();
        atask.updated_at = Set(Utc::now().naive_utc());
        let task = atask.update(&txn).await?;

        if let Some(tag_ids) = &changes.tag_ids {
            ETaskTag::delete_many()
                .filter(CTaskTag::Task.eq(id))
                .exec(&txn)
                .await?;
            insert_tag_links(&txn, id, tag_ids).await?;
        }

        txn.commit().await?;
        self.with_relations(task).await
    }

    async fn delete(&self, id: Uuid) -> RepoResult<TaskWithRelations> {
        let task = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;

        let res = ETask::delete_by_id(id).exec(self.db.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(task)
    }
}
