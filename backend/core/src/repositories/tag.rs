/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use chrono::Utc;
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithStats {
    #[serde(flatten)]
    pub tag: MTag,
    pub task_count: u64,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl TagChanges {
    pub fn apply(&self, tag: &mut MTag) {
        if let Some(name) = &self.name {
            tag.name = name.clone();
        }
        if let Some(color) = &self.color {
            tag.color = Some(color.clone());
        }
    }
}

/// Orders by usage, most used first, then by name.
pub fn rank_popular(mut tags: Vec<TagWithStats>, limit: u64) -> Vec<TagWithStats> {
    tags.sort_by(|a, b| {
        b.task_count
            .cmp(&a.task_count)
            .then_with(|| a.tag.name.cmp(&b.tag.name))
    });
    tags.truncate(limit as usize);
    tags
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Fails with [`RepoError::Duplicate`] when the user already has a tag of that name.
    async fn create(&self, tag: NewTag) -> RepoResult<TagWithStats>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<TagWithStats>>;
    /// Sorted by name.
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<TagWithStats>>;
    async fn find_by_name(&self, user_id: &str, name: &str) -> RepoResult<Option<TagWithStats>>;
    async fn find_popular(&self, user_id: &str, limit: u64) -> RepoResult<Vec<TagWithStats>>;
    async fn update(&self, id: Uuid, changes: TagChanges) -> RepoResult<TagWithStats>;
    async fn delete(&self, id: Uuid) -> RepoResult<TagWithStats>;
}

pub struct SeaOrmTagRepository {
    db: DBConn,
}

#[derive(Debug, FromQueryResult)]
struct TagCount {
    tag: Uuid,
    count: i64,
}

async fn task_counts<C: ConnectionTrait>(
    db: &C,
    tag_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if tag_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ETaskTag::find()
        .select_only()
        .column(CTaskTag::Tag)
        .column_as(CTaskTag::Id.count(), "count")
        .filter(CTaskTag::Tag.is_in(tag_ids))
        .group_by(CTaskTag::Tag)
        .into_model::<TagCount>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.tag, row.count.max(0) as u64))
        .collect())
}

impl SeaOrmTagRepository {
    pub fn new(db: DBConn) -> Self {
        Self { db }
    }

    async fn with_counts(&self, tags: Vec<MTag>) -> RepoResult<Vec<TagWithStats>> {
        let counts = task_counts(self.db.as_ref(), tags.iter().map(|t| t.id).collect()).await?;

        Ok(tags
            .into_iter()
            .map(|tag| {
                let task_count = counts.get(&tag.id).copied().unwrap_or(0);
                TagWithStats { tag, task_count }
            })
            .collect())
    }

    async fn one_with_count(&self, tag: MTag) -> RepoResult<TagWithStats> {
        self.with_counts(vec![tag])
            .await?
            .pop()
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TagRepository for SeaOrmTagRepository {
    async fn create(&self, new: NewTag) -> RepoResult<TagWithStats> {
        let atag = ATag {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            color: Set(new.color),
            user_id: Set(new.user_id),
            created_at: Set(Utc::now().naive_utc()),
        };

        let tag = atag.insert(self.db.as_ref()).await?;
        Ok(TagWithStats { tag, task_count: 0 })
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<TagWithStats>> {
        match ETag::find_by_id(id).one(self.db.as_ref()).await? {
            Some(tag) => Ok(Some(self.one_with_count(tag).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<TagWithStats>> {
        let tags = ETag::find()
            .filter(CTag::UserId.eq(user_id))
            .order_by_asc(CTag::Name)
            .all(self.db.as_ref())
            .await?;

        self.with_counts(tags).await
    }

    async fn find_by_name(&self, user_id: &str, name: &str) -> RepoResult<Option<TagWithStats>> {
        let tag = ETag::find()
            .filter(CTag::UserId.eq(user_id))
            .filter(CTag::Name.eq(name))
            .one(self.db.as_ref())
            .await?;

        match tag {
            Some(tag) => Ok(Some(self.one_with_count(tag).await?)),
            None => Ok(None),
        }
    }

    async fn find_popular(&self, user_id: &str, limit: u64) -> RepoResult<Vec<TagWithStats>> {
        let tags = self.find_by_user(user_id).await?;
        Ok(rank_popular(tags, limit))
    }

    async fn update(&self, id: Uuid, changes: TagChanges) -> RepoResult<TagWithStats> {
        let mut tag = ETag::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepoError::NotFound)?;
        changes.apply(&mut tag);

        let tag = ATag::from(tag).reset_all().update(self.db.as_ref()).await?;
        self.one_with_count(tag).await
    }

    async fn delete(&self, id: Uuid) -> RepoResult<TagWithStats> {
        let tag = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;

        let res = ETag::delete_by_id(id).exec(self.db.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(tag)
    }
}
