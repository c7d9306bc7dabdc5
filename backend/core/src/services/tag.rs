/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, ensure_owner, require_fields};
use crate::consts::{DEFAULT_POPULAR_TAGS, MAX_PAGE_SIZE};
use crate::input::sanitize;
use crate::repositories::{NewTag, RepoError, Repositories, TagChanges, TagRepository, TagWithStats};

#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

fn conflict(err: RepoError) -> ServiceError {
    match err {
        RepoError::Duplicate => ServiceError::Conflict("Tag already exists".to_string()),
        err => err.into(),
    }
}

impl TagService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            tags: Arc::clone(&repositories.tags),
        }
    }

    pub async fn create_tag(
        &self,
        name: Option<String>,
        color: Option<String>,
        user_id: Option<String>,
    ) -> ServiceResult<TagWithStats> {
        let name = sanitize(name);
        let user_id = sanitize(user_id);
        require_fields(&[("name", name.as_deref()), ("userId", user_id.as_deref())])?;

        self.tags
            .create(NewTag {
                name: name.unwrap_or_default(),
                color: sanitize(color),
                user_id: user_id.unwrap_or_default(),
            })
            .await
            .map_err(conflict)
    }

    pub async fn get_tag_by_id(&self, id: Uuid, user_id: &str) -> ServiceResult<TagWithStats> {
        let tag = self
            .tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tag"))?;

        ensure_owner(&tag.tag.user_id, user_id)?;
        Ok(tag)
    }

    pub async fn list_tags(&self, user_id: &str) -> ServiceResult<Vec<TagWithStats>> {
        require_fields(&[("userId", Some(user_id))])?;
        Ok(self.tags.find_by_user(user_id).await?)
    }

    pub async fn popular_tags(&self, user_id: &str, limit: Option<u64>) -> ServiceResult<Vec<TagWithStats>> {
        require_fields(&[("userId", Some(user_id))])?;

        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_POPULAR_TAGS)
            .min(MAX_PAGE_SIZE);
        Ok(self.tags.find_popular(user_id, limit).await?)
    }

    /// Returns the user's tag of that name, creating it first if needed.
    pub async fn find_or_create_tag(
        &self,
        name: &str,
        color: Option<String>,
        user_id: &str,
    ) -> ServiceResult<TagWithStats> {
        let name = name.trim();
        require_fields(&[("name", Some(name)), ("userId", Some(user_id))])?;

        if let Some(tag) = self.tags.find_by_name(user_id, name).await? {
            return Ok(tag);
        }

        match self
            .create_tag(Some(name.to_string()), color, Some(user_id.to_string()))
            .await
        {
            // Lost a race against a concurrent insert of the same name.
            Err(ServiceError::Conflict(_)) => self
                .tags
                .find_by_name(user_id, name)
                .await?
                .ok_or_else(|| ServiceError::not_found("Tag")),
            res => res,
        }
    }

    pub async fn update_tag(&self, id: Uuid, changes: TagChanges, user_id: &str) -> ServiceResult<TagWithStats> {
        self.get_tag_by_id(id, user_id).await?;

        let changes = TagChanges {
            name: sanitize(changes.name),
            color: sanitize(changes.color),
        };

        self.tags.update(id, changes).await.map_err(conflict)
    }

    pub async fn delete_tag(&self, id: Uuid, user_id: &str) -> ServiceResult<TagWithStats> {
        self.get_tag_by_id(id, user_id).await?;
        Ok(self.tags.delete(id).await?)
    }
}
