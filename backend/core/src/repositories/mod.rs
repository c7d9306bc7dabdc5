/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Persistence seam. Every repository is a trait with a sea-orm backed
//! implementation and an in-process one sharing [`MemoryStore`].

pub mod memory;
pub mod project;
pub mod tag;
pub mod task;

use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::sync::Arc;

use crate::types::DBConn;

pub use memory::MemoryStore;
pub use project::{
    NewProject, ProjectChanges, ProjectRepository, ProjectWithStats, SeaOrmProjectRepository,
    TaskStats,
};
pub use tag::{NewTag, SeaOrmTagRepository, TagChanges, TagRepository, TagWithStats};
pub use task::{
    NewTask, ProjectRef, SeaOrmTaskRepository, TagRef, TaskChanges, TaskFilters, TaskRepository,
    TaskWithRelations,
};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Record already exists")]
    Duplicate,
    #[error("Foreign key constraint failed")]
    ForeignKey,
    #[error("Record not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RepoError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => return RepoError::Duplicate,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return RepoError::ForeignKey,
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
            err => RepoError::Database(err),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

/// One slice of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }

    /// Cuts a page out of an already fully materialised, ordered list.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let data = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();

        Self::new(data, total, request.page, request.limit)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Clone)]
pub struct Repositories {
    pub tasks: Arc<dyn TaskRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub tags: Arc<dyn TagRepository>,
}

impl Repositories {
    pub fn from_database(db: DBConn) -> Self {
        Self {
            tasks: Arc::new(SeaOrmTaskRepository::new(Arc::clone(&db))),
            projects: Arc::new(SeaOrmProjectRepository::new(Arc::clone(&db))),
            tags: Arc::new(SeaOrmTagRepository::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());

        Self {
            tasks: store.clone(),
            projects: store.clone(),
            tags: store,
        }
    }
}
