/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TaskTag::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TaskTag::Task).uuid().not_null())
                    .col(ColumnDef::new(TaskTag::Tag).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-task_tag-task")
                            .from(TaskTag::Table, TaskTag::Task)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-task_tag-tag")
                            .from(TaskTag::Table, TaskTag::Tag)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-task_tag-task-tag")
                    .table(TaskTag::Table)
                    .col(TaskTag::Task)
                    .col(TaskTag::Tag)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskTag::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TaskTag {
    Table,
    Id,
    Task,
    Tag,
}

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Tag {
    Table,
    Id,
}
