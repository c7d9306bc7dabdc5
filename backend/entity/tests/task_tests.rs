/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for task entity

use chrono::NaiveDate;
use entity::task::{Priority, TaskStatus};
use entity::*;
use sea_orm::{DatabaseBackend, MockDatabase, entity::prelude::*};
use uuid::Uuid;

fn sample_task(id: Uuid, user_id: &str) -> task::Model {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();

    task::Model {
        id,
        title: "Write spec".to_owned(),
        description: Some("First draft".to_owned()),
        status: TaskStatus::Completed,
        priority: Priority::High,
        start_time: Some(start),
        end_time: Some(end),
        duration: Some(90),
        user_id: user_id.to_owned(),
        project_id: None,
        created_at: start,
        updated_at: end,
    }
}

#[tokio::test]
async fn test_task_entity_basic() -> Result<(), DbErr> {
    let task_id = Uuid::new_v4();
    let user_id = "u1";

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_task(task_id, user_id)]])
        .into_connection();

    let result = task::Entity::find_by_id(task_id).one(&db).await?;

    assert!(result.is_some());
    let task = result.unwrap();
    assert_eq!(task.title, "Write spec");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.duration, Some(90));
    assert_eq!(task.user_id, user_id);

    Ok(())
}

#[test]
fn test_task_serializes_camel_case() {
    let task = sample_task(Uuid::new_v4(), "u1");
    let json = serde_json::to_value(&task).unwrap();

    assert!(json.get("userId").is_some());
    assert!(json.get("projectId").is_some());
    assert!(json.get("startTime").is_some());
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["priority"], "HIGH");
}
