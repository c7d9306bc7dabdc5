/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use common::*;
use entity::task::{Priority, TaskStatus};
use uuid::Uuid;
use workmind::input::validate_pagination;
use workmind::repositories::{PageRequest, TaskChanges, TaskFilters};
use workmind::services::{ServiceError, TaskInput};

#[tokio::test]
async fn test_create_task_defaults() {
    let state = create_mock_state(None);

    let task = state
        .tasks
        .create_task(task_input("  Write spec ", "u1"))
        .await
        .unwrap();

    assert_eq!(task.task.title, "Write spec");
    assert_eq!(task.task.user_id, "u1");
    assert_eq!(task.task.status, TaskStatus::Pending);
    assert_eq!(task.task.priority, Priority::Medium);
    assert_eq!(task.task.duration, None);
    assert!(task.project.is_none());
    assert!(task.tags.is_empty());
}

#[tokio::test]
async fn test_create_task_missing_fields() {
    let state = create_mock_state(None);

    let err = state
        .tasks
        .create_task(TaskInput {
            title: Some("   ".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::MissingFields(_)));
    assert_eq!(err.to_string(), "Missing required fields: title, userId");
}

#[tokio::test]
async fn test_create_task_computes_duration() {
    let state = create_mock_state(None);

    let task = state
        .tasks
        .create_task(TaskInput {
            start_time: Some(at("2024-01-01 09:00:00")),
            end_time: Some(at("2024-01-01 10:30:30")),
            duration: Some(5),
            ..task_input("Review", "u1")
        })
        .await
        .unwrap();

    assert_eq!(task.task.duration, Some(91));
}

#[tokio::test]
async fn test_create_task_rejects_overlong_span() {
    let state = create_mock_state(None);

    let err = state
        .tasks
        .create_task(TaskInput {
            start_time: Some(at("0001-01-01 00:00:00")),
            end_time: Some(at("9999-12-31 00:00:00")),
            ..task_input("Forever", "u1")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));

    let task = state
        .tasks
        .create_task(task_input("Open", "u1"))
        .await
        .unwrap();
    let err = state
        .tasks
        .update_task(
            task.task.id,
            TaskChanges {
                start_time: Some(at("0001-01-01 00:00:00")),
                end_time: Some(at("9999-12-31 00:00:00")),
                ..Default::default()
            },
            "u1",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));

    let task = state.tasks.get_task_by_id(task.task.id, "u1").await.unwrap();
    assert_eq!(task.task.start_time, None);
    assert_eq!(task.task.duration, None);
}

#[tokio::test]
async fn test_create_task_keeps_duration_without_both_times() {
    let state = create_mock_state(None);

    let task = state
        .tasks
        .create_task(TaskInput {
            start_time: Some(at("2024-01-01 09:00:00")),
            duration: Some(25),
            ..task_input("Estimate", "u1")
        })
        .await
        .unwrap();

    assert_eq!(task.task.duration, Some(25));
}

#[tokio::test]
async fn test_create_task_checks_project() {
    let state = create_mock_state(None);
    let foreign = state
        .projects
        .create_project(project_input("Theirs", "u2"))
        .await
        .unwrap();

    let err = state
        .tasks
        .create_task(TaskInput {
            project_id: Some(foreign.project.id),
            ..task_input("Sneaky", "u1")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied));

    let err = state
        .tasks
        .create_task(TaskInput {
            project_id: Some(Uuid::new_v4()),
            ..task_input("Orphan", "u1")
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Project not found");
}

#[tokio::test]
async fn test_create_task_with_project_and_tags() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Website", "u1"))
        .await
        .unwrap();
    let tag = state
        .tags
        .create_tag(Some("frontend".into()), Some("#00f".into()), Some("u1".into()))
        .await
        .unwrap();

    let task = state
        .tasks
        .create_task(TaskInput {
            project_id: Some(project.project.id),
            tag_ids: Some(vec![tag.tag.id]),
            ..task_input("Landing page", "u1")
        })
        .await
        .unwrap();

    assert_eq!(task.project.as_ref().map(|p| p.name.as_str()), Some("Website"));
    assert_eq!(task.tags.len(), 1);
    assert_eq!(task.tags[0].name, "frontend");

    let missing = Uuid::new_v4();
    let err = state
        .tasks
        .create_task(TaskInput {
            tag_ids: Some(vec![missing]),
            ..task_input("Broken", "u1")
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), format!("Tag with id {} not found", missing));
}

#[tokio::test]
async fn test_get_task_enforces_ownership() {
    let state = create_mock_state(None);
    let task = state
        .tasks
        .create_task(task_input("Private", "u1"))
        .await
        .unwrap();

    let err = state
        .tasks
        .get_task_by_id(task.task.id, "u2")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied));

    let err = state
        .tasks
        .get_task_by_id(Uuid::new_v4(), "u1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Task not found");
}

#[tokio::test]
async fn test_update_task_is_partial() {
    let state = create_mock_state(None);
    let tag = state
        .tags
        .create_tag(Some("ops".into()), None, Some("u1".into()))
        .await
        .unwrap();
    let task = state
        .tasks
        .create_task(TaskInput {
            description: Some("keep me".into()),
            start_time: Some(at("2024-01-01 09:00:00")),
            ..task_input("Deploy", "u1")
        })
        .await
        .unwrap();

    let updated = state
        .tasks
        .update_task(
            task.task.id,
            TaskChanges {
                priority: Some(Priority::Urgent),
                end_time: Some(at("2024-01-01 09:45:00")),
                tag_ids: Some(vec![tag.tag.id]),
                ..Default::default()
            },
            "u1",
        )
        .await
        .unwrap();

    assert_eq!(updated.task.title, "Deploy");
    assert_eq!(updated.task.description.as_deref(), Some("keep me"));
    assert_eq!(updated.task.priority, Priority::Urgent);
    assert_eq!(updated.task.duration, Some(45));
    assert_eq!(updated.tags.len(), 1);

    let cleared = state
        .tasks
        .update_task(
            task.task.id,
            TaskChanges {
                tag_ids: Some(vec![]),
                ..Default::default()
            },
            "u1",
        )
        .await
        .unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test]
async fn test_update_task_rejects_other_user() {
    let state = create_mock_state(None);
    let task = state
        .tasks
        .create_task(task_input("Mine", "u1"))
        .await
        .unwrap();

    let err = state
        .tasks
        .update_task(
            task.task.id,
            TaskChanges {
                title: Some("Yours".into()),
                ..Default::default()
            },
            "u2",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied));

    let unchanged = state.tasks.get_task_by_id(task.task.id, "u1").await.unwrap();
    assert_eq!(unchanged.task.title, "Mine");
}

#[tokio::test]
async fn test_status_transitions() {
    let state = create_mock_state(None);
    let task = state
        .tasks
        .create_task(task_input("Focus", "u1"))
        .await
        .unwrap();

    let completed = state
        .tasks
        .update_task_status(task.task.id, TaskStatus::Completed, "u1")
        .await
        .unwrap();
    assert_eq!(completed.task.status, TaskStatus::Completed);
    assert_eq!(completed.task.end_time, None);
    assert_eq!(completed.task.duration, None);

    let started = state
        .tasks
        .update_task_status(task.task.id, TaskStatus::InProgress, "u1")
        .await
        .unwrap();
    let start_time = started.task.start_time.unwrap();

    let restarted = state
        .tasks
        .update_task_status(task.task.id, TaskStatus::InProgress, "u1")
        .await
        .unwrap();
    assert_eq!(restarted.task.start_time, Some(start_time));

    let done = state
        .tasks
        .update_task_status(task.task.id, TaskStatus::Completed, "u1")
        .await
        .unwrap();
    assert!(done.task.end_time.is_some());
    assert_eq!(done.task.duration, Some(0));
}

#[tokio::test]
async fn test_delete_task() {
    let state = create_mock_state(None);
    let task = state
        .tasks
        .create_task(task_input("Temporary", "u1"))
        .await
        .unwrap();

    let err = state.tasks.delete_task(task.task.id, "u2").await.unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied));

    let deleted = state.tasks.delete_task(task.task.id, "u1").await.unwrap();
    assert_eq!(deleted.task.id, task.task.id);

    let err = state
        .tasks
        .get_task_by_id(task.task.id, "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_pagination() {
    let state = create_mock_state(None);
    for i in 0..25 {
        state
            .tasks
            .create_task(task_input(&format!("task {}", i), "u1"))
            .await
            .unwrap();
    }
    state
        .tasks
        .create_task(task_input("someone else", "u2"))
        .await
        .unwrap();

    let page = state
        .tasks
        .get_tasks_by_filters(TaskFilters::for_user("u1"), PageRequest { page: 2, limit: 10 })
        .await
        .unwrap();
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);

    let last = state
        .tasks
        .get_tasks_by_filters(TaskFilters::for_user("u1"), PageRequest { page: 3, limit: 10 })
        .await
        .unwrap();
    assert_eq!(last.data.len(), 5);

    let beyond = state
        .tasks
        .get_tasks_by_filters(TaskFilters::for_user("u1"), PageRequest { page: 4, limit: 10 })
        .await
        .unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total, 25);
}

#[tokio::test]
async fn test_pagination_huge_page() {
    let state = create_mock_state(None);
    state
        .tasks
        .create_task(task_input("only", "u1"))
        .await
        .unwrap();

    let page = state
        .tasks
        .get_tasks_by_filters(
            TaskFilters::for_user("u1"),
            validate_pagination(Some(i64::MAX), Some(100)),
        )
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 1);

    let page = state
        .tasks
        .get_tasks_by_filters(TaskFilters::for_user("u1"), PageRequest { page: u64::MAX, limit: 100 })
        .await
        .unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_filters_are_combined() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Docs", "u1"))
        .await
        .unwrap();

    state
        .tasks
        .create_task(TaskInput {
            priority: Some(Priority::High),
            project_id: Some(project.project.id),
            ..task_input("Write API guide", "u1")
        })
        .await
        .unwrap();
    state
        .tasks
        .create_task(TaskInput {
            priority: Some(Priority::Low),
            project_id: Some(project.project.id),
            ..task_input("Proofread api notes", "u1")
        })
        .await
        .unwrap();
    state
        .tasks
        .create_task(TaskInput {
            priority: Some(Priority::High),
            ..task_input("API outage review", "u1")
        })
        .await
        .unwrap();

    let mut filters = TaskFilters::for_user("u1");
    filters.search = Some("  api ".to_string());
    let page = state
        .tasks
        .get_tasks_by_filters(filters.clone(), PageRequest { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(page.total, 3);

    filters.priority = Some(Priority::High);
    filters.project_id = Some(project.project.id);
    let page = state
        .tasks
        .get_tasks_by_filters(filters, PageRequest { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].task.title, "Write API guide");
}

#[tokio::test]
async fn test_task_stats() {
    let state = create_mock_state(None);

    state
        .tasks
        .create_task(TaskInput {
            status: Some(TaskStatus::Completed),
            start_time: Some(at("2024-01-02 09:00:00")),
            end_time: Some(at("2024-01-02 10:00:00")),
            ..task_input("One hour", "u1")
        })
        .await
        .unwrap();
    state
        .tasks
        .create_task(TaskInput {
            status: Some(TaskStatus::Completed),
            start_time: Some(at("2024-01-03 09:00:00")),
            end_time: Some(at("2024-01-03 09:31:00")),
            ..task_input("Half hour", "u1")
        })
        .await
        .unwrap();
    state
        .tasks
        .create_task(TaskInput {
            status: Some(TaskStatus::InProgress),
            duration: Some(500),
            ..task_input("Running", "u1")
        })
        .await
        .unwrap();
    state
        .tasks
        .create_task(TaskInput {
            status: Some(TaskStatus::Canceled),
            ..task_input("Dropped", "u1")
        })
        .await
        .unwrap();

    let stats = state.tasks.get_task_stats("u1", None, None).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.canceled, 1);
    assert_eq!(stats.total_duration, 91);
    assert_eq!(stats.average_duration, 46);

    let ranged = state
        .tasks
        .get_task_stats("u1", Some(at("2024-01-03 00:00:00")), Some(at("2024-01-04 00:00:00")))
        .await
        .unwrap();
    assert_eq!(ranged.total, 1);
    assert_eq!(ranged.total_duration, 31);

    let one_sided = state
        .tasks
        .get_task_stats("u1", Some(at("2024-01-03 00:00:00")), None)
        .await
        .unwrap();
    assert_eq!(one_sided.total, 4);
}
