/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use common::*;
use entity::task::TaskStatus;
use workmind::repositories::ProjectChanges;
use workmind::services::{ProjectInput, ServiceError, TaskInput};

#[tokio::test]
async fn test_create_project() {
    let state = create_mock_state(None);

    let project = state
        .projects
        .create_project(ProjectInput {
            description: Some("  ".into()),
            color: Some("#123456".into()),
            ..project_input(" Website ", "u1")
        })
        .await
        .unwrap();

    assert_eq!(project.project.name, "Website");
    assert_eq!(project.project.description, None);
    assert_eq!(project.project.color.as_deref(), Some("#123456"));
    assert!(project.project.is_active);
    assert_eq!(project.task_count, 0);

    let err = state
        .projects
        .create_project(ProjectInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required fields: name, userId");
}

#[tokio::test]
async fn test_get_project_enforces_ownership() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Website", "u1"))
        .await
        .unwrap();

    let err = state
        .projects
        .get_project_by_id(project.project.id, "u2")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied));

    let err = state
        .projects
        .get_project_by_id(uuid::Uuid::new_v4(), "u1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Project not found");

    let found = state
        .projects
        .get_project_by_id(project.project.id, "u1")
        .await
        .unwrap();
    assert_eq!(found.project.name, "Website");
}

#[tokio::test]
async fn test_project_task_stats() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Website", "u1"))
        .await
        .unwrap();

    for status in [
        TaskStatus::Completed,
        TaskStatus::Completed,
        TaskStatus::InProgress,
        TaskStatus::Pending,
        TaskStatus::Canceled,
    ] {
        state
            .tasks
            .create_task(TaskInput {
                status: Some(status),
                project_id: Some(project.project.id),
                ..task_input("work", "u1")
            })
            .await
            .unwrap();
    }

    let project = state
        .projects
        .get_project_by_id(project.project.id, "u1")
        .await
        .unwrap();
    assert_eq!(project.task_count, 5);
    assert_eq!(project.task_stats.completed, 2);
    assert_eq!(project.task_stats.in_progress, 1);
    assert_eq!(project.task_stats.pending, 1);
}

#[tokio::test]
async fn test_delete_project_of_other_user() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Website", "u1"))
        .await
        .unwrap();

    let err = state
        .projects
        .delete_project(project.project.id, "u2")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied));

    assert!(
        state
            .projects
            .get_project_by_id(project.project.id, "u1")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_delete_project_keeps_tasks() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Website", "u1"))
        .await
        .unwrap();
    let task = state
        .tasks
        .create_task(TaskInput {
            project_id: Some(project.project.id),
            ..task_input("Survivor", "u1")
        })
        .await
        .unwrap();

    let deleted = state
        .projects
        .delete_project(project.project.id, "u1")
        .await
        .unwrap();
    assert_eq!(deleted.task_count, 1);

    let task = state.tasks.get_task_by_id(task.task.id, "u1").await.unwrap();
    assert_eq!(task.task.project_id, None);
    assert!(task.project.is_none());

    let err = state
        .projects
        .get_project_by_id(project.project.id, "u1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Project not found");
}

#[tokio::test]
async fn test_update_and_toggle_project() {
    let state = create_mock_state(None);
    let project = state
        .projects
        .create_project(project_input("Website", "u1"))
        .await
        .unwrap();
    state
        .projects
        .create_project(project_input("Blog", "u1"))
        .await
        .unwrap();

    let updated = state
        .projects
        .update_project(
            project.project.id,
            ProjectChanges {
                description: Some("Marketing site".into()),
                ..Default::default()
            },
            "u1",
        )
        .await
        .unwrap();
    assert_eq!(updated.project.name, "Website");
    assert_eq!(updated.project.description.as_deref(), Some("Marketing site"));

    let toggled = state
        .projects
        .toggle_project_status(project.project.id, "u1")
        .await
        .unwrap();
    assert!(!toggled.project.is_active);

    let active = state.projects.get_active_user_projects("u1").await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].project.name, "Blog");

    let all = state.projects.get_user_projects("u1", true).await.unwrap();
    assert_eq!(all.len(), 2);

    let toggled = state
        .projects
        .toggle_project_status(project.project.id, "u1")
        .await
        .unwrap();
    assert!(toggled.project.is_active);
}
