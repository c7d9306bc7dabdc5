/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod project;
pub mod tag;
pub mod task;
pub mod task_tag;
pub mod user;
