/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::ops::RangeInclusive;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit OFFSET.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

pub const DEFAULT_POPULAR_TAGS: u64 = 10;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";

pub const SUMMARY_MAX_TOKENS: u32 = 1000;
pub const SUGGESTIONS_MAX_TOKENS: u32 = 800;
pub const PATTERNS_MAX_TOKENS: u32 = 800;
pub const PRIORITIES_MAX_TOKENS: u32 = 600;
pub const CHAT_MAX_TOKENS: u32 = 500;

/// Recent tasks fetched as suggestion context.
pub const SUGGESTION_TASK_WINDOW: u64 = 20;
/// Recent tasks actually embedded into the suggestion prompt.
pub const SUGGESTION_PROMPT_TASKS: usize = 10;
pub const DEFAULT_PATTERN_DAYS: i64 = 30;

pub const EMPTY_SUMMARY: &str = "No tasks found for the specified period. Consider creating some tasks to track your productivity!";

pub const CHAT_SYSTEM_PROMPT: &str = "You are WorkMind AI, an intelligent assistant for productivity and task management.
You help users:
- Organize and prioritize their tasks
- Provide productivity insights
- Suggest improvements to their workflow
- Answer questions about time management and productivity

Be helpful, concise, and actionable in your responses. Focus on practical advice.";

pub const EMPTY_PATTERNS: &str = "No tasks found in this timeframe. Track a few tasks to get an analysis of your work patterns.";
pub const EMPTY_PRIORITIES: &str = "No open tasks to prioritize.";
