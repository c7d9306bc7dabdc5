/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use entity::task::{Priority, TaskStatus};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::{ProjectService, ServiceError, ServiceResult, TaskService};
use crate::consts::*;
use crate::repositories::{PageRequest, ProjectWithStats, TaskFilters, TaskWithRelations};

#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    #[error("AI service is not configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Decode(String),
    #[error("model returned an empty completion")]
    Empty,
}

fn map_reqwest_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::Transport(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(format!("Unknown chat role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Chat message as received from a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessageInput {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Client for any OpenAI compatible `chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("workmind/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String, AiError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "completion request failed");
            return Err(AiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response = res
            .json::<CompletionResponse>()
            .await
            .map_err(|e| AiError::Decode(e.to_string()))?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl SummaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryPeriod::Daily => "daily",
            SummaryPeriod::Weekly => "weekly",
            SummaryPeriod::Monthly => "monthly",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            SummaryPeriod::Daily => "day",
            SummaryPeriod::Weekly => "week",
            SummaryPeriod::Monthly => "month",
        }
    }

    pub fn parse(value: Option<&str>) -> ServiceResult<Self> {
        value
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                ServiceError::Invalid("Valid period is required (daily, weekly, monthly)".to_string())
            })
    }
}

impl fmt::Display for SummaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(SummaryPeriod::Daily),
            "weekly" => Ok(SummaryPeriod::Weekly),
            "monthly" => Ok(SummaryPeriod::Monthly),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub summary: String,
    pub period: SummaryPeriod,
    pub task_count: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionContext {
    pub recent_task_count: usize,
    pub active_project_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestions {
    pub suggestions: String,
    pub generated_at: DateTime<Utc>,
    pub context: SuggestionContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub analysis: String,
    pub days: i64,
    pub task_count: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityReview {
    pub priorities: String,
    pub task_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Compact view of a task handed to the model.
#[derive(Debug, Serialize)]
struct TaskDigest<'a> {
    title: &'a str,
    status: TaskStatus,
    priority: Priority,
    duration: Option<i32>,
    project: Option<&'a str>,
    tags: Vec<&'a str>,
}

impl<'a> From<&'a TaskWithRelations> for TaskDigest<'a> {
    fn from(task: &'a TaskWithRelations) -> Self {
        Self {
            title: &task.task.title,
            status: task.task.status,
            priority: task.task.priority,
            duration: task.task.duration,
            project: task.project.as_ref().map(|p| p.name.as_str()),
            tags: task.tags.iter().map(|t| t.name.as_str()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDigest<'a> {
    name: &'a str,
    description: Option<&'a str>,
    task_count: u64,
}

fn to_json<T: Serialize>(value: &T) -> ServiceResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AiError::Decode(e.to_string()).into())
}

fn digest(tasks: &[TaskWithRelations]) -> ServiceResult<String> {
    to_json(&tasks.iter().map(TaskDigest::from).collect::<Vec<_>>())
}

fn summary_prompt(tasks: &[TaskWithRelations], period: SummaryPeriod) -> ServiceResult<String> {
    Ok(format!(
        "Generate a comprehensive {period} work summary based on the following tasks:

{tasks}

Please provide:
1. Overview of completed tasks
2. Time spent analysis
3. Productivity insights
4. Areas for improvement
5. Recommendations for next {unit}

Format the response in a clear, professional manner with bullet points and sections.",
        period = period,
        tasks = digest(tasks)?,
        unit = period.unit(),
    ))
}

fn suggestions_prompt(
    tasks: &[TaskWithRelations],
    projects: &[ProjectWithStats],
) -> ServiceResult<String> {
    let recent = &tasks[..tasks.len().min(SUGGESTION_PROMPT_TASKS)];
    let projects = projects
        .iter()
        .map(|p| ProjectDigest {
            name: &p.project.name,
            description: p.project.description.as_deref(),
            task_count: p.task_count,
        })
        .collect::<Vec<_>>();

    Ok(format!(
        "Based on the user's recent work patterns and projects, suggest 3-5 relevant tasks they might want to work on:

Recent Tasks:
{tasks}

Active Projects:
{projects}

Please suggest tasks that are:
1. Relevant to their current projects
2. Follow logical work progression
3. Consider priority and deadlines
4. Are actionable and specific

Format each suggestion as:
- Title: [Task title]
- Project: [Project name if applicable]
- Priority: [High/Medium/Low]
- Reason: [Why this task is suggested]",
        tasks = digest(recent)?,
        projects = to_json(&projects)?,
    ))
}

fn patterns_prompt(tasks: &[TaskWithRelations], days: i64) -> ServiceResult<String> {
    Ok(format!(
        "Analyze the following work patterns and provide insights:

Tasks from the last {days} days:
{tasks}

Please analyze:
1. Most productive time periods
2. Task completion patterns
3. Project focus areas
4. Potential bottlenecks
5. Recommendations for optimization

Provide actionable insights in a structured format.",
        days = days,
        tasks = to_json(&tasks)?,
    ))
}

fn priorities_prompt(tasks: &[TaskWithRelations]) -> ServiceResult<String> {
    Ok(format!(
        "Review these tasks and suggest priority adjustments:

{tasks}

Consider:
1. Deadlines and urgency
2. Project dependencies
3. Task complexity and duration
4. Business impact

Suggest which tasks should be:
- High priority (urgent and important)
- Medium priority (important but not urgent)
- Low priority (nice to have)

Explain your reasoning for each suggestion.",
        tasks = to_json(&tasks)?,
    ))
}

/// Validates client supplied chat history.
pub fn parse_chat_messages(messages: Option<Vec<ChatMessageInput>>) -> ServiceResult<Vec<ChatMessage>> {
    let messages = messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ServiceError::Invalid("Messages array is required".to_string()))?;

    messages
        .into_iter()
        .map(|message| {
            let role = message.role.as_deref().and_then(|r| r.parse::<ChatRole>().ok());
            let content = message.content.filter(|c| !c.is_empty());

            match (role, content) {
                (Some(role), Some(content)) => Ok(ChatMessage { role, content }),
                _ => Err(ServiceError::Invalid("Invalid message format".to_string())),
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct AiService {
    model: Option<Arc<dyn CompletionModel>>,
    tasks: TaskService,
    projects: ProjectService,
}

impl AiService {
    pub fn new(
        model: Option<Arc<dyn CompletionModel>>,
        tasks: TaskService,
        projects: ProjectService,
    ) -> Self {
        Self {
            model,
            tasks,
            projects,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> ServiceResult<String> {
        let model = self.model.as_ref().ok_or(AiError::NotConfigured)?;

        let started = std::time::Instant::now();
        let text = model.complete(messages, max_tokens).await?;
        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "completion finished");

        Ok(text)
    }

    async fn prompt(&self, prompt: String, max_tokens: u32) -> ServiceResult<String> {
        self.complete(vec![ChatMessage::user(prompt)], max_tokens).await
    }

    async fn collect_tasks(&self, filters: TaskFilters) -> ServiceResult<Vec<TaskWithRelations>> {
        let page = PageRequest {
            page: DEFAULT_PAGE,
            limit: MAX_PAGE_SIZE,
        };

        Ok(self.tasks.get_tasks_by_filters(filters, page).await?.data)
    }

    pub async fn summary(
        &self,
        user_id: &str,
        period: SummaryPeriod,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> ServiceResult<TaskSummary> {
        let mut filters = TaskFilters::for_user(user_id);
        filters.start_date = start_date;
        filters.end_date = end_date;

        let tasks = self.collect_tasks(filters).await?;
        if tasks.is_empty() {
            return Ok(TaskSummary {
                summary: EMPTY_SUMMARY.to_string(),
                period,
                task_count: 0,
                generated_at: Utc::now(),
            });
        }

        let summary = self
            .prompt(summary_prompt(&tasks, period)?, SUMMARY_MAX_TOKENS)
            .await?;

        Ok(TaskSummary {
            summary,
            period,
            task_count: tasks.len(),
            generated_at: Utc::now(),
        })
    }

    pub async fn suggestions(&self, user_id: &str) -> ServiceResult<TaskSuggestions> {
        let page = PageRequest {
            page: DEFAULT_PAGE,
            limit: SUGGESTION_TASK_WINDOW,
        };

        let (recent, projects) = futures::try_join!(
            self.tasks
                .get_tasks_by_filters(TaskFilters::for_user(user_id), page),
            self.projects.get_active_user_projects(user_id),
        )?;

        let suggestions = self
            .prompt(
                suggestions_prompt(&recent.data, &projects)?,
                SUGGESTIONS_MAX_TOKENS,
            )
            .await?;

        Ok(TaskSuggestions {
            suggestions,
            generated_at: Utc::now(),
            context: SuggestionContext {
                recent_task_count: recent.data.len(),
                active_project_count: projects.len(),
            },
        })
    }

    pub async fn chat(&self, user_id: &str, messages: Vec<ChatMessage>) -> ServiceResult<ChatReply> {
        if messages.is_empty() {
            return Err(ServiceError::Invalid("Messages array is required".to_string()));
        }

        tracing::debug!(user = %user_id, messages = messages.len(), "chat completion");

        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        conversation.extend(messages);

        let reply = self.complete(conversation, CHAT_MAX_TOKENS).await?;
        Ok(ChatReply {
            reply,
            generated_at: Utc::now(),
        })
    }

    pub async fn work_patterns(&self, user_id: &str, days: Option<i64>) -> ServiceResult<PatternAnalysis> {
        let days = days.unwrap_or(DEFAULT_PATTERN_DAYS);
        if days <= 0 {
            return Err(ServiceError::Invalid("days must be greater than zero".to_string()));
        }

        let since = ChronoDuration::try_days(days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| ServiceError::Invalid(format!("days value {} is out of range", days)))?;

        let mut filters = TaskFilters::for_user(user_id);
        filters.start_date = Some(since.naive_utc());

        let tasks = self.collect_tasks(filters).await?;
        let analysis = if tasks.is_empty() {
            EMPTY_PATTERNS.to_string()
        } else {
            self.prompt(patterns_prompt(&tasks, days)?, PATTERNS_MAX_TOKENS)
                .await?
        };

        Ok(PatternAnalysis {
            analysis,
            days,
            task_count: tasks.len(),
            generated_at: Utc::now(),
        })
    }

    /// Reviews the priorities of every pending or in-progress task.
    pub async fn priorities(&self, user_id: &str) -> ServiceResult<PriorityReview> {
        let mut tasks = Vec::new();
        for status in [TaskStatus::InProgress, TaskStatus::Pending] {
            let mut filters = TaskFilters::for_user(user_id);
            filters.status = Some(status);
            tasks.extend(self.collect_tasks(filters).await?);
        }

        let priorities = if tasks.is_empty() {
            EMPTY_PRIORITIES.to_string()
        } else {
            self.prompt(priorities_prompt(&tasks)?, PRIORITIES_MAX_TOKENS)
                .await?
        };

        Ok(PriorityReview {
            priorities,
            task_count: tasks.len(),
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_period_parse() {
        assert_eq!(SummaryPeriod::parse(Some("weekly")).unwrap(), SummaryPeriod::Weekly);
        assert_eq!(SummaryPeriod::Monthly.unit(), "month");

        let err = SummaryPeriod::parse(Some("yearly")).unwrap_err();
        assert_eq!(err.to_string(), "Valid period is required (daily, weekly, monthly)");
        assert!(SummaryPeriod::parse(None).is_err());
    }

    #[test]
    fn test_parse_chat_messages() {
        let messages = parse_chat_messages(Some(vec![ChatMessageInput {
            role: Some("user".to_string()),
            content: Some("How do I focus?".to_string()),
        }]))
        .unwrap();
        assert_eq!(messages, vec![ChatMessage::user("How do I focus?")]);

        let err = parse_chat_messages(Some(vec![])).unwrap_err();
        assert_eq!(err.to_string(), "Messages array is required");

        let err = parse_chat_messages(Some(vec![ChatMessageInput {
            role: Some("robot".to_string()),
            content: Some("beep".to_string()),
        }]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid message format");

        let err = parse_chat_messages(Some(vec![ChatMessageInput {
            role: Some("user".to_string()),
            content: None,
        }]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid message format");
    }

    #[test]
    fn test_chat_message_wire_format() {
        let json = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "system", "content": "hi" }));
    }

    #[test]
    fn test_completion_response_decodes() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Done"}}]}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Done"));
    }

    #[test]
    fn test_openai_client_trims_base_url() {
        let client = OpenAiClient::new(
            "key".to_string(),
            "http://localhost:9000/v1/",
            DEFAULT_AI_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.base_url, "http://localhost:9000/v1");
        assert_eq!(client.model(), "gpt-3.5-turbo");
    }
}
