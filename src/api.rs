use chrono::NaiveDate;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    Goal, GoalStatus, GoalUpdate, Insight, JournalEntry, JournalEntryUpdate, NewGoal,
    NewJournalEntry, NewReflection, Reflection, ScheduledTask, TaskDraft, TaskUpdate, UserStats,
};
use crate::session::Session;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Message used when the server fails without saying why
pub const GENERIC_FAILURE: &str = "API request failed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{GENERIC_FAILURE} (HTTP {status}, unreadable error body)")]
    UnreadableError { status: u16 },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

/// Turn a non-success response body into an error.
///
/// A JSON body with an `error` string is a server-reported failure. A JSON
/// body without one falls back to the generic message. Anything that is not
/// JSON at all is reported separately, since nothing the server said could be read.
pub fn error_from_body(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => {
            let message = value
                .get("error")
                .and_then(|e| e.as_str())
                .filter(|e| !e.is_empty())
                .unwrap_or(GENERIC_FAILURE)
                .to_string();
            ApiError::Server { status, message }
        }
        Err(_) => ApiError::UnreadableError { status },
    }
}

/// Every remote operation the client uses, one per (entity, operation) pair.
///
/// Implementations perform no retries; a failure is returned to the caller once.
#[allow(async_fn_in_trait)]
pub trait ReflectApi {
    // Reflections
    async fn upsert_reflection(&self, session: &Session, reflection: &NewReflection) -> Result<Reflection, ApiError>;
    async fn reflection_for_date(&self, session: &Session, date: NaiveDate) -> Result<Option<Reflection>, ApiError>;
    async fn reflections_in_range(&self, session: &Session, start: NaiveDate, end: NaiveDate) -> Result<Vec<Reflection>, ApiError>;

    // Journal entries
    async fn create_journal_entry(&self, session: &Session, entry: &NewJournalEntry) -> Result<JournalEntry, ApiError>;
    async fn journal_entries_for_date(&self, session: &Session, date: NaiveDate) -> Result<Vec<JournalEntry>, ApiError>;
    async fn all_journal_entries(&self, session: &Session) -> Result<Vec<JournalEntry>, ApiError>;
    async fn update_journal_entry(&self, session: &Session, id: i64, update: &JournalEntryUpdate) -> Result<JournalEntry, ApiError>;
    async fn delete_journal_entry(&self, session: &Session, id: i64) -> Result<(), ApiError>;

    // Goals
    async fn create_goal(&self, session: &Session, goal: &NewGoal) -> Result<Goal, ApiError>;
    async fn goals(&self, session: &Session, status: Option<GoalStatus>) -> Result<Vec<Goal>, ApiError>;
    async fn update_goal(&self, session: &Session, id: i64, update: &GoalUpdate) -> Result<Goal, ApiError>;
    async fn delete_goal(&self, session: &Session, id: i64) -> Result<(), ApiError>;

    // Scheduled tasks
    async fn create_scheduled_task(&self, session: &Session, task: &TaskDraft) -> Result<ScheduledTask, ApiError>;
    async fn scheduled_tasks(&self, session: &Session, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduledTask>, ApiError>;
    async fn update_scheduled_task<U: Serialize + Sync>(&self, session: &Session, id: i64, update: &U) -> Result<ScheduledTask, ApiError>;
    async fn delete_scheduled_task(&self, session: &Session, id: i64) -> Result<(), ApiError>;

    // Derived data
    async fn stats(&self, session: &Session) -> Result<UserStats, ApiError>;
    async fn morning_insights(&self, session: &Session) -> Result<Vec<Insight>, ApiError>;
}

/// `ReflectApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        log::debug!("{} {}{}", method, self.base_url, path);
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(USER_ID_HEADER, session.header_value())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            log::warn!("request failed: {}", err);
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// For endpoints whose success body is only an acknowledgement message
    async fn send_ack(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }
}

impl ReflectApi for HttpClient {
    async fn upsert_reflection(&self, session: &Session, reflection: &NewReflection) -> Result<Reflection, ApiError> {
        self.send(self.request(Method::POST, "/reflections", session).json(reflection)).await
    }

    async fn reflection_for_date(&self, session: &Session, date: NaiveDate) -> Result<Option<Reflection>, ApiError> {
        let request = self
            .request(Method::GET, "/reflections", session)
            .query(&[("date", date.to_string())]);
        self.send(request).await
    }

    async fn reflections_in_range(&self, session: &Session, start: NaiveDate, end: NaiveDate) -> Result<Vec<Reflection>, ApiError> {
        let request = self
            .request(Method::GET, "/reflections", session)
            .query(&[("start", start.to_string()), ("end", end.to_string())]);
        self.send(request).await
    }

    async fn create_journal_entry(&self, session: &Session, entry: &NewJournalEntry) -> Result<JournalEntry, ApiError> {
        self.send(self.request(Method::POST, "/journal-entries", session).json(entry)).await
    }

    async fn journal_entries_for_date(&self, session: &Session, date: NaiveDate) -> Result<Vec<JournalEntry>, ApiError> {
        let request = self
            .request(Method::GET, "/journal-entries", session)
            .query(&[("date", date.to_string())]);
        self.send(request).await
    }

    async fn all_journal_entries(&self, session: &Session) -> Result<Vec<JournalEntry>, ApiError> {
        self.send(self.request(Method::GET, "/journal-entries", session)).await
    }

    async fn update_journal_entry(&self, session: &Session, id: i64, update: &JournalEntryUpdate) -> Result<JournalEntry, ApiError> {
        let path = format!("/journal-entries/{}", id);
        self.send(self.request(Method::PATCH, &path, session).json(update)).await
    }

    async fn delete_journal_entry(&self, session: &Session, id: i64) -> Result<(), ApiError> {
        let path = format!("/journal-entries/{}", id);
        self.send_ack(self.request(Method::DELETE, &path, session)).await
    }

    async fn create_goal(&self, session: &Session, goal: &NewGoal) -> Result<Goal, ApiError> {
        self.send(self.request(Method::POST, "/goals", session).json(goal)).await
    }

    async fn goals(&self, session: &Session, status: Option<GoalStatus>) -> Result<Vec<Goal>, ApiError> {
        let mut request = self.request(Method::GET, "/goals", session);
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        self.send(request).await
    }

    async fn update_goal(&self, session: &Session, id: i64, update: &GoalUpdate) -> Result<Goal, ApiError> {
        let path = format!("/goals/{}", id);
        self.send(self.request(Method::PATCH, &path, session).json(update)).await
    }

    async fn delete_goal(&self, session: &Session, id: i64) -> Result<(), ApiError> {
        let path = format!("/goals/{}", id);
        self.send_ack(self.request(Method::DELETE, &path, session)).await
    }

    async fn create_scheduled_task(&self, session: &Session, task: &TaskDraft) -> Result<ScheduledTask, ApiError> {
        self.send(self.request(Method::POST, "/scheduled-tasks", session).json(task)).await
    }

    async fn scheduled_tasks(&self, session: &Session, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduledTask>, ApiError> {
        let request = self
            .request(Method::GET, "/scheduled-tasks", session)
            .query(&[("start_date", start.to_string()), ("end_date", end.to_string())]);
        self.send(request).await
    }

    async fn update_scheduled_task<U: Serialize + Sync>(&self, session: &Session, id: i64, update: &U) -> Result<ScheduledTask, ApiError> {
        let path = format!("/scheduled-tasks/{}", id);
        self.send(self.request(Method::PATCH, &path, session).json(update)).await
    }

    async fn delete_scheduled_task(&self, session: &Session, id: i64) -> Result<(), ApiError> {
        let path = format!("/scheduled-tasks/{}", id);
        self.send_ack(self.request(Method::DELETE, &path, session)).await
    }

    async fn stats(&self, session: &Session) -> Result<UserStats, ApiError> {
        self.send(self.request(Method::GET, "/stats", session)).await
    }

    async fn morning_insights(&self, session: &Session) -> Result<Vec<Insight>, ApiError> {
        self.send(self.request(Method::GET, "/insights/morning", session)).await
    }
}

/// Convenience used by the task container: a completion toggle body
pub fn completion_update(is_completed: bool) -> TaskUpdate {
    TaskUpdate {
        is_completed: Some(is_completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_message_is_used() {
        let err = error_from_body(404, br#"{"error": "Goal not found"}"#);
        assert!(matches!(err, ApiError::Server { status: 404, .. }));
        assert_eq!(err.to_string(), "Goal not found");
    }

    #[test]
    fn missing_error_field_falls_back_to_generic_message() {
        let err = error_from_body(500, br#"{"detail": "boom"}"#);
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn unparseable_body_is_distinct() {
        let err = error_from_body(502, b"<html>Bad Gateway</html>");
        assert!(matches!(err, ApiError::UnreadableError { status: 502 }));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpClient::new("http://localhost:5000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }
}
