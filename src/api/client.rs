use crate::api::models::{ChatReply, ChatRequest, FaqEntry};
use crate::error::ApiError;
use reqwest::Client as HttpClient;
use std::future::Future;

/// Something that can answer a chat message. The session only talks to the
/// backend through this.
pub trait ChatBackend {
    fn send_message(&self, text: String) -> impl Future<Output = Result<ChatReply, ApiError>> + 'static;
}

#[derive(Clone)]
pub struct ApiClient {
    pub http: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: crate::utils::normalize_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST `{base}/chat` with `{"message": text}`. Transport errors, bad
    /// statuses and non-JSON bodies come back as `Err`; JSON without a usable
    /// `response` is a reply with no text.
    pub async fn chat(&self, text: &str) -> Result<ChatReply, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("chat"))
            .json(&ChatRequest { message: text })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        let body = resp.json::<serde_json::Value>().await?;
        Ok(ChatReply::from_value(&body))
    }

    /// GET `{base}/faqs`. Never fails: a non-success status means there are no
    /// FAQs, anything else is logged and also yields an empty list.
    pub async fn faqs(&self) -> Vec<FaqEntry> {
        let resp = match self.http.get(self.endpoint("faqs")).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Failed to load FAQs: {}", e);
                return Vec::new();
            }
        };
        if !resp.status().is_success() {
            log::debug!("FAQ endpoint returned HTTP {}", resp.status());
            return Vec::new();
        }
        match resp.json::<Vec<FaqEntry>>().await {
            Ok(list) => list,
            Err(e) => {
                log::error!("Failed to decode FAQs: {}", e);
                Vec::new()
            }
        }
    }

    // The backend has no write endpoint for FAQs yet, so saving only validates.
    pub async fn save_faq(&self, entry: &FaqEntry) -> Result<(), ApiError> {
        if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
            return Err(ApiError::InvalidFaq);
        }
        log::info!("FAQ accepted locally (no write endpoint): {}", entry.question);
        Ok(())
    }
}

impl ChatBackend for ApiClient {
    fn send_message(&self, text: String) -> impl Future<Output = Result<ChatReply, ApiError>> + 'static {
        let client = self.clone();
        async move {
            crate::utils::run_on_runtime(async move { client.chat(&text).await })
                .await
                .map_err(|e| ApiError::Runtime(e.to_string()))?
        }
    }
}
