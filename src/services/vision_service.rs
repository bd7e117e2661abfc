//! Vision Service - suggests catalog fields from a photo of a book cover,
//! through an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::DomainError;
use crate::infrastructure::config::VisionConfig;

const PROMPT: &str = "You catalogue Jewish religious books for a bookstore. \
Read the cover or title page in the image (it is usually Hebrew, sometimes English) \
and answer with a JSON object with the keys title, author, publisher, description, \
language and isbn. Keep Hebrew text in Hebrew. Use null for anything you cannot read. \
The description is one or two sentences suitable for a product page.";

/// Fields read off a cover; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSuggestion {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub isbn: Option<String>,
}

pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, config }
    }

    pub async fn suggest_book_fields(
        &self,
        image: &[u8],
        mime: &str,
    ) -> Result<BookSuggestion, DomainError> {
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(image));
        let body = json!({
            "model": self.config.model,
            "response_format": { "type": "json_object" },
            "max_tokens": 800,
            "messages": [
                { "role": "system", "content": PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Identify this book." },
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ]
        });

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Vision request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Vision API answered {}: {}", status, detail);
            return Err(DomainError::External(format!(
                "Vision API answered {}",
                status
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| DomainError::External(format!("Invalid vision response: {}", e)))?;

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::External("Vision response had no content".to_string()))?;

        parse_suggestion(content)
    }
}

/// Model output to fields; tolerates a Markdown code fence around the JSON.
pub fn parse_suggestion(content: &str) -> Result<BookSuggestion, DomainError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let mut suggestion: BookSuggestion = serde_json::from_str(unfenced)
        .map_err(|e| DomainError::External(format!("Vision answer was not JSON: {}", e)))?;

    for field in [
        &mut suggestion.title,
        &mut suggestion.author,
        &mut suggestion.publisher,
        &mut suggestion.description,
        &mut suggestion.language,
        &mut suggestion.isbn,
    ] {
        if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
            *field = None;
        }
    }
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let content = "```json\n{\"title\": \"שולחן ערוך\", \"author\": \"\", \"isbn\": null}\n```";
        let suggestion = parse_suggestion(content).unwrap();
        assert_eq!(suggestion.title.as_deref(), Some("שולחן ערוך"));
        assert_eq!(suggestion.author, None);
        assert_eq!(suggestion.isbn, None);
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_suggestion("I think this is a siddur."),
            Err(DomainError::External(_))
        ));
    }
}
