//! Filename suggestions from an OpenAI-compatible chat completions API.
//!
//! The suggester is an ordinary value: build one from [`ApiSettings`], clone
//! it into whatever task needs it. The rename engine never sees it; callers
//! feed its output to `RenameEngine::set_override`.

pub mod content;

use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::SuggestError;
use content::{UserContent, dotted_extension, user_prompt, validate_file};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5-nano";
const TOKEN_LIMIT: u32 = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

static RESERVED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("reserved character class is valid"));

/// Connection settings for the suggestion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ApiSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    fn is_official(&self) -> bool {
        self.endpoint.contains("api.openai.com")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenParam {
    MaxTokens,
    MaxCompletionTokens,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: UserContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

impl<'a> ChatRequest<'a> {
    fn new(settings: &'a ApiSettings, system: String, user: UserContent) -> Self {
        let mut request = Self {
            model: &settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: UserContent::Text(system),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            reasoning_effort: Some("low"),
            max_tokens: None,
            max_completion_tokens: None,
        };
        let param = if settings.is_official() {
            TokenParam::MaxCompletionTokens
        } else {
            TokenParam::MaxTokens
        };
        request.set_token_param(param);
        request
    }

    fn token_param(&self) -> TokenParam {
        if self.max_completion_tokens.is_some() {
            TokenParam::MaxCompletionTokens
        } else {
            TokenParam::MaxTokens
        }
    }

    fn set_token_param(&mut self, param: TokenParam) {
        let (max_tokens, max_completion_tokens) = match param {
            TokenParam::MaxTokens => (Some(TOKEN_LIMIT), None),
            TokenParam::MaxCompletionTokens => (None, Some(TOKEN_LIMIT)),
        };
        self.max_tokens = max_tokens;
        self.max_completion_tokens = max_completion_tokens;
    }

    /// Adjust the request after a 400 whose body names an unsupported
    /// parameter. Returns false when nothing could be changed.
    fn relax_for(&mut self, error_body: &str) -> bool {
        let body = error_body.to_lowercase();
        let mut changed = false;

        if body.contains("reasoning_effort") && self.reasoning_effort.take().is_some() {
            warn!("API rejected reasoning_effort; retrying without it");
            changed = true;
        }
        if body.contains("max_tokens") || body.contains("max_completion_tokens") {
            let swapped = match self.token_param() {
                TokenParam::MaxTokens => TokenParam::MaxCompletionTokens,
                TokenParam::MaxCompletionTokens => TokenParam::MaxTokens,
            };
            warn!(?swapped, "API rejected the token limit parameter; retrying");
            self.set_token_param(swapped);
            changed = true;
        }
        changed
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn system_prompt(ext: &str) -> String {
    format!(
        "You are a file renaming assistant. \
         Analyze the user's file content and suggest a short, descriptive, English filename (snake_case). \
         You must KEEP the original extension '{ext}'. \
         Output ONLY the filename. No markdown, no explanation."
    )
}

/// Turn raw model output into a usable file name ending in `ext`.
///
/// `ext` is the lowercased extension with its dot (`.txt`), or empty.
pub fn sanitize_suggestion(raw: &str, ext: &str) -> Result<String, SuggestError> {
    let cleaned = raw.replace('`', "");
    let line = cleaned
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let unquoted = line
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string();
    let mut name = RESERVED_CHARS.replace_all(&unquoted, "_").into_owned();

    if name.is_empty() || name.eq_ignore_ascii_case(ext) {
        return Err(SuggestError::EmptyResponse);
    }
    if !ext.is_empty() && !name.to_lowercase().ends_with(ext) {
        name.push_str(ext);
    }
    Ok(name)
}

/// Handle on the suggestion API.
#[derive(Debug, Clone)]
pub struct OpenAiSuggester {
    client: reqwest::Client,
    settings: ApiSettings,
}

impl OpenAiSuggester {
    pub fn new(settings: ApiSettings) -> Result<Self, SuggestError> {
        if !settings.is_configured() {
            return Err(SuggestError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Ask the model for a new name for `path`. The result keeps the
    /// file's extension and is safe to use as a single path component.
    pub async fn suggest(&self, path: &Path) -> Result<String, SuggestError> {
        let kind = validate_file(path)?;
        let ext = dotted_extension(path);
        let user = user_prompt(path, kind)?;
        let mut request = ChatRequest::new(&self.settings, system_prompt(&ext), user);
        let url = format!("{}/chat/completions", self.settings.endpoint.trim_end_matches('/'));
        let key = self.settings.api_key.as_deref().unwrap_or_default();

        info!(path = %path.display(), ?kind, "Requesting name suggestion");
        let mut retried = false;
        loop {
            let response = self
                .client
                .post(&url)
                .bearer_auth(key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let body: ChatResponse = response.json().await?;
                let raw = body
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .unwrap_or_default();
                debug!(%raw, "Model replied");
                return sanitize_suggestion(&raw, &ext);
            }

            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST && !retried && request.relax_for(&body) {
                retried = true;
                continue;
            }
            return Err(SuggestError::Api {
                status: status.as_u16(),
                body,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_endpoint_uses_max_completion_tokens() {
        let settings = ApiSettings {
            api_key: Some("k".into()),
            ..ApiSettings::default()
        };
        let request = ChatRequest::new(&settings, String::new(), UserContent::Text(String::new()));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_completion_tokens"], 1000);
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["reasoning_effort"], "low");
    }

    #[test]
    fn other_endpoints_use_max_tokens() {
        let settings = ApiSettings {
            endpoint: "http://localhost:11434/v1".into(),
            api_key: Some("k".into()),
            ..ApiSettings::default()
        };
        let request = ChatRequest::new(&settings, String::new(), UserContent::Text(String::new()));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 1000);
        assert!(json.get("max_completion_tokens").is_none());
    }

    #[test]
    fn relax_drops_reasoning_effort_and_swaps_token_param() {
        let settings = ApiSettings::default();
        let mut request = ChatRequest::new(&settings, String::new(), UserContent::Text(String::new()));
        assert!(request.relax_for("Unsupported parameter: 'reasoning_effort'"));
        assert!(request.reasoning_effort.is_none());
        assert!(!request.relax_for("Unsupported parameter: 'reasoning_effort'"));

        assert!(request.relax_for("use max_tokens instead"));
        assert_eq!(request.token_param(), TokenParam::MaxTokens);
        assert!(!request.relax_for("model not found"));
    }

    #[test]
    fn sanitize_strips_markdown_and_appends_extension() {
        assert_eq!(
            sanitize_suggestion("```\nquarterly_report\n```", ".pdf").unwrap(),
            "quarterly_report.pdf"
        );
        assert_eq!(
            sanitize_suggestion("\"beach_sunset.JPG\"", ".jpg").unwrap(),
            "beach_sunset.JPG"
        );
    }

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(
            sanitize_suggestion("notes: a/b?.txt", ".txt").unwrap(),
            "notes_ a_b_.txt"
        );
    }

    #[test]
    fn sanitize_rejects_empty_output() {
        assert!(matches!(
            sanitize_suggestion("  \n``", ".txt"),
            Err(SuggestError::EmptyResponse)
        ));
        assert!(matches!(
            sanitize_suggestion(".txt", ".txt"),
            Err(SuggestError::EmptyResponse)
        ));
    }

    #[test]
    fn missing_key_is_not_configured() {
        assert!(matches!(
            OpenAiSuggester::new(ApiSettings::default()),
            Err(SuggestError::NotConfigured)
        ));
    }
}
