use crate::theme::Theme;
use anyhow::{anyhow, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = "quill/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const GENERATE_FALLBACK: &str = "Failed to generate poem line";
pub const SAVE_FALLBACK: &str = "Failed to save poem";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to reach poetry server at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status; `message` is the server's `error` field when present
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    /// Success status but the body did not report success
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response from poetry server: {0}")]
    Decode(String),

    #[error("Cannot build endpoint from base URL {0}")]
    Endpoint(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub theme: Theme,
    pub user_input: String,
    pub previous_lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
    line: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLine {
    pub line: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
pub struct SaveRequest {
    pub poem: Vec<String>,
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    success: bool,
    filename: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub status: String,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub gemini_status: String,
    #[serde(default)]
    pub ai_provider: String,
    pub python_version: Option<String>,
}

impl Health {
    pub fn is_configured(&self) -> bool {
        self.gemini_status == "Configured"
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct PoetryClient {
    client: Client,
    base_url: Url,
}

impl PoetryClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "Health check failed").await);
        }
        Self::decode(response).await
    }

    pub async fn generate_line(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedLine, ApiError> {
        let url = self.endpoint(&["api", "generate-poem"])?;
        tracing::debug!(
            theme = %request.theme,
            input = %request.user_input,
            previous = request.previous_lines.len(),
            "requesting poem line"
        );

        let response = self
            .send(self.client.post(url.clone()).json(request), &url)
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, GENERATE_FALLBACK).await);
        }

        let body: GenerateResponse = Self::decode(response).await?;
        match (body.success, body.line) {
            (true, Some(line)) => Ok(GeneratedLine {
                line,
                usage: body.usage,
            }),
            (true, None) => Err(ApiError::Decode("missing `line` field".to_string())),
            (false, _) => Err(ApiError::Rejected(GENERATE_FALLBACK.to_string())),
        }
    }

    /// Stores the poem on the server and returns the name of the file it wrote.
    pub async fn save_poem(&self, request: &SaveRequest) -> Result<String, ApiError> {
        let url = self.endpoint(&["api", "save-poem"])?;
        let response = self
            .send(self.client.post(url.clone()).json(request), &url)
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, SAVE_FALLBACK).await);
        }

        let body: SaveResponse = Self::decode(response).await?;
        if !body.success {
            return Err(ApiError::Rejected(SAVE_FALLBACK.to_string()));
        }
        if let Some(message) = &body.message {
            tracing::debug!(%message, "save acknowledged");
        }
        body.filename
            .ok_or_else(|| ApiError::Decode("missing `filename` field".to_string()))
    }

    pub async fn download(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["download", filename])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, "File not found").await);
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Endpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<Response, ApiError> {
        request.send().await.map_err(|source| ApiError::Unreachable {
            url: url.to_string(),
            source,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn error_from(response: Response, fallback: &str) -> ApiError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| fallback.to_string());

        tracing::warn!(%status, %message, "poetry server returned an error");
        ApiError::Server { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PoetryClient {
        PoetryClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_provider_configuration() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Server is running",
                "timestamp": "2024-05-01T10:00:00",
                "python_version": "3.12.1",
                "gemini_status": "Configured",
                "ai_provider": "Google Gemini 1.5 Flash"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let health = client_for(&mock_server).health().await.unwrap();
        assert!(health.is_configured());
        assert_eq!(health.ai_provider, "Google Gemini 1.5 Flash");
    }

    #[tokio::test]
    async fn generate_sends_camel_case_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-poem"))
            .and(body_json(json!({
                "theme": "nature",
                "userInput": "river",
                "previousLines": ["The forest hums in green"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "line": "A river threads the quiet stone",
                "usage": {"total_tokens": 40, "prompt_tokens": 32, "completion_tokens": 8}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let generated = client_for(&mock_server)
            .generate_line(&GenerateRequest {
                theme: Theme::Nature,
                user_input: "river".to_string(),
                previous_lines: vec!["The forest hums in green".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(generated.line, "A river threads the quiet stone");
        assert_eq!(generated.usage.map(|u| u.total_tokens), Some(40));
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-poem"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": "API quota exceeded. Please check your Google AI Studio account."
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .generate_line(&GenerateRequest {
                theme: Theme::Romantic,
                user_input: "beginning".to_string(),
                previous_lines: Vec::new(),
            })
            .await
            .unwrap_err();

        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert!(message.starts_with("API quota exceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_without_body_uses_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/save-poem"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .save_poem(&SaveRequest {
                poem: vec!["one".to_string()],
                theme: Theme::Romantic,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), SAVE_FALLBACK);
    }

    #[tokio::test]
    async fn health_without_status_field_is_accepted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "gemini_status": "Configured",
                "ai_provider": "Google Gemini 1.5 Flash"
            })))
            .mount(&mock_server)
            .await;

        let health = client_for(&mock_server).health().await.unwrap();
        assert!(health.is_configured());
        assert!(health.status.is_empty());
    }

    #[tokio::test]
    async fn unsuccessful_save_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/save-poem"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "filename": "poem_romantic_20240501_100000.txt"
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .save_poem(&SaveRequest {
                poem: vec!["one".to_string()],
                theme: Theme::Romantic,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == SAVE_FALLBACK));
    }

    #[tokio::test]
    async fn unsuccessful_body_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-poem"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .generate_line(&GenerateRequest {
                theme: Theme::Romantic,
                user_input: "love".to_string(),
                previous_lines: vec!["x".to_string()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == GENERATE_FALLBACK));
    }

    #[tokio::test]
    async fn save_returns_filename_and_download_fetches_it() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/save-poem"))
            .and(body_json(json!({"poem": ["one", "two"], "theme": "melancholy"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "filename": "poem_melancholy_20240501_100000.txt",
                "message": "Poem saved successfully"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/download/poem_melancholy_20240501_100000.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("one\ntwo"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let filename = client
            .save_poem(&SaveRequest {
                poem: vec!["one".to_string(), "two".to_string()],
                theme: Theme::Melancholy,
            })
            .await
            .unwrap();
        let bytes = client.download(&filename).await.unwrap();
        assert_eq!(bytes, b"one\ntwo");
    }

    #[tokio::test]
    async fn endpoints_keep_base_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/poetry/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Server is running",
                "gemini_status": "Not configured",
                "ai_provider": "Google Gemini 1.5 Flash"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = Url::parse(&format!("{}/poetry/", mock_server.uri())).unwrap();
        let health = PoetryClient::new(base).unwrap().health().await.unwrap();
        assert!(!health.is_configured());
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        let client = PoetryClient::new(Url::parse("http://127.0.0.1:1").unwrap()).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable { .. }));
    }
}
