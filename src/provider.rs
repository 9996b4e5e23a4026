use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::webc;
use genai::{ModelIden, ServiceTarget};

use crate::anthropic::AnthropicAdapter;
use crate::constants::DEFAULT_TEMPERATURE;
use crate::error::ClippyError;
use crate::gemini::GeminiAdapter;
use crate::logging::{log_debug, log_info, log_trace};
use crate::openai::OpenAiAdapter;
use crate::profile::{Profile, ProviderKind};

/// Sends a single prompt to one AI backend and returns the completion text
#[async_trait]
pub trait ProviderAdapter: Debug + Send + Sync {
    /// Submit `prompt` as one user message and return the first candidate's
    /// text unmodified. One attempt, no retries.
    async fn complete(&self, profile: &Profile, prompt: &str) -> Result<String, ClippyError>;

    /// Get provider-specific information (e.g., "Gemini", "OpenAI", etc.)
    fn provider_name(&self) -> &str;
}

/// Adapters available to the dispatcher, keyed by provider
#[derive(Debug, Default)]
pub struct AdapterSet {
    adapters: HashMap<ProviderKind, Box<dyn ProviderAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every provider this build knows about, sharing one request timeout
    pub fn standard(timeout: Duration, system_prompt: String) -> anyhow::Result<Self> {
        let mut set = Self::new();
        set.register(
            ProviderKind::OpenAi,
            Box::new(OpenAiAdapter::new(timeout, system_prompt.clone())?),
        );
        set.register(
            ProviderKind::OpenAiCompatible,
            Box::new(OpenAiAdapter::compatible(timeout, system_prompt.clone())?),
        );
        set.register(
            ProviderKind::Google,
            Box::new(GeminiAdapter::new(timeout, system_prompt.clone())?),
        );
        set.register(
            ProviderKind::Anthropic,
            Box::new(AnthropicAdapter::new(timeout, system_prompt)?),
        );
        Ok(set)
    }

    pub fn register(&mut self, kind: ProviderKind, adapter: Box<dyn ProviderAdapter>) {
        self.adapters.insert(kind, adapter);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&dyn ProviderAdapter> {
        self.adapters.get(&kind).map(|adapter| adapter.as_ref())
    }
}

/// HTTP client handed to genai; carries the request timeout
pub fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    use anyhow::Context;
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// genai-backed chat call shared by all adapters.
///
/// The adapter kind and endpoint are pinned through a service target resolver
/// so the backend is chosen by the profile, never by the model name.
#[derive(Debug, Clone)]
pub struct GenaiChat {
    kind: AdapterKind,
    provider: ProviderKind,
    http: reqwest::Client,
    system_prompt: String,
}

impl GenaiChat {
    pub fn new(
        kind: AdapterKind,
        provider: ProviderKind,
        timeout: Duration,
        system_prompt: String,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            kind,
            provider,
            http: build_http_client(timeout)?,
            system_prompt,
        })
    }

    pub fn adapter_kind(&self) -> AdapterKind {
        self.kind
    }

    fn client_for(&self, profile: &Profile) -> Client {
        let kind = self.adapter_kind();
        let api_key = profile.api_key.clone();
        let endpoint = profile.endpoint.as_deref().map(normalize_endpoint);

        let target_resolver = ServiceTargetResolver::from_resolver_fn(
            move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget {
                    endpoint: default_endpoint,
                    model,
                    ..
                } = service_target;
                let endpoint = match &endpoint {
                    Some(url) => Endpoint::from_owned(url.clone()),
                    None => default_endpoint,
                };
                Ok(ServiceTarget {
                    endpoint,
                    auth: AuthData::from_single(api_key.clone()),
                    model: ModelIden::new(kind, model.model_name),
                })
            },
        );

        Client::builder()
            .with_reqwest(self.http.clone())
            .with_service_target_resolver(target_resolver)
            .build()
    }

    pub async fn complete(&self, profile: &Profile, prompt: &str) -> Result<String, ClippyError> {
        log_info(&format!(
            "Sending chat request to {} using model: {} ({})",
            self.provider,
            profile.name,
            profile.effective_endpoint()
        ));

        let client = self.client_for(profile);
        let mut chat_request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        if !self.system_prompt.is_empty() {
            chat_request = chat_request.with_system(self.system_prompt.clone());
        }
        let options = ChatOptions::default().with_temperature(DEFAULT_TEMPERATURE);

        log_trace(&format!("Request Debug: {:?}", chat_request));

        let chat_response = match client
            .exec_chat(&profile.name, chat_request, Some(&options))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log_debug(&format!("Raw genai error: {}", e));
                log_trace(&format!("Raw genai error debug: {:?}", e));
                return Err(classify_error(self.provider, &e));
            }
        };

        log_trace(&format!("Content: {:?}", chat_response.content));
        log_trace(&format!("Usage: {:?}", chat_response.usage));

        let text = chat_response
            .first_text()
            .ok_or_else(|| ClippyError::MalformedResponse {
                provider: self.provider,
                detail: "response contained no text candidate".to_string(),
            })?;

        if text.trim().is_empty() {
            return Err(ClippyError::MalformedResponse {
                provider: self.provider,
                detail: "response text was empty".to_string(),
            });
        }

        log_info(&format!(
            "Received response from {}, length: {}",
            self.provider,
            text.len()
        ));
        Ok(text.to_string())
    }
}

/// genai joins request paths onto the endpoint, so it must end with '/'
pub fn normalize_endpoint(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Map a genai failure onto the typed taxonomy.
///
/// HTTP failures are decided by their status code. Keyword matching is only
/// a fallback for errors without one, and only looks at the message and the
/// response body, never at response headers.
pub fn classify_error(provider: ProviderKind, error: &genai::Error) -> ClippyError {
    let detail = error.to_string();
    match error {
        genai::Error::WebModelCall { webc_error, .. }
        | genai::Error::WebAdapterCall { webc_error, .. } => match webc_error {
            webc::Error::ResponseFailedStatus { status, body, .. } => {
                classify_status(provider, status.as_u16(), body, detail)
            }
            webc::Error::ResponseFailedNotJson { .. } | webc::Error::JsonValueExt(_) => {
                ClippyError::MalformedResponse { provider, detail }
            }
            webc::Error::Reqwest(_) | webc::Error::EventSourceClone(_) => {
                ClippyError::Network { provider, detail }
            }
        },
        genai::Error::RequiresApiKey { .. }
        | genai::Error::NoAuthResolver { .. }
        | genai::Error::NoAuthData { .. } => ClippyError::Auth { provider, detail },
        genai::Error::NoChatResponse { .. }
        | genai::Error::InvalidJsonResponseElement { .. }
        | genai::Error::ChatResponse { .. }
        | genai::Error::StreamParse { .. }
        | genai::Error::JsonValueExt(_)
        | genai::Error::SerdeJson(_) => ClippyError::MalformedResponse { provider, detail },
        _ => classify_message(provider, detail),
    }
}

/// Classify an HTTP error response by status, refining with the body
pub fn classify_status(
    provider: ProviderKind,
    status: u16,
    body: &str,
    detail: String,
) -> ClippyError {
    match status {
        401 | 403 => ClippyError::Auth { provider, detail },
        429 => ClippyError::RateLimit { provider, detail },
        500..=599 => ClippyError::Network { provider, detail },
        400..=499 => {
            // Google answers a bad key with 400 INVALID_ARGUMENT
            let body = body.to_lowercase();
            if body.contains("api key not valid")
                || body.contains("api_key_invalid")
                || body.contains("invalid api key")
            {
                ClippyError::Auth { provider, detail }
            } else if body.contains("resource_exhausted") || body.contains("quota") {
                ClippyError::RateLimit { provider, detail }
            } else {
                ClippyError::RequestRejected { provider, detail }
            }
        }
        _ => classify_message(provider, detail),
    }
}

/// Fallback for errors that carry no HTTP status
fn classify_message(provider: ProviderKind, detail: String) -> ClippyError {
    let lower = detail.to_lowercase();

    if lower.contains("unauthorized")
        || lower.contains("invalid api key")
        || lower.contains("invalid x-api-key")
        || lower.contains("api key not valid")
    {
        return ClippyError::Auth { provider, detail };
    }

    if lower.contains("too many requests")
        || lower.contains("rate limit")
        || lower.contains("resource_exhausted")
    {
        return ClippyError::RateLimit { provider, detail };
    }

    if lower.contains("no chat response") || lower.contains("deserialize") {
        return ClippyError::MalformedResponse { provider, detail };
    }

    ClippyError::Network { provider, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct EchoAdapter;

    #[async_trait]
    impl ProviderAdapter for EchoAdapter {
        async fn complete(&self, _profile: &Profile, prompt: &str) -> Result<String, ClippyError> {
            Ok(prompt.to_string())
        }

        fn provider_name(&self) -> &str {
            "Echo"
        }
    }

    #[test]
    fn test_standard_set_covers_every_provider() {
        let set = AdapterSet::standard(Duration::from_secs(5), String::new()).unwrap();
        for kind in ProviderKind::ALL {
            assert!(set.get(kind).is_some(), "missing adapter for {kind}");
        }
        assert_eq!(set.get(ProviderKind::Google).unwrap().provider_name(), "Gemini");
        assert_eq!(
            set.get(ProviderKind::Anthropic).unwrap().provider_name(),
            "Anthropic"
        );
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let mut set = AdapterSet::new();
        assert!(set.get(ProviderKind::OpenAi).is_none());

        set.register(ProviderKind::OpenAi, Box::new(EchoAdapter));
        let adapter = set.get(ProviderKind::OpenAi).unwrap();
        let profile = Profile::new("gpt-4o", "k", ProviderKind::OpenAi, None);

        assert_eq!(adapter.complete(&profile, "hello").await.unwrap(), "hello");
        assert!(set.get(ProviderKind::Google).is_none());
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/"
        );
        assert_eq!(
            normalize_endpoint(" https://api.example.com/v1/ "),
            "https://api.example.com/v1/"
        );
    }

    /// An HTTP error as genai reports it, headers included
    fn status_error(code: u16, body: &str) -> genai::Error {
        use reqwest::header::{CONNECTION, CONTENT_TYPE, HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        genai::Error::WebModelCall {
            model_iden: ModelIden::new(AdapterKind::OpenAI, "gpt-4o"),
            webc_error: webc::Error::ResponseFailedStatus {
                status: reqwest::StatusCode::from_u16(code).unwrap(),
                body: body.to_string(),
                headers: Box::new(headers),
            },
        }
    }

    #[test]
    fn test_classify_auth_statuses() {
        for code in [401, 403] {
            let error = status_error(
                code,
                r#"{"error":{"message":"Incorrect API key provided"}}"#,
            );
            assert!(
                matches!(
                    classify_error(ProviderKind::OpenAi, &error),
                    ClippyError::Auth { .. }
                ),
                "{code} not classified as auth"
            );
        }

        let google = status_error(
            400,
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert!(matches!(
            classify_error(ProviderKind::Google, &google),
            ClippyError::Auth { .. }
        ));
    }

    #[test]
    fn test_classify_rate_limit_status() {
        let error = status_error(429, r#"{"error":{"message":"Rate limit reached"}}"#);
        assert!(matches!(
            classify_error(ProviderKind::Google, &error),
            ClippyError::RateLimit { .. }
        ));
    }

    #[test]
    fn test_classify_server_errors_as_network() {
        for code in [500, 502, 503, 529] {
            let error = status_error(code, r#"{"error":{"message":"overloaded"}}"#);
            assert!(
                matches!(
                    classify_error(ProviderKind::Anthropic, &error),
                    ClippyError::Network { .. }
                ),
                "{code} not classified as network"
            );
        }
    }

    #[test]
    fn test_classify_json_error_response_as_rejected() {
        // JSON content-type and keep-alive headers must not decide the outcome
        for code in [400, 404, 422] {
            let error = status_error(
                code,
                r#"{"error":{"message":"The model `gpt-9` does not exist","type":"invalid_request_error"}}"#,
            );
            match classify_error(ProviderKind::OpenAi, &error) {
                ClippyError::RequestRejected { provider, detail } => {
                    assert_eq!(provider, ProviderKind::OpenAi);
                    assert!(detail.contains("does not exist"), "detail: {detail}");
                }
                other => panic!("{code} expected RequestRejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_classify_errors_without_status() {
        let model_iden = ModelIden::new(AdapterKind::OpenAI, "gpt-4o");

        let empty = genai::Error::NoChatResponse {
            model_iden: model_iden.clone(),
        };
        assert!(matches!(
            classify_error(ProviderKind::OpenAi, &empty),
            ClippyError::MalformedResponse { .. }
        ));

        let not_json = genai::Error::WebModelCall {
            model_iden: model_iden.clone(),
            webc_error: webc::Error::ResponseFailedNotJson {
                content_type: "text/html".to_string(),
            },
        };
        assert!(matches!(
            classify_error(ProviderKind::OpenAi, &not_json),
            ClippyError::MalformedResponse { .. }
        ));

        let no_key = genai::Error::RequiresApiKey {
            model_iden: model_iden.clone(),
        };
        assert!(matches!(
            classify_error(ProviderKind::OpenAi, &no_key),
            ClippyError::Auth { .. }
        ));

        let stream = genai::Error::WebStream {
            model_iden,
            cause: "connection reset by peer".to_string(),
        };
        assert!(matches!(
            classify_error(ProviderKind::OpenAi, &stream),
            ClippyError::Network { .. }
        ));
    }
}
