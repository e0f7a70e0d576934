use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs, ResponseFormat,
    },
};
use backoff::ExponentialBackoffBuilder;
use std::time::{Duration, Instant};

use crate::backend::{CompletionBackend, CompletionRequest, EmbeddingBackend, RetryPolicy, with_retry};
use crate::error::{AIError, Upstream};
use crate::settings::Settings;

// Text generation and embeddings over the OpenAI API (or any compatible endpoint).
#[derive(Clone)]
pub struct OpenAIBackend {
    client: Option<Client<OpenAIConfig>>, // None when no key is configured.
    model: String,
    embedding_model: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenAIBackend {
    pub fn new(api_key: Option<String>, api_base: Option<String>) -> Self {
        let client = api_key.map(|key| {
            let mut config = OpenAIConfig::new().with_api_key(key);
            if let Some(base) = api_base {
                config = config.with_api_base(base);
            }
            // Rate limits are retried by `with_retry` only.
            Client::with_config(config).with_backoff(
                ExponentialBackoffBuilder::new()
                    .with_max_elapsed_time(Some(Duration::ZERO))
                    .build(),
            )
        });

        let defaults = Settings::default();
        let timeout = defaults.request_timeout();
        OpenAIBackend {
            client,
            model: defaults.model,
            embedding_model: defaults.embedding_model,
            timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut backend = Self::new(
            settings.resolved_openai_api_key(),
            settings.openai_api_base.clone(),
        );
        backend.model = settings.model.clone();
        backend.embedding_model = settings.embedding_model.clone();
        backend.timeout = settings.request_timeout();
        backend.retry = RetryPolicy {
            max_retries: settings.max_retries,
            base_delay: settings.retry_base_delay(),
        };
        backend
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn build_messages(request: &CompletionRequest) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2 + request.history.len() * 2);

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.preamble.trim())
                .build()?
                .into(),
        );

        for turn in &request.history {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.question.as_str())
                    .build()?
                    .into(),
            );
            messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.answer.as_str())
                    .build()?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build()?
                .into(),
        );
        Ok(messages)
    }

    async fn complete_once(&self, client: &Client<OpenAIConfig>, request: &CompletionRequest) -> Result<String, AIError> {
        let messages =
            Self::build_messages(request).map_err(|e| classify(e, Upstream::TextGeneration))?;

        let mut chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .build()
            .map_err(|e| classify(e, Upstream::TextGeneration))?;
        if request.json_mode {
            chat_request.response_format = Some(ResponseFormat::JsonObject);
        }

        let response = tokio::time::timeout(self.timeout, client.chat().create(chat_request))
            .await
            .map_err(|_| timed_out(Upstream::TextGeneration, self.timeout))?
            .map_err(|e| classify(e, Upstream::TextGeneration))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AIError::malformed("completion contained no message"))
    }

    async fn embed_once(&self, client: &Client<OpenAIConfig>, texts: &[String]) -> Result<Vec<Vec<f32>>, AIError> {
        let embedding_request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| classify(e, Upstream::Embedding))?;

        let response = tokio::time::timeout(self.timeout, client.embeddings().create(embedding_request))
            .await
            .map_err(|_| timed_out(Upstream::Embedding, self.timeout))?
            .map_err(|e| classify(e, Upstream::Embedding))?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(AIError::malformed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        data.sort_by_key(|embedding| embedding.index);
        Ok(data.into_iter().map(|embedding| embedding.embedding).collect())
    }
}

impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AIError> {
        let client = self
            .client
            .as_ref()
            .ok_or(AIError::MissingCredential(Upstream::TextGeneration))?;

        let started = Instant::now();
        let result = with_retry(self.retry, "chat completion", || {
            self.complete_once(client, &request)
        })
        .await;
        log::debug!(
            "chat completion ({}) finished in {:?}: {}",
            self.model,
            started.elapsed(),
            if result.is_ok() { "ok" } else { "error" }
        );
        result
    }
}

impl EmbeddingBackend for OpenAIBackend {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AIError> {
        let client = self
            .client
            .as_ref()
            .ok_or(AIError::EmbeddingBackendUnavailable)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let result = with_retry(self.retry, "embedding", || self.embed_once(client, &texts)).await;
        log::debug!(
            "embedded {} texts ({}) in {:?}",
            texts.len(),
            self.embedding_model,
            started.elapsed()
        );
        result
    }
}

fn timed_out(upstream: Upstream, timeout: Duration) -> AIError {
    AIError::unavailable(upstream, format!("request timed out after {:?}", timeout), true)
}

// Maps client errors onto the upstream taxonomy.
fn classify(error: OpenAIError, upstream: Upstream) -> AIError {
    match error {
        OpenAIError::Reqwest(e) => {
            let transient = e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|status| {
                    status.as_u16() == 429 || status.is_server_error()
                });
            AIError::unavailable(upstream, e.to_string(), transient)
        }
        OpenAIError::ApiError(api) => {
            let code = api.code.clone().unwrap_or_default();
            let kind = api.r#type.clone().unwrap_or_default();
            let transient = code == "rate_limit_exceeded"
                || kind == "server_error"
                || kind == "rate_limit_error";
            AIError::unavailable(upstream, api.message, transient)
        }
        OpenAIError::JSONDeserialize(e) => AIError::malformed(e.to_string()),
        OpenAIError::InvalidArgument(reason) => AIError::unavailable(upstream, reason, false),
        other => AIError::unavailable(upstream, other.to_string(), false),
    }
}
