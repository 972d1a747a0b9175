//! OpenAI-compatible completion service.
//!
//! A single [`OpenAiCompatibleService`] serves OpenAI and any endpoint that
//! speaks the chat completions protocol, selected by base URL.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;

use tripweave_core::llm::TextCompletionService;
use tripweave_types::error::ServiceError;
use tripweave_types::llm::{CompletionOutput, CompletionRequest, render_tool_results};

use self::config::OpenAiCompatConfig;

/// Completion service for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleService {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: u32,
}

impl OpenAiCompatibleService {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a [`CreateChatCompletionRequest`] for one role invocation.
    ///
    /// System message: role instructions plus goal. User message: the input,
    /// followed by the lookup results block when there are any.
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let mut system = request.system.trim().to_string();
        if !request.goal.trim().is_empty() {
            system.push_str(&format!("\n\nGoal: {}", request.goal.trim()));
        }

        let mut user = request.message.clone();
        if !request.tool_results.is_empty() {
            user.push_str("\n\n");
            user.push_str(&render_tool_results(&request.tool_results));
        }

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(system),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(user),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(self.max_tokens),
            temperature: self.temperature,
            ..Default::default()
        }
    }
}

impl TextCompletionService for OpenAiCompatibleService {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionOutput, ServiceError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let Some(choice) = response.choices.first() else {
            return Err(ServiceError::Provider(format!(
                "{} returned no choices",
                self.provider_name
            )));
        };

        match choice.message.content.clone() {
            Some(content) => Ok(CompletionOutput::Text(content)),
            // Content-less replies (refusals) are passed on as structured output.
            None => Ok(CompletionOutput::Opaque(serde_json::json!({
                "refusal": choice.message.refusal,
            }))),
        }
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`ServiceError`].
///
/// 401 and key errors are `Auth`; rate limiting, overload, 5xx and transport
/// timeouts are `Transient`; everything else is `Provider`.
fn map_openai_error(err: async_openai::error::OpenAIError) -> ServiceError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                ServiceError::Auth(api_err.message.clone())
            } else if code == "rate_limit_exceeded"
                || error_type == "rate_limit_error"
                || code == "server_error"
                || error_type == "server_error"
                || error_type == "overloaded_error"
            {
                ServiceError::Transient(api_err.message.clone())
            } else {
                ServiceError::Provider(err.to_string())
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 | 403 => ServiceError::Auth(err.to_string()),
                    429 | 500..=599 => ServiceError::Transient(err.to_string()),
                    _ => ServiceError::Provider(err.to_string()),
                }
            } else if reqwest_err.is_timeout() || reqwest_err.is_connect() {
                ServiceError::Transient(err.to_string())
            } else {
                ServiceError::Provider(err.to_string())
            }
        }
        _ => ServiceError::Provider(err.to_string()),
    }
}
