// Copyright 2026 the notedrill authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::error::Fallible;
use crate::llm::ChatMessage;
use crate::llm::CompletionRequest;
use crate::llm::CompletionService;
use crate::llm::Role;

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 1024;

/// Name of the forced tool used to carry the output-shape constraint.
const VERDICT_TOOL: &str = "verdict";

/// Completion service backed by the Anthropic Messages API.
///
/// When a request carries a schema, it is sent as a forced tool and the
/// tool input comes back as the reply, serialized. Without a schema the
/// reply is the concatenated text blocks.
#[derive(Clone)]
pub struct Anthropic {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Anthropic {
    pub fn new(api_key: impl Into<String>) -> Fallible<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Read the API key from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Fallible<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| Error::NoApiKey)?;
        Self::new(api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_headers(&self) -> Fallible<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Network(format!("invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn build_api_request(&self, request: &CompletionRequest) -> ApiRequest {
        // The Messages API takes the system instruction as a top-level
        // field, not as a message.
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
            .collect();
        let system = if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        };

        let messages: Vec<ApiMessage> = request
            .messages
            .iter()
            .filter_map(|m: &ChatMessage| match m.role {
                Role::System => None,
                Role::Assistant => Some(ApiMessage {
                    role: "assistant",
                    content: m.text.clone(),
                }),
                Role::User => Some(ApiMessage {
                    role: "user",
                    content: m.text.clone(),
                }),
            })
            .collect();

        let (tools, tool_choice) = match &request.schema {
            Some(schema) => {
                let tool = ApiTool {
                    name: VERDICT_TOOL,
                    description: "Deliver the tutor's reply.",
                    input_schema: schema.clone(),
                };
                let choice = serde_json::json!({ "type": "tool", "name": VERDICT_TOOL });
                (Some(vec![tool]), Some(choice))
            }
            None => (None, None),
        };

        ApiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system,
            messages,
            tools,
            tool_choice,
        }
    }
}

impl CompletionService for Anthropic {
    async fn complete(&self, request: CompletionRequest) -> Fallible<String> {
        let api_request = self.build_api_request(&request);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{API_BASE}/messages"))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Transport { status, message });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("failed to parse response: {e}")))?;

        // With a schema constraint the reply is the forced tool's input.
        if request.schema.is_some() {
            for block in &api_response.content {
                if block.kind == "tool_use" {
                    if let Some(input) = &block.input {
                        return Ok(serde_json::to_string(input)?);
                    }
                }
            }
        }

        let text: Vec<&str> = api_response
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        Ok(text.join(""))
    }
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ApiTool {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}
