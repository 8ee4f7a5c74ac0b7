//! LLM-backed extraction over an OpenAI-compatible chat completions API
//!
//! Groq, OpenAI and most self-hosted gateways speak the same
//! `/chat/completions` protocol, so one client covers all of them. The page
//! content is split into chunks that fit the configured token budget and
//! every chunk is sent as its own request.

use crate::config::ExtractionConfig;
use crate::extraction::{parse_records, ExtractionError, ExtractionStrategy};
use crate::record::{Record, RecordSchema};
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Approximate number of words per token used for chunking
const WORD_TOKEN_RATE: f64 = 0.75;

/// Extraction strategy that prompts an LLM for JSON records
#[derive(Debug, Clone)]
pub struct LlmExtractionStrategy {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    system_prompt: String,
    chunk_token_threshold: usize,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmExtractionStrategy {
    /// Creates a strategy from configuration, reading the API key from the
    /// environment variable named in `config.api_key_env`
    pub fn from_config(
        config: &ExtractionConfig,
        schema: &RecordSchema,
        client: Client,
    ) -> Result<Self, ConfigError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ConfigError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::new(config, schema, client, api_key))
    }

    /// Creates a strategy with an explicit API key
    pub fn new(
        config: &ExtractionConfig,
        schema: &RecordSchema,
        client: Client,
        api_key: impl Into<String>,
    ) -> Self {
        let system_prompt = format!(
            "{}\n\nRespond with JSON only: an array of objects matching this schema.\n{}",
            config.instruction,
            schema.json_schema()
        );

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model().to_string(),
            system_prompt,
            chunk_token_threshold: config.chunk_token_threshold,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Sends one chunk and returns the completion text
    async fn complete(&self, url: &str, chunk: &str) -> Result<String, ExtractionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(self.system_prompt.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(format!("URL: {}\n\nContent:\n{}", url, chunk)),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("LLM API error for {}: HTTP {}", url, status);
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        tracing::debug!(
            "LLM completion for {} took {}ms",
            url,
            start.elapsed().as_millis()
        );

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ExtractionError::EmptyResponse)
    }
}

#[async_trait]
impl ExtractionStrategy for LlmExtractionStrategy {
    async fn extract(&self, url: &str, blocks: &[String]) -> Result<Vec<Record>, ExtractionError> {
        let chunks = chunk_blocks(blocks, self.chunk_token_threshold);
        tracing::debug!("Extracting from {} in {} chunk(s)", url, chunks.len());

        let mut records = Vec::new();
        for chunk in &chunks {
            let content = self.complete(url, chunk).await?;
            records.extend(parse_records(&content)?);
        }

        Ok(records)
    }
}

/// Groups content blocks into chunks of at most `token_threshold` tokens
///
/// Tokens are approximated from word counts. Blocks are kept whole where
/// possible; a block larger than the budget on its own is split on word
/// boundaries. Empty blocks are dropped.
pub fn chunk_blocks(blocks: &[String], token_threshold: usize) -> Vec<String> {
    let max_words = ((token_threshold as f64 * WORD_TOKEN_RATE) as usize).max(1);

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for block in blocks {
        let words: Vec<&str> = block.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + words.len() > max_words {
            chunks.push(current.join(" "));
            current.clear();
        }

        if words.len() > max_words {
            for piece in words.chunks(max_words) {
                chunks.push(piece.join(" "));
            }
            continue;
        }

        current.extend(words);
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordConfig;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy_for(server: &MockServer, chunk_token_threshold: usize) -> LlmExtractionStrategy {
        let config = ExtractionConfig {
            api_base: format!("{}/", server.uri()),
            chunk_token_threshold,
            ..ExtractionConfig::default()
        };
        let schema = RecordSchema::from_config(&RecordConfig::default());
        LlmExtractionStrategy::new(&config, &schema, Client::new(), "secret")
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    fn blocks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_chunk_blocks_fit_in_one_chunk() {
        let chunks = chunk_blocks(&blocks(&["The Estate Buckhead", "Ashton Gardens"]), 1000);
        assert_eq!(chunks, vec!["The Estate Buckhead Ashton Gardens"]);
    }

    #[test]
    fn test_chunk_blocks_splits_on_block_boundary() {
        // threshold 4 tokens -> 3 words per chunk
        let chunks = chunk_blocks(&blocks(&["a b", "c d", "e"]), 4);
        assert_eq!(chunks, vec!["a b", "c d e"]);
    }

    #[test]
    fn test_chunk_blocks_splits_oversized_block() {
        let chunks = chunk_blocks(&blocks(&["one two three four five six seven"]), 4);
        assert_eq!(chunks, vec!["one two three", "four five six", "seven"]);
    }

    #[test]
    fn test_chunk_blocks_skips_empty() {
        assert!(chunk_blocks(&blocks(&["", "   "]), 100).is_empty());
    }

    #[test]
    fn test_system_prompt_includes_schema() {
        let schema = RecordSchema::from_config(&RecordConfig::default());
        let strategy =
            LlmExtractionStrategy::new(&ExtractionConfig::default(), &schema, Client::new(), "k");

        assert_eq!(strategy.model, "deepseek-r1-distill-llama-70b");
        assert_eq!(strategy.api_base, "https://api.groq.com/openai/v1");
        assert!(strategy.system_prompt.contains("Extract all venue objects"));
        assert!(strategy.system_prompt.contains("\"capacity\""));
    }

    #[tokio::test]
    async fn test_extract_sends_request_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_string_contains("\"model\":\"deepseek-r1-distill-llama-70b\""))
            .and(body_string_contains("URL: https://listings.test/venues?page=1"))
            .respond_with(completion(
                "<think>listing</think>```json\n[{\"name\": \"Ashton Gardens\", \"rating\": 4.7}]\n```",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let records = strategy_for(&server, 1000)
            .extract(
                "https://listings.test/venues?page=1",
                &blocks(&["Ashton Gardens Sugar Hill"]),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("rating").and_then(|v| v.as_number()), Some(4.7));
    }

    #[tokio::test]
    async fn test_extract_one_request_per_chunk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(r#"[{"name": "Venue"}]"#))
            .expect(2)
            .mount(&server)
            .await;

        // threshold 4 tokens -> 3 words per chunk
        let records = strategy_for(&server, 4)
            .extract("u", &blocks(&["a b c", "d e f"]))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_extract_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let result = strategy_for(&server, 1000).extract("u", &blocks(&["x"])).await;

        match result {
            Err(ExtractionError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let result = strategy_for(&server, 1000).extract("u", &blocks(&["x"])).await;

        assert!(matches!(result, Err(ExtractionError::EmptyResponse)));
    }
}
