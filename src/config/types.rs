use serde::Deserialize;

/// Main configuration structure for Venue-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub record: RecordConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URL; the page number is appended as `?page=N`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// CSS selector for the listing entries on each page
    #[serde(rename = "css-selector")]
    pub css_selector: String,

    /// Maximum number of pages to fetch
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Pause between page requests (seconds)
    #[serde(rename = "pause-seconds")]
    pub pause_seconds: u64,

    /// Text whose presence on a page means the listing is exhausted
    #[serde(rename = "no-results-marker", default = "default_no_results_marker")]
    pub no_results_marker: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "VenueCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// LLM extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Provider and model, as `vendor/model`
    pub provider: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(rename = "api-base")]
    pub api_base: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Instruction given to the model for every chunk
    pub instruction: String,

    /// Approximate token budget per request
    #[serde(rename = "chunk-token-threshold")]
    pub chunk_token_threshold: usize,

    pub temperature: f32,

    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider: "groq/deepseek-r1-distill-llama-70b".to_string(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            instruction: "Extract all venue objects with 'name', 'location', 'price', \
                          'capacity', 'rating', 'reviews', and a 1 sentence description \
                          of the venue from the following content."
                .to_string(),
            chunk_token_threshold: 1000,
            temperature: 0.0,
            max_tokens: 800,
        }
    }
}

impl ExtractionConfig {
    /// Model name sent to the API (the part of `provider` after the vendor)
    pub fn model(&self) -> &str {
        self.provider
            .split_once('/')
            .map(|(_, model)| model)
            .unwrap_or(&self.provider)
    }
}

/// Record layout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Field used to detect duplicate records
    #[serde(rename = "identity-field")]
    pub identity_field: String,

    /// Fields every accepted record must carry
    #[serde(rename = "required-fields")]
    pub required_fields: Vec<String>,

    /// Fields the model should return as numbers
    #[serde(rename = "numeric-fields")]
    pub numeric_fields: Vec<String>,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            identity_field: "name".to_string(),
            required_fields: [
                "name",
                "location",
                "price",
                "capacity",
                "rating",
                "reviews",
                "description",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            numeric_fields: vec!["rating".to_string(), "reviews".to_string()],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV file written after a successful crawl
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

fn default_no_results_marker() -> String {
    "No Results Found".to_string()
}
