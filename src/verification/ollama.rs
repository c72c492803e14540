// src/verification/ollama.rs - LLM-backed verification and enrichment over the OLLAMA API

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{EnrichmentProvider, Verification, VerificationProvider};

/// Connection settings for an OLLAMA server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("OLLAMA_URL").unwrap_or(defaults.url),
            model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
            request_timeout_secs: std::env::var("OLLAMA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

/// OLLAMA API request structure with JSON schema
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    format: serde_json::Value,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct VerifyAnswer {
    is_known_company: bool,
    official_name: String,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct DomainAnswer {
    #[serde(default)]
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndustryAnswer {
    #[serde(default)]
    industry: Option<String>,
}

/// Verification and enrichment provider that asks a local LLM.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build OLLAMA HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn generate<T: DeserializeOwned>(&self, prompt: String, schema: serde_json::Value) -> Result<T> {
        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            format: schema,
            stream: false,
            options: OllamaOptions {
                temperature: 0.1,
                top_p: 0.9,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OLLAMA")?;

        if !response.status().is_success() {
            return Err(anyhow!("OLLAMA returned status: {}", response.status()));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse OLLAMA response")?;
        debug!("Raw AI response: {}", ollama_response.response);
        parse_answer(&ollama_response.response)
    }
}

#[async_trait]
impl VerificationProvider for OllamaProvider {
    async fn verify(&self, name: &str) -> Result<Option<Verification>> {
        let prompt = format!(
            "You resolve company names to their official registered names.\n\
             Company as written in a spreadsheet: \"{}\"\n\
             If this is a known company, give its official company name without \
             legal suffix noise. If you do not recognise it, set is_known_company to false.",
            name
        );
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "is_known_company": {"type": "boolean"},
                "official_name": {"type": "string"},
                "reasoning": {"type": "string", "description": "One sentence on why"}
            },
            "required": ["is_known_company", "official_name"]
        });

        let answer: VerifyAnswer = self.generate(prompt, schema).await?;
        if !answer.is_known_company || answer.official_name.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Verification {
            name: answer.official_name.trim().to_uppercase(),
            reason: answer.reasoning.trim().to_string(),
        }))
    }
}

#[async_trait]
impl EnrichmentProvider for OllamaProvider {
    async fn find_domain(&self, name: &str) -> Result<Option<String>> {
        let prompt = format!(
            "What is the primary official website of the company \"{}\"? \
             Answer with null if unsure.",
            name
        );
        let schema = serde_json::json!({
            "type": "object",
            "properties": {"website": {"type": ["string", "null"]}},
            "required": ["website"]
        });
        let answer: DomainAnswer = self.generate(prompt, schema).await?;
        Ok(answer.website.as_deref().and_then(normalize_website))
    }

    async fn classify_industry(&self, name: &str) -> Result<Option<String>> {
        let prompt = format!(
            "Classify the company \"{}\" into one short industry label \
             (for example \"Banking\", \"Information Technology\", \"Retail\"). \
             Answer with null if unsure.",
            name
        );
        let schema = serde_json::json!({
            "type": "object",
            "properties": {"industry": {"type": ["string", "null"]}},
            "required": ["industry"]
        });
        let answer: IndustryAnswer = self.generate(prompt, schema).await?;
        Ok(answer
            .industry
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty()))
    }
}

/// Parse a model answer, tolerating text around the JSON object.
fn parse_answer<T: DeserializeOwned>(response: &str) -> Result<T> {
    if let Ok(parsed) = serde_json::from_str::<T>(response) {
        return Ok(parsed);
    }
    let start = response.find('{');
    let end = response.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&response[start..=end])
            .with_context(|| format!("Unparseable AI response: {}", response)),
        _ => Err(anyhow!("No JSON object in AI response: {}", response)),
    }
}

/// Reduce a website answer to its bare host, e.g. `https://www.IBM.com/in-en` -> `ibm.com`.
pub fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let parsed = Url::parse(&with_scheme).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    host.contains('.').then(|| host.to_string())
}
