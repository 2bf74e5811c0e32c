//! HTTPS client for the hosted Gemini `generateContent` endpoint.

use super::{build_prompt, parse_curriculum, response_schema, CurriculumGenerator, GenerationRequest};
use crate::config::AppConfig;
use crate::error::GenerationError;
use crate::types::{Curriculum, GroundingSource};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

// ---- response wire types ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    /// Thought summaries are not part of the answer
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated answer text of the first candidate
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Web citations of the first candidate, order kept, duplicates kept.
    /// `None` when the service sent no citation metadata at all.
    pub fn grounding_sources(&self) -> Option<Vec<GroundingSource>> {
        let metadata = self.candidates.first()?.grounding_metadata.as_ref()?;
        let sources: Vec<GroundingSource> = metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.clone()?;
                Some(GroundingSource {
                    title: web.title.clone().unwrap_or_else(|| uri.clone()),
                    uri,
                })
            })
            .collect();

        if sources.is_empty() {
            None
        } else {
            Some(sources)
        }
    }

    /// Validate the answer and attach citations
    pub fn into_curriculum(self) -> Result<Curriculum, GenerationError> {
        let mut curriculum = parse_curriculum(&self.text())?;
        curriculum.grounding_sources = self.grounding_sources();
        Ok(curriculum)
    }
}

// ---- client ----

/// Generator backed by the Gemini REST API
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    thinking_budget: u32,
    search_grounding: bool,
}

impl GeminiClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            thinking_budget: config.thinking_budget,
            search_grounding: config.search_grounding,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// JSON body for one `generateContent` call
    pub fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(request) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "thinkingConfig": { "thinkingBudget": self.thinking_budget }
            }
        });
        if self.search_grounding {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }
        body
    }
}

#[async_trait]
impl CurriculumGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Curriculum, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Configuration("set GEMINI_API_KEY or API_KEY".to_string())
            })?;

        log::info!(
            "[GENERATOR] Requesting {} for '{}' from {}",
            if request.is_refinement() { "refinement" } else { "curriculum" },
            request.topic,
            self.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            log::warn!("[GENERATOR] Service returned HTTP {}: {}", status.as_u16(), body);
            return Err(GenerationError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let raw = response.text().await?;
        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parsed.into_curriculum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::parse::tests::VALID;
    use crate::types::Focus;

    fn response_with(text: &str, grounding: Option<serde_json::Value>) -> GenerateContentResponse {
        let mut candidate = json!({
            "content": { "role": "model", "parts": [
                { "text": "planning the modules...", "thought": true },
                { "text": text }
            ]}
        });
        if let Some(g) = grounding {
            candidate["groundingMetadata"] = g;
        }
        serde_json::from_value(json!({ "candidates": [candidate] })).unwrap()
    }

    #[test]
    fn test_text_skips_thoughts() {
        let response = response_with("{\"a\":1}", None);
        assert_eq!(response.text(), "{\"a\":1}");
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let response = GenerateContentResponse::default();
        assert_eq!(response.into_curriculum(), Err(GenerationError::EmptyResponse));
    }

    #[test]
    fn test_grounding_absent_leaves_field_unset() {
        let curriculum = response_with(VALID, None).into_curriculum().unwrap();
        assert!(curriculum.grounding_sources.is_none());
    }

    #[test]
    fn test_grounding_keeps_order_and_duplicates() {
        let grounding = json!({ "groundingChunks": [
            { "web": { "uri": "https://a.example", "title": "A" } },
            { "web": { "uri": "https://b.example", "title": "B" } },
            { "web": { "uri": "https://a.example", "title": "A" } },
            { "retrievedContext": {} }
        ]});
        let curriculum = response_with(VALID, Some(grounding)).into_curriculum().unwrap();
        let sources = curriculum.grounding_sources.unwrap();
        let uris: Vec<&str> = sources.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(uris, vec!["https://a.example", "https://b.example", "https://a.example"]);
    }

    #[test]
    fn test_request_body_declares_schema() {
        let client = GeminiClient::from_config(&AppConfig {
            search_grounding: true,
            ..AppConfig::default()
        })
        .unwrap();
        let request = GenerationRequest::new("Rust", Focus::Balanced, "Beginner", vec![]);
        let body = client.request_body(&request);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 4000);
        assert!(body["tools"].is_array());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_call() {
        let client = GeminiClient::from_config(&AppConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        })
        .unwrap();
        let request = GenerationRequest::new("Rust", Focus::Balanced, "Beginner", vec![]);
        let result = client.generate(&request).await;
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }
}
