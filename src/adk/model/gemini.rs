// SPDX-License-Identifier: MIT

//! Gemini Model - Google's Gemini API implementation

use super::{
    Content, Generation, GenerationConfig, GroundingSource, Model, ModelTool, Part, SpeakerVoice,
    SpeechSynthesizer,
};
use crate::adk::error::{ModelError, ResearcherError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a GeminiModel from the environment
    ///
    /// Reads `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self, ResearcherError> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .map_err(|_| ModelError::ApiKeyMissing("gemini".to_string()))?;
        Ok(Self::new(api_key))
    }

    async fn post(&self, model: &str, body: &Value) -> Result<Value, ResearcherError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, model, self.api_key
        );

        log::debug!(
            "Gemini request body: {}",
            serde_json::to_string_pretty(body).unwrap_or_default()
        );

        let resp = self.client.post(&url).json(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(ResearcherError::api("gemini", format!("{}: {}", status, text)));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Model for GeminiModel {
    async fn generate_content(
        &self,
        model: &str,
        contents: &[Content],
        config: &GenerationConfig,
        tools: &[ModelTool],
    ) -> Result<Generation, ResearcherError> {
        let contents: Vec<Value> = contents
            .iter()
            .map(|c| {
                let parts: Vec<Value> = c.parts.iter().filter_map(part_to_gemini_json).collect();
                json!({ "role": c.role, "parts": parts })
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config_json(config),
        });

        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(tool_to_gemini_json).collect());
        }

        let resp_json = self.post(model, &body).await?;
        log::debug!("Gemini response: {}", resp_json);

        parse_generation(&resp_json)
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiModel {
    async fn synthesize(
        &self,
        model: &str,
        script: &str,
        voices: &[SpeakerVoice],
    ) -> Result<Vec<u8>, ResearcherError> {
        let speakers: Vec<&str> = voices.iter().map(|v| v.speaker.as_str()).collect();
        let prompt = format!(
            "TTS the following conversation between {}:\n{}",
            speakers.join(" and "),
            script
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": speech_config_json(voices),
            },
        });

        let resp_json = self.post(model, &body).await?;
        let generation = parse_generation(&resp_json)?;
        let Some(audio) = generation.inline_data() else {
            let message = "TTS response contained no audio".to_string();
            return Err(ModelError::InvalidResponse(message).into());
        };

        log::info!("Gemini TTS returned {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}

/// Parts and grounding sources of the first candidate
fn parse_generation(resp_json: &Value) -> Result<Generation, ResearcherError> {
    let candidate = first_candidate(resp_json)?;
    let parts = candidate_parts(candidate)?
        .iter()
        .flat_map(parse_gemini_part)
        .collect();

    Ok(Generation {
        parts,
        sources: parse_grounding_sources(candidate),
    })
}

fn first_candidate(resp_json: &Value) -> Result<&Value, ResearcherError> {
    let candidate = resp_json["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .ok_or_else(|| ModelError::InvalidResponse("No candidates in response".to_string()))?;

    if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
        log::debug!("Gemini finish reason: {}", finish_reason);
        if finish_reason == "SAFETY" {
            return Err(ModelError::Blocked("safety filters".to_string()).into());
        }
    }

    Ok(candidate)
}

fn candidate_parts(candidate: &Value) -> Result<&Vec<Value>, ResearcherError> {
    candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            log::error!("No parts in candidate: {}", candidate);
            ModelError::InvalidResponse(format!("No parts in candidate: {}", candidate)).into()
        })
}

fn generation_config_json(config: &GenerationConfig) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(t) = config.temperature {
        out.insert("temperature".to_string(), json!(t));
    }
    Value::Object(out)
}

fn tool_to_gemini_json(tool: &ModelTool) -> Value {
    match tool {
        ModelTool::GoogleSearch => json!({ "google_search": {} }),
    }
}

fn speech_config_json(voices: &[SpeakerVoice]) -> Value {
    let configs: Vec<Value> = voices
        .iter()
        .map(|v| {
            json!({
                "speaker": v.speaker,
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": v.voice_name } }
            })
        })
        .collect();
    json!({ "multiSpeakerVoiceConfig": { "speakerVoiceConfigs": configs } })
}

/// Serialize a Part to Gemini API JSON format
///
/// Inline media only ever comes back from the model and is not sent.
pub fn part_to_gemini_json(part: &Part) -> Option<Value> {
    match part {
        Part::Text(t) => Some(json!({ "text": t })),
        Part::FileData {
            file_uri,
            mime_type,
        } => {
            let mut fd = json!({ "fileData": { "fileUri": file_uri } });
            if let Some(mime) = mime_type {
                fd["fileData"]["mimeType"] = json!(mime);
            }
            Some(fd)
        }
        Part::InlineData { mime_type, .. } => {
            log::debug!("Not sending inline {} part", mime_type);
            None
        }
    }
}

/// Parse a Gemini API JSON part into Parts
///
/// Thought parts and inline data that is not valid base64 are skipped.
pub fn parse_gemini_part(p: &Value) -> Vec<Part> {
    let mut parts = Vec::new();

    if p.get("thought").and_then(|t| t.as_bool()) == Some(true) {
        return parts;
    }

    if let Some(text) = p["text"].as_str() {
        parts.push(Part::Text(text.to_string()));
    } else if let Some(inline) = p.get("inlineData") {
        let mime_type = inline["mimeType"].as_str().unwrap_or_default().to_string();
        match inline["data"].as_str().map(|d| BASE64.decode(d)) {
            Some(Ok(data)) => parts.push(Part::InlineData { mime_type, data }),
            Some(Err(e)) => log::warn!("Discarding undecodable inline data: {}", e),
            None => {}
        }
    }

    parts
}

/// Collect web grounding chunks of a candidate as sources
pub fn parse_grounding_sources(candidate: &Value) -> Vec<GroundingSource> {
    candidate
        .get("groundingMetadata")
        .and_then(|m| m.get("groundingChunks"))
        .and_then(|c| c.as_array())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| chunk.get("web"))
                .map(|web| GroundingSource {
                    title: web["title"].as_str().unwrap_or("No title").to_string(),
                    uri: web["uri"].as_str().unwrap_or("No URI").to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
