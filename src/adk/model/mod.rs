// SPDX-License-Identifier: MIT

//! Model module - defines the generative model traits and shared types
//!
//! Steps talk to generative services only through [`Model`] and
//! [`SpeechSynthesizer`]. The Google implementation lives in [gemini].

pub mod gemini;

use crate::adk::error::ResearcherError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// Single text message from the user
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Parts of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Part {
    /// Regular text
    Text(String),
    /// Reference to remote media (e.g. a YouTube URL)
    FileData {
        file_uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// Raw media returned inline by the model (e.g. PCM audio)
    InlineData { mime_type: String, data: Vec<u8> },
}

/// Built-in tools a model may use while generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTool {
    /// Grounding with Google Search
    GoogleSearch,
}

/// A web page the model used to ground its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Result of a generation call
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub parts: Vec<Part>,
    pub sources: Vec<GroundingSource>,
}

impl Generation {
    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Bytes of the first inline-data part
    pub fn inline_data(&self) -> Option<&[u8]> {
        self.parts.iter().find_map(|p| match p {
            Part::InlineData { data, .. } => Some(data.as_slice()),
            _ => None,
        })
    }
}

/// Core trait for generative text models
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        contents: &[Content],
        config: &GenerationConfig,
        tools: &[ModelTool],
    ) -> Result<Generation, ResearcherError>;
}

/// Voice assignment for one speaker of a multi-speaker script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerVoice {
    pub speaker: String,
    pub voice_name: String,
}

impl SpeakerVoice {
    pub fn new(speaker: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            voice_name: voice_name.into(),
        }
    }
}

/// Text-to-speech over a dialogue script, returning raw PCM bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        model: &str,
        script: &str,
        voices: &[SpeakerVoice],
    ) -> Result<Vec<u8>, ResearcherError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_text_joins_text_parts() {
        let generation = Generation {
            parts: vec![
                Part::Text("Hello ".to_string()),
                Part::InlineData {
                    mime_type: "audio/pcm".to_string(),
                    data: vec![1, 2],
                },
                Part::Text("world".to_string()),
            ],
            sources: vec![],
        };
        assert_eq!(generation.text(), "Hello world");
        assert_eq!(generation.inline_data(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn test_generation_without_audio() {
        let generation = Generation {
            parts: vec![Part::Text("only text".to_string())],
            sources: vec![],
        };
        assert!(generation.inline_data().is_none());
    }
}
