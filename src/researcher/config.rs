// SPDX-License-Identifier: MIT

//! Pipeline configuration
//!
//! Every setting has a default. A YAML file may override any subset of them,
//! and an environment variable named after the field in upper case (for
//! example `SEARCH_MODEL`) overrides both.

use crate::adk::error::ResearcherError;
use crate::adk::model::SpeakerVoice;
use crate::adk::speech::WaveFormat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings of the content-research pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResearchConfig {
    pub search_model: String,
    pub search_temperature: f32,
    pub video_model: String,
    pub synthesis_model: String,
    pub synthesis_temperature: f32,
    pub podcast_script_temperature: f32,
    pub tts_model: String,
    pub mike_voice: String,
    pub sarah_voice: String,
    pub tts_channels: u16,
    pub tts_rate: u32,
    pub tts_sample_width: u16,
    pub lead_identification_model: String,
    pub lead_identification_temperature: f32,
    pub contact_search_results: u32,
    /// Where podcast audio is written before upload
    pub output_dir: PathBuf,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            search_model: "gemini-2.5-flash".to_string(),
            search_temperature: 0.0,
            video_model: "gemini-2.5-flash".to_string(),
            synthesis_model: "gemini-2.5-flash".to_string(),
            synthesis_temperature: 0.3,
            podcast_script_temperature: 0.4,
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            mike_voice: "Kore".to_string(),
            sarah_voice: "Puck".to_string(),
            tts_channels: 1,
            tts_rate: 24_000,
            tts_sample_width: 2,
            lead_identification_model: "gemini-2.5-flash".to_string(),
            lead_identification_temperature: 0.2,
            contact_search_results: 10,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ResearchConfig {
    pub fn wave_format(&self) -> WaveFormat {
        WaveFormat {
            channels: self.tts_channels,
            sample_rate: self.tts_rate,
            sample_width: self.tts_sample_width,
        }
    }

    /// Voices of the two podcast speakers
    pub fn voices(&self) -> Vec<SpeakerVoice> {
        vec![
            SpeakerVoice::new("Mike", &self.mike_voice),
            SpeakerVoice::new("Dr. Sarah", &self.sarah_voice),
        ]
    }
}

/// Settings of the lead-only pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeadConfig {
    pub lead_search_model: String,
    pub report_generation_model: String,
    pub lead_search_temperature: f32,
    pub report_generation_temperature: f32,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            lead_search_model: "gemini-1.5-flash-latest".to_string(),
            report_generation_model: "gemini-1.5-flash-latest".to_string(),
            lead_search_temperature: 0.2,
            report_generation_temperature: 0.5,
        }
    }
}

/// HTTP front end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            request_timeout_secs: 300,
        }
    }
}

/// Defaults, then YAML, then environment
pub trait Layered: Serialize + DeserializeOwned + Default {
    /// Cross-field checks run after every layer
    fn validate(&self) -> Result<(), ResearcherError> {
        Ok(())
    }

    /// Parse a YAML override; absent fields keep their defaults
    fn parse_yaml(content: &str) -> Result<Self, ResearcherError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional YAML file and the process environment
    fn load(path: Option<&Path>) -> Result<Self, ResearcherError> {
        let base = match path {
            Some(p) => {
                log::info!("Loading configuration from {}", p.display());
                Self::parse_yaml(&fs::read_to_string(p)?)?
            }
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup(FIELD_NAME)`
    fn with_env<F>(self, lookup: F) -> Result<Self, ResearcherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut value = serde_json::to_value(&self)?;
        let Some(fields) = value.as_object_mut() else {
            return Ok(self);
        };

        for (name, current) in fields.iter_mut() {
            let key = name.to_uppercase();
            let Some(raw) = lookup(&key).filter(|v| !v.is_empty()) else {
                continue;
            };
            log::debug!("Config field {} overridden by environment", name);
            *current = env_value(current, &raw).ok_or_else(|| {
                ResearcherError::config(format!("{} has an invalid value: {}", key, raw))
            })?;
        }

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }
}

impl Layered for ResearchConfig {
    fn validate(&self) -> Result<(), ResearcherError> {
        self.wave_format().validate()
    }
}

impl Layered for LeadConfig {}
impl Layered for ServerConfig {}

/// Coerce an environment string to the JSON type of the field it overrides
fn env_value(current: &Value, raw: &str) -> Option<Value> {
    match current {
        Value::Number(n) if n.is_f64() => raw.parse::<f64>().ok().map(Value::from),
        Value::Number(_) => raw.parse::<u64>().ok().map(Value::from),
        Value::Bool(_) => raw.parse::<bool>().ok().map(Value::from),
        _ => Some(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_research_defaults() {
        let config = ResearchConfig::default();
        assert_eq!(config.search_model, "gemini-2.5-flash");
        assert_eq!(config.tts_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.wave_format(), WaveFormat::default());
        assert_eq!(config.contact_search_results, 10);
        assert_eq!(config.voices()[1], SpeakerVoice::new("Dr. Sarah", "Puck"));
    }

    #[test]
    fn test_yaml_overrides_subset() {
        let yaml = r#"
search_model: gemini-2.5-pro
synthesis_temperature: 0.7
output_dir: /tmp/podcasts
"#;
        let config = ResearchConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.search_model, "gemini-2.5-pro");
        assert!((config.synthesis_temperature - 0.7).abs() < 1e-6);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/podcasts"));
        assert_eq!(config.video_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_yaml_rejects_unknown_field() {
        assert!(ResearchConfig::parse_yaml("search_modle: x\n").is_err());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(LeadConfig::parse_yaml("").unwrap(), LeadConfig::default());
    }

    #[test]
    fn test_env_overrides_yaml() {
        let config = ResearchConfig::parse_yaml("search_model: from-yaml\n")
            .unwrap()
            .with_env(env(&[
                ("SEARCH_MODEL", "from-env"),
                ("TTS_RATE", "16000"),
                ("SEARCH_TEMPERATURE", "0.5"),
            ]))
            .unwrap();
        assert_eq!(config.search_model, "from-env");
        assert_eq!(config.tts_rate, 16_000);
        assert!((config.search_temperature - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_env_integer_into_float_field() {
        let config = LeadConfig::default()
            .with_env(env(&[("LEAD_SEARCH_TEMPERATURE", "1")]))
            .unwrap();
        assert!((config.lead_search_temperature - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_env_invalid_number() {
        let err = ServerConfig::default()
            .with_env(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ResearcherError::Config(_)));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config = ServerConfig::default()
            .with_env(env(&[("PORT", "")]))
            .unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_env_rejects_unusable_wave_format() {
        let err = ResearchConfig::default()
            .with_env(env(&[("TTS_SAMPLE_WIDTH", "8192")]))
            .unwrap_err();
        assert!(matches!(err, ResearcherError::Config(_)));

        assert!(ResearchConfig::parse_yaml("tts_channels: 0\n").is_err());
    }
}
