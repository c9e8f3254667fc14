// SPDX-License-Identifier: MIT

//! WAV container for raw PCM returned by speech synthesis

use crate::adk::error::{ModelError, ResearcherError};
use serde::{Deserialize, Serialize};

/// PCM layout of synthesized audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveFormat {
    pub channels: u16,
    pub sample_rate: u32,
    /// Bytes per sample
    pub sample_width: u16,
}

impl Default for WaveFormat {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 24_000,
            sample_width: 2,
        }
    }
}

impl WaveFormat {
    /// Reject layouts a RIFF header cannot describe
    ///
    /// Channels and sample rate must be non-zero, samples 1 to 4 bytes wide,
    /// and the byte rate must fit in 32 bits.
    pub fn validate(&self) -> Result<(), ResearcherError> {
        self.layout().map(|_| ())
    }

    /// Block align and byte rate
    fn layout(&self) -> Result<(u16, u32), ResearcherError> {
        if self.channels == 0 {
            return Err(ResearcherError::config("TTS_CHANNELS must be at least 1"));
        }
        if !(1..=4).contains(&self.sample_width) {
            return Err(ResearcherError::config(format!(
                "TTS_SAMPLE_WIDTH must be between 1 and 4 bytes, got {}",
                self.sample_width
            )));
        }
        if self.sample_rate == 0 {
            return Err(ResearcherError::config("TTS_RATE must be at least 1"));
        }

        self.channels
            .checked_mul(self.sample_width)
            .and_then(|align| Some((align, self.sample_rate.checked_mul(u32::from(align))?)))
            .ok_or_else(|| {
                ResearcherError::config(format!(
                    "{} channels of {} bytes at {} Hz overflow the WAV header",
                    self.channels, self.sample_width, self.sample_rate
                ))
            })
    }
}

/// Wrap PCM frames in a canonical 44-byte RIFF/WAVE header
///
/// A trailing partial frame is dropped so the data chunk always holds whole frames.
pub fn encode_wave(pcm: &[u8], format: &WaveFormat) -> Result<Vec<u8>, ResearcherError> {
    let (block_align, byte_rate) = format.layout()?;
    let frames = &pcm[..pcm.len() - pcm.len() % usize::from(block_align)];
    let data_len = u32::try_from(frames.len())
        .ok()
        .filter(|len| *len <= u32::MAX - 36)
        .ok_or_else(|| {
            ModelError::InvalidResponse(format!(
                "{} bytes of audio do not fit in a WAV file",
                frames.len()
            ))
        })?;

    let mut out = Vec::with_capacity(44 + frames.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&(format.sample_width * 8).to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(frames);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_header_for_default_format() {
        let pcm = vec![0u8; 480];
        let wav = encode_wave(&pcm, &WaveFormat::default()).unwrap();

        assert_eq!(wav.len(), 44 + 480);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 480);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 48_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 480);
    }

    #[test]
    fn test_partial_frame_is_dropped() {
        let format = WaveFormat {
            channels: 2,
            sample_rate: 16_000,
            sample_width: 2,
        };
        let wav = encode_wave(&[1, 2, 3, 4, 5, 6], &format).unwrap();
        assert_eq!(u32_at(&wav, 40), 4);
        assert_eq!(&wav[44..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_pcm() {
        let wav = encode_wave(&[], &WaveFormat::default()).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn test_oversized_sample_width_is_rejected() {
        let format = WaveFormat {
            sample_width: 8192,
            ..WaveFormat::default()
        };
        assert!(matches!(
            encode_wave(&[0; 16], &format),
            Err(ResearcherError::Config(_))
        ));
    }

    #[test]
    fn test_byte_rate_overflow_is_rejected() {
        let format = WaveFormat {
            channels: u16::MAX,
            sample_rate: u32::MAX,
            sample_width: 4,
        };
        assert!(format.validate().is_err());

        let silent = WaveFormat {
            channels: 0,
            ..WaveFormat::default()
        };
        assert!(silent.validate().is_err());
    }
}
