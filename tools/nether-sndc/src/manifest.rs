//! Audio declaration manifest (sounds.toml)
//!
//! One `[[audio]]` table per sound, carrying the per-file settings the
//! compiler needs. A minimal manifest:
//!
//! ```toml
//! out_dir = "build/audio"
//!
//! [[audio]]
//! id = "intro_speech"
//! file = "speech/intro.mp3"
//! subtitle = "DIALOGEVENT:IntroSubTitle"
//! quality = 90
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Quality used when a declaration does not set one.
pub const DEFAULT_QUALITY: u8 = 75;

/// Sample rates the compiler accepts for resampling requests.
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 400..=96000;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("audio entry {index} has an empty id")]
    EmptyId { index: usize },
    #[error("audio '{id}': only .mp3 input is supported, got {file:?}")]
    NotMp3 { id: String, file: PathBuf },
    #[error("audio '{id}': quality {quality} must be between 0 and 100")]
    BadQuality { id: String, quality: u8 },
    #[error("audio '{id}': sample rate {rate} must be between 400 and 96000")]
    BadSampleRate { id: String, rate: u32 },
}

/// Compression applied to an entry's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Xas,
    #[default]
    Ealayer3,
}

/// The manifest document.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Where compiled chunks land unless the command line overrides it.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    #[serde(default)]
    pub audio: Vec<AudioEntry>,
}

/// One sound declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioEntry {
    pub id: String,
    pub file: PathBuf,

    /// Resample target; the source rate is kept when absent.
    #[serde(default)]
    pub sample_rate: Option<u32>,

    #[serde(default)]
    pub compression: Compression,

    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Play location override; see [`AudioEntry::is_streamed`].
    #[serde(default)]
    pub streamed: Option<bool>,

    /// Subtitle string id; see [`AudioEntry::subtitle_or_default`].
    #[serde(default)]
    pub subtitle: Option<String>,
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

impl AudioEntry {
    /// Play location. Unset declarations follow the directory convention:
    /// files under a `sounds/` directory play from RAM, everything else
    /// streams.
    pub fn is_streamed(&self) -> bool {
        self.streamed.unwrap_or_else(|| {
            !self
                .file
                .parent()
                .and_then(|dir| dir.file_name())
                .is_some_and(|name| name.eq_ignore_ascii_case("sounds"))
        })
    }

    /// Declared subtitle id, or the dialog-event id derived from the file
    /// stem.
    pub fn subtitle_or_default(&self) -> String {
        if let Some(subtitle) = &self.subtitle {
            return subtitle.clone();
        }
        let stem = self
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("DIALOGEVENT:{stem}SubTitle")
    }
}

impl Manifest {
    /// Parse and validate manifest text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check every declaration against the compiler's bounds.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (index, entry) in self.audio.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(ManifestError::EmptyId { index });
            }
            let is_mp3 = entry
                .file
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
            if !is_mp3 {
                return Err(ManifestError::NotMp3 {
                    id: entry.id.clone(),
                    file: entry.file.clone(),
                });
            }
            if entry.quality > 100 {
                return Err(ManifestError::BadQuality {
                    id: entry.id.clone(),
                    quality: entry.quality,
                });
            }
            if let Some(rate) = entry.sample_rate {
                if !SAMPLE_RATE_RANGE.contains(&rate) {
                    return Err(ManifestError::BadSampleRate {
                        id: entry.id.clone(),
                        rate,
                    });
                }
            }
        }
        Ok(())
    }
}
