//! MP3 stream probing
//!
//! The compiler never decodes audio; it only needs the stream's shape -
//! sample rate, channel count, total samples - which all comes from walking
//! the frame headers.

use thiserror::Error;
use tracing::warn;

use nether_mpeg::{find_frame, frames, id3};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// No parseable frame header anywhere in the buffer
    #[error("no MPEG frame header found")]
    NoFrames,
}

/// Shape of an MP3 stream, taken from its frame headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u8,
    /// Total PCM samples across all frames.
    pub samples: u32,
    pub frame_count: u32,
    /// Byte offset of the first frame, past any ID3v2 tag.
    pub first_frame: usize,
}

/// Walk every frame of `data` and report the stream's shape.
///
/// An ID3v2 tag is skipped first. The first frame fixes the sample rate and
/// channel count; later frames that disagree on channels are counted but
/// flagged, since the engine plays the whole stream with one layout.
pub fn probe(data: &[u8]) -> Result<StreamInfo, ProbeError> {
    let start = id3::tag_size(data)
        .filter(|&size| size < data.len())
        .unwrap_or(0);
    let audio = &data[start..];

    let (first_offset, first) = find_frame(audio, 0).ok_or(ProbeError::NoFrames)?;
    let mut samples = 0u32;
    let mut frame_count = 0u32;
    for (offset, header) in frames(&audio[first_offset..]) {
        if header.channels() != first.channels() {
            warn!(
                offset = start + first_offset + offset,
                "frame channel mode differs from the first frame; \
                 the engine will use the first frame's layout"
            );
        }
        samples = samples.saturating_add(header.samples_per_frame());
        frame_count += 1;
    }

    Ok(StreamInfo {
        sample_rate: first.sample_rate(),
        channels: first.channels(),
        samples,
        frame_count,
        first_frame: start + first_offset,
    })
}
