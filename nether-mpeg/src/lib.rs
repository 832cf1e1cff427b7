//! Nether-MPEG: MPEG audio frame header codec
//!
//! This crate parses and re-emits the bit-packed 32-bit frame headers of
//! MPEG-1/2/2.5 Layer III (MP3) streams, plus the ID3v2 tag prologue that
//! usually precedes them. It is a header codec only: the sound pipeline
//! needs channel layout, sample rate, and frame boundaries to repackage
//! audio, never a decode of the audio payload itself.
//!
//! # Frame header layout
//!
//! ```text
//! 11 bits  sync (all ones)
//!  2 bits  version (2.5 / reserved / 2 / 1)
//!  2 bits  layer (must be 01 = Layer III)
//!  1 bit   CRC flag (a 2-byte CRC follows the header when set)
//!  4 bits  bitrate index
//!  2 bits  sample rate index
//!  1 bit   padding flag
//!  1 bit   private
//!  2 bits  channel mode
//!  2 bits  mode extension
//!  4 bits  copyright / original / emphasis (carried, not interpreted)
//! ```
//!
//! # Usage
//!
//! ```
//! use nether_mpeg::{FrameHeader, MpegVersion};
//!
//! // 128 kbps, 44100 Hz, stereo MPEG-1 Layer III
//! let header = FrameHeader::parse(&[0xFF, 0xFB, 0x90, 0x00]).unwrap();
//! assert_eq!(header.version, MpegVersion::V1);
//! assert_eq!(header.sample_rate(), 44100);
//! assert_eq!(header.frame_size(), 417);
//! ```

mod header;

pub mod id3;

pub use header::{ChannelMode, FrameHeader, FrameIter, MpegVersion, find_frame, frames};

use core::fmt;
use nether_bits::BitError;

// =============================================================================
// Constants
// =============================================================================

/// Frame sync pattern: the first 11 bits of every frame header are ones
pub const FRAME_SYNC: u16 = 0x07FF;

/// Sample rate by `[version][sample rate index]`, 0 marking reserved slots
pub const SAMPLE_RATE_TABLE: [[u32; 4]; 4] = [
    [11025, 12000, 8000, 0], // V2.5
    [0, 0, 0, 0],            // reserved
    [22050, 24000, 16000, 0], // V2
    [44100, 48000, 32000, 0], // V1
];

/// Bitrate in kbps by `[version][bitrate index]`; index 0 is free-format
/// and index 15 is forbidden, both left at 0
pub const BITRATE_TABLE: [[u32; 16]; 4] = [
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0],
];

/// Samples per Layer III frame, MPEG-1
pub const SAMPLES_PER_FRAME_V1: u32 = 1152;

/// Samples per Layer III frame, MPEG-2 and 2.5
pub const SAMPLES_PER_FRAME_V2: u32 = 576;

// =============================================================================
// Error Type
// =============================================================================

/// MPEG header parsing error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegError {
    /// Buffer too small to contain a frame header
    TooSmall,
    /// Sync bits do not match
    BadSync,
    /// Layer bits are not Layer III
    BadLayer,
    /// Reserved version bits
    BadVersion,
    /// Reserved sample rate index
    BadSampleRate(u8),
    /// Bit-level read failed
    Bits(BitError),
}

impl fmt::Display for MpegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpegError::TooSmall => write!(f, "buffer too small for a frame header"),
            MpegError::BadSync => write!(f, "frame sync bits do not match"),
            MpegError::BadLayer => write!(f, "not an MPEG Layer III frame"),
            MpegError::BadVersion => write!(f, "reserved MPEG version"),
            MpegError::BadSampleRate(index) => {
                write!(f, "reserved sample rate index {index}")
            }
            MpegError::Bits(e) => write!(f, "bit stream error: {e}"),
        }
    }
}

impl std::error::Error for MpegError {}

impl From<BitError> for MpegError {
    fn from(e: BitError) -> Self {
        MpegError::Bits(e)
    }
}
