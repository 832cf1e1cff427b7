//! Relocatable audio asset record
//!
//! The runtime record the engine loads for every sound, flattened by the
//! image builder.
//!
//! # Record layout (32 bytes)
//! ```text
//! 0x00: zero marker u32
//! 0x04: subtitle string (length u32 + relocated pointer u32)
//! 0x0C: number of samples u32
//! 0x10: sample rate u32
//! 0x14: stream header data (relocated pointer u32)
//! 0x18: stream header size u32
//! 0x1C: channel count u8 + 3 reserved bytes
//! ```
//!
//! Multi-byte fields are target-endian; the loader reads them in place.

use nether_bits::Endianness;
use nether_relo::{Chunk, ReloError, StringField, Tracker, marshal};

/// Record size; a multiple of 4 so nothing shifts when slots concatenate.
pub const ASSET_SIZE: usize = 32;

/// Field offsets within the record.
pub const OFF_SUBTITLE: usize = 4;
pub const OFF_SAMPLES: usize = OFF_SUBTITLE + StringField::SIZE;
pub const OFF_SAMPLE_RATE: usize = 16;
pub const OFF_HEADER_DATA: usize = 20;
pub const OFF_HEADER_SIZE: usize = 24;
pub const OFF_CHANNELS: usize = 28;

/// Codec tag stored in the stream header.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionTag {
    Uncompressed = 2,
    Xma = 3,
    Xas = 4,
    Ealayer3Int = 5,
    Ealayer3Pcm = 6,
    Ealayer3Spike = 7,
}

/// Channel layout tag stored in the stream header.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono = 0,
    Stereo = 4,
    Quad = 12,
    Surround = 20,
}

impl ChannelLayout {
    /// Layout for a plain channel count; anything above two maps to the
    /// nearest wider layout.
    pub fn from_channels(channels: u8) -> Self {
        match channels {
            0 | 1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            3 | 4 => ChannelLayout::Quad,
            _ => ChannelLayout::Surround,
        }
    }
}

/// The 8-byte header stored ahead of streamed payload data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub compression: CompressionTag,
    pub channels: ChannelLayout,
    pub sample_rate: u16,
    pub samples: u32,
}

impl StreamHeader {
    pub const SIZE: usize = 8;

    /// Serialize with multi-byte fields in target byte order.
    pub fn to_bytes(&self, endianness: Endianness) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.compression as u8;
        bytes[1] = self.channels as u8;
        bytes[2..4].copy_from_slice(&endianness.u16_bytes(self.sample_rate));
        bytes[4..8].copy_from_slice(&endianness.u32_bytes(self.samples));
        bytes
    }
}

/// Everything the record needs from probing and the declaration.
#[derive(Debug, Clone)]
pub struct AssetParams<'a> {
    pub subtitle: &'a str,
    pub samples: u32,
    pub sample_rate: u32,
    pub channels: u8,
    /// Stream header blob for streamed entries; resident entries carry
    /// their header inside the payload file instead.
    pub header_data: Option<&'a [u8]>,
}

/// Build the flattened, loader-ready chunk for one sound.
pub fn build_asset(params: &AssetParams<'_>, endianness: Endianness) -> Result<Chunk, ReloError> {
    let mut tracker = Tracker::new(ASSET_SIZE, endianness)?;
    marshal::write_string(&mut tracker, OFF_SUBTITLE, params.subtitle)?;
    {
        let root = tracker.root();
        endianness.write_u32(root, OFF_SAMPLES, params.samples);
        endianness.write_u32(root, OFF_SAMPLE_RATE, params.sample_rate);
        root[OFF_CHANNELS] = params.channels;
    }
    if let Some(data) = params.header_data {
        endianness.write_u32(tracker.root(), OFF_HEADER_SIZE, data.len() as u32);
        marshal::write_blob(&mut tracker, OFF_HEADER_DATA, data)?;
    }
    tracker.finalize()
}
