//! Manifest-driven chunk compilation

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use nether_bits::Endianness;
use nether_relo::Chunk;

use crate::asset::{AssetParams, ChannelLayout, CompressionTag, StreamHeader, build_asset};
use crate::manifest::{AudioEntry, Compression, Manifest};
use crate::probe::probe;

/// Compile every declaration in `config`, resolving input paths against
/// `base` (the manifest's directory) and writing chunk files to `out_dir`.
pub fn compile_all(
    config: &Manifest,
    base: &Path,
    out_dir: &Path,
    endianness: Endianness,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    for entry in &config.audio {
        compile_entry(entry, base, out_dir, endianness)?;
    }
    Ok(())
}

/// Compile one declaration into `<id>.bin` + `<id>.relo` + `<id>.imp`.
pub fn compile_entry(
    entry: &AudioEntry,
    base: &Path,
    out_dir: &Path,
    endianness: Endianness,
) -> Result<Chunk> {
    let input = base.join(&entry.file);
    let data = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let stream = probe(&data).with_context(|| format!("probing {}", input.display()))?;

    if let Some(rate) = entry.sample_rate {
        if rate != stream.sample_rate {
            warn!(
                "{}: resampling {} -> {} is not implemented; keeping the source rate",
                entry.id, stream.sample_rate, rate
            );
        }
    }

    let subtitle = entry.subtitle_or_default();
    let header_blob;
    let header_data = if entry.is_streamed() {
        header_blob = StreamHeader {
            compression: compression_tag(entry.compression),
            channels: ChannelLayout::from_channels(stream.channels),
            sample_rate: stream.sample_rate as u16,
            samples: stream.samples,
        }
        .to_bytes(endianness);
        Some(&header_blob[..])
    } else {
        None
    };

    let params = AssetParams {
        subtitle: &subtitle,
        samples: stream.samples,
        sample_rate: stream.sample_rate,
        channels: stream.channels,
        header_data,
    };
    let chunk = build_asset(&params, endianness)?;
    write_chunk(out_dir, &entry.id, &chunk)?;
    info!(
        "{}: {} frames, {} samples -> {}",
        entry.id,
        stream.frame_count,
        stream.samples,
        out_dir.join(format!("{}.bin", entry.id)).display()
    );
    Ok(chunk)
}

/// The stream-header tag for a declared compression setting.
pub fn compression_tag(compression: Compression) -> CompressionTag {
    match compression {
        Compression::None => CompressionTag::Uncompressed,
        Compression::Xas => CompressionTag::Xas,
        Compression::Ealayer3 => CompressionTag::Ealayer3Int,
    }
}

/// Paths the chunk files for `id` land at under `out_dir`.
pub fn chunk_paths(out_dir: &Path, id: &str) -> [PathBuf; 3] {
    [
        out_dir.join(format!("{id}.bin")),
        out_dir.join(format!("{id}.relo")),
        out_dir.join(format!("{id}.imp")),
    ]
}

fn write_chunk(out_dir: &Path, id: &str, chunk: &Chunk) -> Result<()> {
    let [bin, relo, imp] = chunk_paths(out_dir, id);
    fs::write(&bin, &chunk.instance).with_context(|| format!("writing {}", bin.display()))?;
    fs::write(&relo, &chunk.relocations)
        .with_context(|| format!("writing {}", relo.display()))?;
    fs::write(&imp, &chunk.imports).with_context(|| format!("writing {}", imp.display()))?;
    Ok(())
}
