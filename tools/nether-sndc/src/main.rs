//! nether-sndc - Nethercore sound compiler
//!
//! Compiles audio declarations (sounds.toml) into relocatable asset chunks
//! (.bin + .relo + .imp) consumed by the engine's runtime loader.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use nether_bits::Endianness;
use nether_sndc::compile::compile_all;
use nether_sndc::manifest::Manifest;
use nether_sndc::probe::probe;

#[derive(Parser)]
#[command(name = "nether-sndc")]
#[command(about = "Nethercore sound compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the frame layout of an MP3 file
    Info {
        /// Input MP3 file
        input: PathBuf,
    },

    /// Validate a manifest without building
    Check {
        /// Path to sounds.toml manifest
        #[arg(default_value = "sounds.toml")]
        manifest: PathBuf,
    },

    /// Build asset chunks from a manifest
    Compile {
        /// Path to sounds.toml manifest
        #[arg(default_value = "sounds.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Emit big-endian images for big-endian consoles
        #[arg(long)]
        big_endian: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            let data =
                fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let stream = probe(&data)?;
            let seconds = f64::from(stream.samples) / f64::from(stream.sample_rate);
            tracing::info!(
                "{}: {} Hz, {} channel(s), {} frames, {} samples ({seconds:.2}s)",
                input.display(),
                stream.sample_rate,
                stream.channels,
                stream.frame_count,
                stream.samples,
            );
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {}", manifest.display());
            load_manifest(&manifest)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Compile {
            manifest,
            out_dir,
            big_endian,
        } => {
            let config = load_manifest(&manifest)?;
            let endianness = if big_endian {
                Endianness::Big
            } else {
                Endianness::Little
            };
            let base = manifest.parent().unwrap_or_else(|| Path::new("."));
            let out_dir = out_dir
                .or_else(|| config.out_dir.clone().map(|dir| base.join(dir)))
                .unwrap_or_else(|| base.to_path_buf());
            compile_all(&config, base, &out_dir, endianness)?;
            tracing::info!("Build complete!");
        }
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    Ok(Manifest::parse(&text)?)
}
