//! Mesh Viewer
//!
//! Browse a directory of meshes with an orbit camera and switchable shading.
//!
//! # Usage
//!
//! ```bash
//! mesh_viewer --models assets/models --textures assets/textures
//! mesh_viewer --config viewer.toml --room
//! mesh_viewer --print-config > viewer.toml
//! ```
//!
//! # Controls
//!
//! - Left drag: orbit
//! - Shift + left drag, scroll: zoom
//! - N / P: next / previous model
//! - S (Shift+S): next (previous) shader
//! - T (Shift+T): next (previous) texture
//! - L: toggle light motion
//! - ESC: quit

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use meshview_visualization::{InteractiveViewer, ViewerConfig};

#[derive(Parser)]
#[command(name = "mesh_viewer")]
#[command(author, version, about = "Interactive orbit-camera mesh viewer")]
struct Args {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory of meshes to browse
    #[arg(long, short = 'm')]
    models: Option<PathBuf>,

    /// Directory of textures to cycle through
    #[arg(long, short = 't')]
    textures: Option<PathBuf>,

    /// Surround the model with a fogged, textured room
    #[arg(long)]
    room: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = ViewerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(models) = args.models {
        config.models_dir = models;
    }
    if let Some(textures) = args.textures {
        config.textures_dir = textures;
    }
    if args.room {
        config.room.enabled = true;
    }

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    tracing::info!(
        models = %config.models_dir.display(),
        textures = %config.textures_dir.display(),
        room = config.room.enabled,
        "Configuration resolved"
    );

    InteractiveViewer::new(config)?.run()?;
    Ok(())
}
