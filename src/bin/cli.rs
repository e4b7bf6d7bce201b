// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Mesh CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use polyframe_mesh::cli::{commands, Reporter, WriteSummary};
use polyframe_mesh::{MeshConfig, MeshingPreset};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "polymesh")]
#[command(about = "Polyframe Mesh - inspect and repair indexed polygon meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print statistics for a mesh file (.stl or .json)
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Remove invalid faces, weld identical vertices and unify orientation
    Clean {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split quads into triangles
    Triangulate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge coplanar triangle pairs into quads
    Quadrangulate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print meshing parameters as TOML
    Params {
        /// Preset name (minimal, default, coarse, smooth)
        preset: Option<MeshingPreset>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    init_logger(&std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()));

    let mut config = MeshConfig::load()?;

    match &cli.command {
        Commands::Info { input } => info_command(input)?,
        Commands::Clean { input, output } => {
            write_command(output, || commands::clean(input, output, &config))?
        }
        Commands::Triangulate { input, output } => {
            write_command(output, || commands::triangulate(input, output))?
        }
        Commands::Quadrangulate { input, output } => {
            write_command(output, || commands::quadrangulate(input, output, &config))?
        }
        Commands::Params { preset } => {
            if let Some(preset) = preset {
                config.preset = *preset;
                config.meshing = None;
            }
            print!("{}", commands::meshing_parameters_toml(&config)?);
        }
        Commands::Version => {
            println!("Polyframe Mesh v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn info_command(input: &Path) -> Result<()> {
    if !input.exists() {
        Reporter::report_error(&format!("Input file not found: {}", input.display()));
        std::process::exit(1);
    }

    let (stats, duration) = commands::info(input)?;
    Reporter::report_stats(&input.display().to_string(), &stats, duration);

    if !stats.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn write_command(output: &Path, run: impl FnOnce() -> Result<WriteSummary>) -> Result<()> {
    let start = Instant::now();
    let summary = run()?;
    if !summary.modified {
        Reporter::report_info("Mesh unchanged");
    }
    Reporter::report_written(
        &output.display().to_string(),
        summary.vertex_count,
        summary.face_count,
        start.elapsed(),
    );
    Ok(())
}

fn init_logger(filters: &str) {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    builder.filter_level(log::LevelFilter::Warn);
    builder.parse_filters(filters);
    builder.format(|buf, record| {
        use std::io::Write;
        let module = record.module_path().unwrap_or(record.target());
        writeln!(
            buf,
            "{} [{}] {}: {}",
            buf.timestamp_millis(),
            record.level(),
            module,
            record.args()
        )
    });

    if let Err(err) = builder.try_init() {
        eprintln!("Failed to initialize logger: {}", err);
    }
}
