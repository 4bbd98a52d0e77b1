use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gridatlas_core::config::{self, AtlasConfig};
use gridatlas_core::report::{placement_line, ConsoleReporter, NO_IMAGES_MESSAGE};
use gridatlas_core::VERSION;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gridatlas", version = VERSION, about = "Pack a folder of images into a uniform grid texture atlas")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct Inputs {
    /// YAML config; flags given here take precedence over it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Folder holding the source images
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Fixed column count (default: ceil(sqrt(image count)))
    #[arg(long, short)]
    columns: Option<u32>,
    /// Sort inputs by name instead of directory listing order
    #[arg(long)]
    sort: bool,
}

impl Inputs {
    fn resolve(&self) -> Result<AtlasConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_path(path).with_context(|| format!("loading {}", path.display()))?,
            None => AtlasConfig::default(),
        };
        if let Some(dir) = &self.input { cfg.input_dir = dir.clone(); }
        if self.columns.is_some() { cfg.columns = self.columns; }
        cfg.sort |= self.sort;
        Ok(cfg)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the atlas and write it to disk
    Pack {
        #[command(flatten)]
        inputs: Inputs,
        /// Atlas file to write; its extension picks the encoder
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the grid and placements without writing anything
    Plan {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Pack { inputs, output } => {
            let mut cfg = inputs.resolve()?;
            if let Some(out) = output { cfg.output = out; }
            let options = cfg.build_options()?;
            gridatlas_core::build(&cfg.input_dir, &cfg.output, &options, &mut ConsoleReporter)?;
        }
        Command::Plan { inputs } => {
            let cfg = inputs.resolve()?;
            let options = cfg.build_options()?;
            match gridatlas_core::plan(&cfg.input_dir, &options)? {
                None => println!("{NO_IMAGES_MESSAGE}"),
                Some((layout, placements)) => {
                    let (w, h) = layout.canvas_size();
                    println!(
                        "grid: {}x{} cells of {}x{} px, atlas {}x{} px",
                        layout.columns, layout.rows, layout.cell_width, layout.cell_height, w, h
                    );
                    for p in &placements { println!("{}", placement_line(p)); }
                }
            }
        }
    }
    Ok(())
}
