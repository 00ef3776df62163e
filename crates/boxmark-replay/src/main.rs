//! Boxmark Replay
//!
//! Headless host for the annotation engine: seeds a scene, feeds it a
//! scripted sequence of pointer/keyboard events and host actions, and prints
//! the resulting annotation list as JSON.

mod script;

use boxmark_core::EngineConfig;
use clap::{ArgAction, Parser};
use script::{ImageSpec, ReplayError, Script, replay};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "boxmark-replay",
    version,
    about = "Replay pointer and keyboard scripts through the Boxmark annotation engine"
)]
struct Cli {
    /// Script JSON path
    script: PathBuf,
    /// Image whose dimensions override the script's
    #[arg(long)]
    image: Option<PathBuf>,
    /// Engine config JSON path
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the final frame's draw commands to stderr
    #[arg(long, action = ArgAction::SetTrue)]
    dump_frame: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, ReplayError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn run(cli: &Cli) -> Result<(), ReplayError> {
    let script = Script::load(&cli.script)?;
    let config = load_config(cli.config.as_ref())?;

    let image = match &cli.image {
        Some(path) => {
            let (width, height) = boxmark_render::probe_dimensions(path)?;
            let size = ImageSpec {
                width: width as f64,
                height: height as f64,
            };
            Some((size, path.display().to_string()))
        }
        None => None,
    };

    let outcome = replay(&script, image, config)?;
    log::info!(
        "{} notifications, {} redraws",
        outcome.notifications,
        outcome.redraws
    );

    println!("{}", serde_json::to_string_pretty(&outcome.annotations)?);
    if cli.dump_frame {
        for command in &outcome.frame {
            eprintln!("{:?}", command);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Boxmark replay starting: {}", cli.script.display());

    if let Err(err) = run(&cli) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
