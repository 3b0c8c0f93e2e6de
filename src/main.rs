use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hand_synth::config::SynthConfig;
use hand_synth::export::DirectorySink;
use hand_synth::projector;
use hand_synth::render::{FrameRenderer, SoftwareRenderer};
use hand_synth::rig::{self, JointKey};
use hand_synth::sweep::DatasetSweep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pose sweep and write frames plus annotations.json
    Sweep(SweepArgs),
    /// Render a single hand pose and print its bounding box
    Pose(PoseArgs),
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// YAML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory, overrides output.dir
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Pause between ticks in milliseconds, overrides output.tick_delay_ms
    #[arg(long)]
    tick_delay_ms: Option<u64>,

    /// Only write annotations.json
    #[arg(long, default_value_t = false)]
    no_images: bool,
}

#[derive(Args, Debug)]
struct PoseArgs {
    /// YAML config file for viewport, camera and lighting
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Joint angle in degrees, e.g. `--set index_1=-45` (repeatable)
    #[arg(long = "set", value_parser = parse_joint_angle)]
    angles: Vec<(JointKey, f64)>,

    /// Write the rendered frame to this PNG
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn parse_joint_angle(s: &str) -> Result<(JointKey, f64), String> {
    let (key, angle) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=DEGREES, got '{s}'"))?;
    let key: JointKey = key.trim().parse().map_err(|e| format!("{e}"))?;
    let angle: f64 = angle
        .trim()
        .parse()
        .map_err(|_| format!("invalid angle '{angle}'"))?;
    Ok((key, angle))
}

fn load_config(path: Option<&PathBuf>) -> Result<SynthConfig> {
    match path {
        Some(path) => {
            let config = SynthConfig::load(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(SynthConfig::default()),
    }
}

fn run_sweep(args: SweepArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(out) = args.out {
        config.output.dir = out;
    }
    if let Some(delay) = args.tick_delay_ms {
        config.output.tick_delay_ms = delay;
    }
    if args.no_images {
        config.output.save_images = false;
    }

    let sink = DirectorySink::new(&config.output.dir)?;
    let renderer = SoftwareRenderer::new(config.render.clone());
    let mut sweep = DatasetSweep::from_config(&config, renderer, sink)?;
    let summary = sweep.run()?;

    println!(
        "Wrote {} frames ({} with a detection) to {}",
        summary.captured,
        summary.detections,
        config.output.dir.display()
    );
    Ok(())
}

fn run_pose(args: PoseArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    config.validate()?;

    let mut hand = rig::build_hand().context("Failed to build hand rig")?;
    for (key, angle) in &args.angles {
        if !hand.set_joint_angle(&key.to_string(), *angle) {
            warn!("Joint {} not present in rig", key);
        }
    }

    let camera = config.camera();
    let mut renderer = SoftwareRenderer::new(config.render.clone());
    let image = renderer.render(&hand, &camera, config.viewport)?;
    let bbox = projector::project(&hand, &camera, config.viewport);

    if let Some(out) = &args.out {
        image
            .save(out)
            .with_context(|| format!("Failed to write image {}", out.display()))?;
        info!("Wrote {}", out.display());
    }

    match bbox {
        Some(b) => println!("{}", serde_json::to_string(&b)?),
        None => println!("[]"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hand_synth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Sweep(args) => run_sweep(args),
        Command::Pose(args) => run_pose(args),
    }
}
