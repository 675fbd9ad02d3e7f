use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lazyview_common::{RootMargin, Threshold};
use lazyview_particles::{FieldConfig, FrameState, ParticleField};
use tracing_subscriber::EnvFilter;

mod scenario;

use scenario::{ComponentKind, Scenario};

#[derive(Parser)]
#[command(name = "lazyview-cli", about = "CLI tool for lazyview components")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Scroll a page past one deferred element and show each rendered step
    Scroll {
        /// Scenario file (YAML); flags below override its values
        #[arg(long)]
        scenario: Option<PathBuf>,
        #[arg(long, value_enum)]
        component: Option<ComponentKind>,
        /// Visible fraction required before mounting (mount only)
        #[arg(long)]
        threshold: Option<f32>,
        /// Root margin in CSS shorthand, e.g. "200px" or "10% 0px"
        #[arg(long)]
        margin: Option<RootMargin>,
        #[arg(long)]
        element_top: Option<f32>,
        #[arg(long)]
        element_height: Option<f32>,
        #[arg(long)]
        viewport_height: Option<f32>,
        /// Pixels scrolled per step
        #[arg(long)]
        step: Option<f32>,
        #[arg(long)]
        steps: Option<usize>,
        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a particle field and print its state at a point in time
    Particles {
        /// Requested point count; zero or negative yields an empty field
        #[arg(short, long, default_value = "2000", allow_negative_numbers = true)]
        count: i64,
        /// Seconds since the animation started
        #[arg(short, long, default_value = "0")]
        elapsed: f32,
        /// RNG seed for a reproducible field
        #[arg(short, long)]
        seed: Option<u64>,
        /// Points to print
        #[arg(long, default_value = "5")]
        sample: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lazyview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lazyview_common::crate_info());
            println!("visibility: {}", lazyview_visibility::crate_info());
            println!("view: {}", lazyview_view::crate_info());
            println!("particles: {}", lazyview_particles::crate_info());
        }
        Commands::Scroll {
            scenario,
            component,
            threshold,
            margin,
            element_top,
            element_height,
            viewport_height,
            step,
            steps,
            json,
        } => {
            let mut s = match scenario {
                Some(path) => Scenario::load(&path)?,
                None => Scenario::default(),
            };
            if let Some(component) = component {
                s.component = component;
            }
            if let Some(t) = threshold {
                s.mount.threshold = Threshold::new(t)?;
            }
            if let Some(margin) = margin {
                s.mount.root_margin = margin;
                s.section.root_margin = margin;
            }
            if let Some(v) = element_top {
                s.element_top = v;
            }
            if let Some(v) = element_height {
                s.element_height = v;
            }
            if let Some(v) = viewport_height {
                s.viewport.height = v;
            }
            if let Some(v) = step {
                s.step = v;
            }
            if let Some(v) = steps {
                s.steps = v;
            }

            let report = s.run();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            for step in &report.steps {
                println!(
                    "step {:>3}  scroll={:>7.1}  {}",
                    step.step,
                    step.scroll_y,
                    step.html
                );
            }
            match report.mounted_at {
                Some(n) => println!("Mounted at step {n}"),
                None => println!("Never mounted"),
            }
        }
        Commands::Particles {
            count,
            elapsed,
            seed,
            sample,
        } => {
            let mut field = ParticleField::from_requested(
                count,
                FieldConfig {
                    seed,
                    ..FieldConfig::default()
                },
            );
            field.on_frame(&FrameState {
                elapsed,
                delta: 0.0,
                frame: 0,
            });

            let scene = field.scene(1280, 720);
            let r = scene.cloud.rotation;
            println!("Points: {}", field.count());
            println!("Positions: {} floats", field.positions().len());
            println!("Rotation: ({:.4}, {:.4}, {:.4}) rad", r.x, r.y, r.z);
            for (i, p) in scene.cloud.points().take(sample).enumerate() {
                println!("  [{i}] ({:.3}, {:.3}, {:.3})", p[0], p[1], p[2]);
            }
        }
    }

    Ok(())
}
