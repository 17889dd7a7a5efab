//! 场地平面命令行程序
//! 读取平面文件，调用几何引擎输出危险判定、吸附/堆叠结果和三维体块数据

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use siteplan_core::config::EngineConfig;
use siteplan_core::math::Point2;
use siteplan_core::object::PlacedObject;
use siteplan_core::snap::snap_gate;
use siteplan_core::stacking::resolve_elevation;
use siteplan_file::config::load_config_or_default;
use siteplan_file::Document;

#[derive(Parser)]
#[command(name = "siteplan")]
#[command(about = "Site plan geometry: hazards, gate snapping, stacking and 3D massing")]
struct Cli {
    /// Engine config (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List line features and whether they cross a hazard
    Hazards {
        /// Plan file (.siteplan or .json)
        plan: PathBuf,
    },

    /// Export the 3D massing of the plan as JSON
    Massing {
        plan: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve where a gate dropped at (x, y) would snap
    Snap {
        plan: PathBuf,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,

        /// Snap distance in plan pixels (default: from config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Resolve the resting elevation of a footprint dropped at (x, y)
    Stack {
        plan: PathBuf,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
    },

    /// Place an object (JSON) into the plan and save it
    Place {
        plan: PathBuf,

        /// Object as JSON, e.g. '{"position":[10,10],"width":60,"height":24,"kind":"symbol","symbol":"container"}'.
        /// A missing or already used id is replaced by a fresh one
        #[arg(long)]
        object: String,

        /// Output file (default: overwrite the plan)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-establish derived fields (elevations, hazard flags) and save
    Normalize {
        plan: PathBuf,

        /// Output file (default: overwrite the plan)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct HazardLine {
    id: u64,
    kind: &'static str,
    at_risk: bool,
}

fn open_plan(path: &Path, config: &EngineConfig) -> Result<Document> {
    Document::open_with_config(path, config)
        .with_context(|| format!("Failed to open plan {}", path.display()))
}

fn write_output<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn save_plan(doc: &mut Document, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => doc
            .save_as(&path)
            .with_context(|| format!("Failed to save {}", path.display())),
        None => doc.save().context("Failed to save plan"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config_or_default(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Command::Hazards { plan } => {
            let doc = open_plan(&plan, &config)?;
            let lines: Vec<HazardLine> = doc
                .objects()
                .iter()
                .filter(|o| o.is_line())
                .map(|o| HazardLine {
                    id: o.id.0,
                    kind: o.kind.type_name(),
                    at_risk: o.at_risk,
                })
                .collect();
            info!(
                "{} of {} lines at risk",
                lines.iter().filter(|l| l.at_risk).count(),
                lines.len()
            );
            write_output(&lines, None)
        }
        Command::Massing { plan, output } => {
            let doc = open_plan(&plan, &config)?;
            let massing = doc.massing(&config);
            info!(
                "Massing: {} blocks, {} fence panels, {} paths",
                massing.blocks.len(),
                massing.fence_panels.len(),
                massing.paths.len()
            );
            write_output(&massing, output.as_deref())
        }
        Command::Snap {
            plan,
            x,
            y,
            width,
            height,
            threshold,
        } => {
            let doc = open_plan(&plan, &config)?;
            let threshold = threshold.unwrap_or(config.snap_threshold);
            let snap = snap_gate(Point2::new(x, y), width, height, doc.objects(), threshold);
            if snap.is_none() {
                info!("No fence within {}px", threshold);
            }
            write_output(&snap, None)
        }
        Command::Stack {
            plan,
            x,
            y,
            width,
            height,
        } => {
            let doc = open_plan(&plan, &config)?;
            let elevation = resolve_elevation(
                Point2::new(x, y),
                width,
                height,
                doc.objects(),
                &config.heights,
            );
            write_output(&elevation, None)
        }
        Command::Place {
            plan,
            object,
            output,
        } => {
            let mut doc = open_plan(&plan, &config)?;
            let object: PlacedObject =
                serde_json::from_str(&object).context("Invalid object JSON")?;
            let id = doc.place(object, &config);
            if let Some(placed) = doc.get(id) {
                info!(
                    "Placed {} at ({:.1}, {:.1}), rotation {:.1}°, elevation {:.2}m",
                    id, placed.position.x, placed.position.y, placed.rotation, placed.elevation
                );
            }
            save_plan(&mut doc, output)
        }
        Command::Normalize { plan, output } => {
            let mut doc = open_plan(&plan, &config)?;
            save_plan(&mut doc, output)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    run(cli)
}
