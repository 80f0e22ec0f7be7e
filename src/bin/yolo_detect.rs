use std::fs;
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use yolo_detect::{Backend, Detection, DetectionSession, ModelArtifacts, SessionConfig};

/// Run object detection on image files with the darknet CPU/GPU engines.
#[derive(Parser, Debug)]
#[command(name = "yolo-detect", version)]
struct Args {
    /// Network config (.cfg). Requires --weights and --names.
    #[arg(long, requires_all = ["weights", "names"])]
    config: Option<PathBuf>,

    /// Weights file (.weights).
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Class names file, one label per line.
    #[arg(long)]
    names: Option<PathBuf>,

    /// Directory holding one .cfg, one .weights and one .names file.
    #[arg(long, conflicts_with = "config")]
    model_dir: Option<PathBuf>,

    /// JSON session config; command line options override it.
    #[arg(long)]
    session_config: Option<PathBuf>,

    /// Directory with the native engine libraries.
    #[arg(long)]
    engine_dir: Option<PathBuf>,

    /// GPU device index.
    #[arg(long)]
    device: Option<i32>,

    /// Use the CPU engine even if the GPU one is usable.
    #[arg(long)]
    cpu: bool,

    /// Read each image into memory and detect from the buffer.
    #[arg(long)]
    bytes: bool,

    /// Hide detections scoring below this value.
    #[arg(long)]
    min_confidence: Option<f32>,

    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Serialize)]
struct ImageReport<'a> {
    image: &'a PathBuf,
    backend: Backend,
    detections: Vec<Detection>,
}

fn session_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.session_config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };

    if let (Some(cfg), Some(weights), Some(names)) = (&args.config, &args.weights, &args.names) {
        config.artifacts = ModelArtifacts::new(cfg, weights, names);
    } else if let Some(dir) = &args.model_dir {
        config.artifacts = ModelArtifacts::discover(dir)?;
    } else if args.session_config.is_none() {
        config.artifacts = ModelArtifacts::discover_default()
            .context("no model given and none found in the default locations")?;
    }

    if let Some(dir) = &args.engine_dir {
        config = config.with_engine_dir(dir);
    }
    if let Some(device) = args.device {
        config = config.with_device_index(device);
    }
    let prefer_cpu = args.cpu || config.prefer_cpu;
    Ok(config.with_prefer_cpu(prefer_cpu))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = session_config(&args)?;
    log::info!("Model artifacts:\n{}", config.artifacts);

    let session = DetectionSession::from_config(&config)?;
    log::info!("Using {} backend", session.backend());

    let mut failures = 0;
    for image in &args.images {
        let result = if args.bytes {
            fs::read(image)
                .with_context(|| format!("cannot read {}", image.display()))
                .and_then(|bytes| Ok(session.detect_bytes(&bytes)?))
        } else {
            session.detect_path(image).map_err(anyhow::Error::from)
        };

        match result {
            Ok(mut detections) => {
                if let Some(min) = args.min_confidence {
                    detections.retain(|d| d.confidence >= min);
                }
                let report = ImageReport { image, backend: session.backend(), detections };
                println!("{}", serde_json::to_string(&report)?);
            }
            Err(e) => {
                log::error!("{}: {:#}", image.display(), e);
                failures += 1;
            }
        }
    }

    session.dispose();
    if failures > 0 {
        bail!("{} of {} images failed", failures, args.images.len());
    }
    Ok(())
}
