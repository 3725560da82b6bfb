//! Replay a recorded or simulated pose stream through the analysis core.
//!
//! Input is JSON lines, one frame per line: `{"keypoints": [[x, y, conf], ...]}`
//! in COCO order, or `null` for a frame with no detected body. Each frame's
//! analysis is written to stdout as one JSON line; logs go to stderr.

use clap::Parser;
use repcount_core::analysis::{ExerciseKind, FrameAnalyzer, Session};
use repcount_core::config::{ConfigLoader, LoggingConfig, SystemConfig};
use repcount_core::error::CoreError;
use repcount_core::error_context;
use repcount_core::pose::{PoseSnapshot, PoseSource};
use serde::Deserialize;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "hot-reload")]
use repcount_core::analysis::RuleTable;
#[cfg(feature = "hot-reload")]
use std::sync::Arc;
#[cfg(feature = "hot-reload")]
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "repcount-replay",
    version,
    about = "Count reps and check form on a recorded or simulated pose stream",
    long_about = None,
)]
struct Args {
    /// Extra config file, applied over the standard search path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exercise to analyze (bicep_curl, upright_row, front_raise)
    #[arg(long)]
    exercise: Option<ExerciseKind>,

    /// JSON lines file to replay; stdin when neither this nor --simulate is given
    #[arg(long, conflicts_with = "simulate")]
    input: Option<PathBuf>,

    /// Generate this many synthetic reps instead of reading input
    #[arg(long)]
    simulate: Option<u32>,

    /// Reflect x coordinates for frames this many pixels wide (selfie view)
    #[arg(long)]
    mirror_width: Option<f32>,

    /// Frames per synthetic rep
    #[arg(long, default_value_t = 30)]
    frames_per_rep: u32,

    /// Coordinate noise for synthetic frames, pixels
    #[arg(long, default_value_t = 0.0)]
    jitter: f32,

    /// Probability of a dropped synthetic frame
    #[arg(long, default_value_t = 0.0)]
    dropout: f32,

    /// Upper-body sway for synthetic frames, pixels
    #[arg(long, default_value_t = 0.0)]
    sway: f32,

    /// Seed for synthetic frames
    #[arg(long)]
    seed: Option<u64>,

    /// Rebuild the rule table when config files change
    #[cfg(feature = "hot-reload")]
    #[arg(long, default_value_t = false)]
    watch: bool,
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    keypoints: Vec<[f32; 3]>,
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("input exhausted")]
    Exhausted,

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Pose source over JSON lines
struct JsonLinesSource<R: BufRead> {
    name: String,
    lines: Lines<R>,
    line_number: usize,
    next_line: Option<io::Result<(usize, String)>>,
}

impl<R: BufRead> JsonLinesSource<R> {
    fn new(name: impl Into<String>, reader: R) -> Self {
        let mut source = Self {
            name: name.into(),
            lines: reader.lines(),
            line_number: 0,
            next_line: None,
        };
        source.prefetch();
        source
    }

    fn prefetch(&mut self) {
        self.next_line = loop {
            match self.lines.next() {
                None => break None,
                Some(Err(e)) => break Some(Err(e)),
                Some(Ok(line)) => {
                    self.line_number += 1;
                    if !line.trim().is_empty() {
                        break Some(Ok((self.line_number, line)));
                    }
                }
            }
        };
    }
}

impl<R: BufRead> PoseSource for JsonLinesSource<R> {
    type Error = ReplayError;

    fn next_pose(&mut self) -> Result<Option<PoseSnapshot>, Self::Error> {
        let (line_number, line) = match self.next_line.take() {
            None => return Err(ReplayError::Exhausted),
            Some(result) => result?,
        };
        self.prefetch();

        let record: Option<FrameRecord> =
            serde_json::from_str(&line).map_err(|source| ReplayError::Parse { line: line_number, source })?;
        Ok(record.map(|record| PoseSnapshot::from_coco_rows(&record.keypoints)))
    }

    fn is_exhausted(&self) -> bool {
        self.next_line.is_none()
    }

    fn describe(&self) -> String {
        format!("json lines from {}", self.name)
    }
}

/// Selfie-view frames arrive reflected; undo that when a width is given
fn mirror_frame(pose: Option<PoseSnapshot>, mirror_width: Option<f32>) -> Option<PoseSnapshot> {
    match mirror_width {
        Some(width) => pose.map(|p| p.mirrored(width)),
        None => pose,
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<(ConfigLoader, SystemConfig), Box<dyn Error>> {
    let mut loader = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            ConfigLoader::with_override_file(path)
        }
        None => ConfigLoader::new(),
    };
    let config = loader.load_system_config()?;
    Ok((loader, config))
}

fn run<S: PoseSource>(
    mut source: S,
    args: &Args,
    loader: &mut ConfigLoader,
    config: &SystemConfig,
) -> Result<(), Box<dyn Error>> {
    let exercise = args.exercise.unwrap_or(config.session.default_exercise);
    let mut session = Session::new(exercise, config.session.reps_per_set)?;
    let mut analyzer = FrameAnalyzer::from_config(config)?;

    info!(
        source = %source.describe(),
        exercise = exercise.display_name(),
        reps_per_set = session.reps_per_set(),
        "Starting replay"
    );
    info!("Tip: {}", exercise.coaching_tip());

    #[cfg(feature = "hot-reload")]
    let updates = if args.watch {
        let updates = loader.subscribe();
        loader.enable_hot_reload()?;
        Some(updates)
    } else {
        None
    };
    #[cfg(not(feature = "hot-reload"))]
    let _ = loader;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    while !source.is_exhausted() {
        #[cfg(feature = "hot-reload")]
        if let Some(updates) = &updates {
            for new_config in updates.try_iter() {
                match RuleTable::from_config(&new_config) {
                    Ok(table) => analyzer.set_rules(Arc::new(table)),
                    Err(e) => warn!(error = %e, "Reloaded thresholds rejected"),
                }
            }
        }

        let pose = source.next_pose().map_err(|e| {
            let context = error_context!("replay", "next_pose")
                .add_info("frame", analyzer.metrics().frames_processed.to_string());
            CoreError::from_source(context, source.describe(), e)
        })?;
        let pose = mirror_frame(pose, args.mirror_width);

        let output = analyzer.analyze(&mut session, pose.as_ref());
        serde_json::to_writer(&mut out, &output)?;
        writeln!(out)?;
    }
    out.flush()?;

    let metrics = analyzer.metrics();
    info!(
        sets = session.set_count(),
        reps = session.rep_count(),
        frames = metrics.frames_processed,
        rejected = metrics.frames_rejected(),
        warnings = metrics.warnings_issued,
        avg_us = metrics.average_processing_time_us,
        max_us = metrics.max_processing_time_us,
        "Replay finished"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let (mut loader, config) = load_config(&args)?;
    init_logging(&config.logging);

    if let Some(reps) = args.simulate {
        #[cfg(feature = "simulation")]
        {
            use repcount_core::pose::{PoseSimulator, SimulatorConfig};

            let mut sim_config = SimulatorConfig::for_reps(args.exercise.unwrap_or(config.session.default_exercise), reps);
            sim_config.frames_per_rep = args.frames_per_rep;
            sim_config.jitter_px = args.jitter;
            sim_config.dropout_probability = args.dropout;
            sim_config.torso_sway_px = args.sway;
            if let Some(seed) = args.seed {
                sim_config.seed = seed;
            }
            return run(PoseSimulator::new(sim_config)?, &args, &mut loader, &config);
        }
        #[cfg(not(feature = "simulation"))]
        {
            let _ = reps;
            return Err("--simulate requires the `simulation` feature".into());
        }
    }

    match &args.input {
        Some(path) => {
            let file = File::open(path)?;
            let source = JsonLinesSource::new(path.display().to_string(), BufReader::new(file));
            run(source, &args, &mut loader, &config)
        }
        None => {
            let stdin = io::stdin();
            let source = JsonLinesSource::new("stdin", stdin.lock());
            run(source, &args, &mut loader, &config)
        }
    }
}
