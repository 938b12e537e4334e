mod batch;
mod probe;

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error, info};
use serde::Serialize;
use muxplan::{
    detect_animation, render, CommandRenderer, MediaSource, MuxPlan, PlanCompiler, PlannerConfig,
};

/// Compile ffmpeg mux plans from probed stream metadata
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (JSON or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// ffprobe binary used for media inputs
    #[arg(long, global = true, default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Treat input as animation (overrides the path keyword heuristic)
    #[arg(long, global = true, conflicts_with = "no_animation")]
    animation: bool,

    /// Treat input as live action (overrides the path keyword heuristic)
    #[arg(long, global = true)]
    no_animation: bool,

    /// Copy the video stream instead of re-encoding it
    #[arg(long, global = true)]
    copy_video: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan a single file (media file, or saved ffprobe JSON report)
    Plan {
        input: PathBuf,
    },
    /// Plan every media file below a directory
    Batch {
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Serialized mux plan
    Json,
    /// One ffmpeg argument per line
    Args,
    /// Full ffmpeg command line
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let cfg = PlannerConfig::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    debug!("Configuration loaded: {:?}", cfg);

    let compiler = PlanCompiler::new(cfg);

    match &args.command {
        Commands::Plan { input } => {
            let (source, plan) = plan_file(&compiler, &args, input).await?;
            println!("{}", format_plan(&source, &plan, args.format, false)?);
        }
        Commands::Batch { dir } => {
            let files = batch::find_media_files(dir);
            let summary = run_batch(&compiler, &args, &files, |line| println!("{}", line)).await;

            info!(
                "Batch complete: {} file(s), {} planned, {} failed",
                summary.total(),
                summary.planned,
                summary.failed
            );
        }
    }

    Ok(())
}

/// Plan each file in turn; a file that fails is logged and skipped
async fn run_batch<F>(compiler: &PlanCompiler, args: &Args, files: &[PathBuf], mut emit: F) -> batch::BatchSummary
where
    F: FnMut(String),
{
    let mut summary = batch::BatchSummary::default();

    for path in files {
        let rendered = plan_file(compiler, args, path)
            .await
            .and_then(|(source, plan)| format_plan(&source, &plan, args.format, true));

        match rendered {
            Ok(line) => {
                emit(line);
                summary.planned += 1;
            }
            Err(e) => {
                // Leave the file untouched and keep going
                error!("Skipping {}: {:#}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Probe and compile one input
async fn plan_file(compiler: &PlanCompiler, args: &Args, input: &Path) -> Result<(MediaSource, MuxPlan)> {
    let probe = probe::load_probe(input, &args.ffprobe).await?;

    // A saved report names the media file it describes
    let id = if probe::is_probe_report(input) {
        probe
            .format
            .as_ref()
            .and_then(|f| f.filename.clone())
            .unwrap_or_else(|| input.display().to_string())
    } else {
        input.display().to_string()
    };

    let is_animation = if args.animation {
        true
    } else if args.no_animation {
        false
    } else {
        detect_animation(&id, &compiler.config().animation_keywords)
    };

    let source = MediaSource::new(id, Some(probe))
        .with_animation(is_animation)
        .with_transcode_video(!args.copy_video);

    let plan = compiler
        .compile(&source)
        .with_context(|| format!("Failed to compile mux plan for: {}", input.display()))?;

    Ok((source, plan))
}

/// Output path next to the source: `<stem>.remux.mkv`
fn output_path(source: &MediaSource) -> PathBuf {
    let path = Path::new(&source.id);
    path.with_file_name(format!("{}.remux.mkv", source.title()))
}

/// One line of batch JSON output
#[derive(Serialize)]
struct BatchRecord<'a> {
    source: &'a str,
    plan: &'a MuxPlan,
}

fn format_plan(source: &MediaSource, plan: &MuxPlan, format: OutputFormat, batch: bool) -> Result<String> {
    let args = CommandRenderer::new().render(plan);

    let rendered = match format {
        OutputFormat::Json if batch => serde_json::to_string(&BatchRecord {
            source: &source.id,
            plan,
        })
        .context("Failed to serialize mux plan")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(plan).context("Failed to serialize mux plan")?
        }
        OutputFormat::Args if batch => format!("# {}\n{}", source.id, args.join("\n")),
        OutputFormat::Args => args.join("\n"),
        OutputFormat::Shell => {
            let output = output_path(source).display().to_string();
            let full = ["-i".to_string(), source.id.clone()]
                .into_iter()
                .chain(args)
                .chain(std::iter::once(output));
            render::shell_line("ffmpeg", full)
        }
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_plan_with_flags() {
        let args = Args::try_parse_from([
            "muxplan", "plan", "movie.json", "--format", "shell", "--animation", "--copy-video",
        ])
        .unwrap();
        assert!(matches!(args.command, Commands::Plan { .. }));
        assert_eq!(args.format, OutputFormat::Shell);
        assert!(args.animation);
        assert!(args.copy_video);
    }

    #[test]
    fn test_animation_flags_conflict() {
        let result = Args::try_parse_from(["muxplan", "batch", "/media", "--animation", "--no-animation"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_skips_failed_files_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let report = r#"{"format": {"filename": "/media/Film.mkv"}, "streams": [{"index": 0, "codec_type": "audio", "channels": 2}]}"#;
        let good = dir.path().join("a.json");
        let broken = dir.path().join("b.json");
        let missing_streams = dir.path().join("c.json");
        std::fs::write(&good, report).unwrap();
        std::fs::write(&broken, "not json").unwrap();
        std::fs::write(&missing_streams, "{}").unwrap();

        let dir_arg = dir.path().display().to_string();
        let args = Args::try_parse_from(["muxplan", "batch", dir_arg.as_str()]).unwrap();
        let compiler = PlanCompiler::new(PlannerConfig::default());
        let files = vec![broken, good, missing_streams];

        let mut lines = Vec::new();
        let summary = run_batch(&compiler, &args, &files, |line| lines.push(line)).await;

        assert_eq!(summary, batch::BatchSummary { planned: 1, failed: 2 });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(r#"{"source":"/media/Film.mkv""#));
    }

    #[test]
    fn test_output_path_next_to_source() {
        let source = MediaSource::new("/media/Movies/Heat (1995).mkv", None);
        assert_eq!(output_path(&source), PathBuf::from("/media/Movies/Heat (1995).remux.mkv"));
    }
}
