use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tavox::{
    Collaborators, CompileOpts, ProjectBuilder, RemainderPlacement, SampleCache, VoiceRegistry,
};

#[derive(Parser, Debug)]
#[command(
    name = "tavox",
    version,
    about = "Turn a slide deck and a narration script into an MLT video project"
)]
struct Cli {
    /// JSON presentation script.
    #[arg(required_unless_present = "list_voices")]
    script: Option<PathBuf>,

    /// Print the list of available voices.
    #[arg(long)]
    list_voices: bool,

    /// Don't render the video, just create the MLT project.
    #[arg(long)]
    no_video: bool,

    /// Merge consecutive speak commands of the same voice before synthesis.
    #[arg(long)]
    speak_merge: bool,

    /// Give the rounding remainder of slide ranges to the last auto-timed slide instead of the
    /// last slide.
    #[arg(long)]
    remainder_on_auto: bool,

    /// Path of the MLT project file. Defaults to a fresh temporary directory.
    #[arg(long, value_name = "MLT")]
    mlt_project: Option<PathBuf>,

    /// Path of the rendered video. Defaults to `<SCRIPT name>.mkv`.
    #[arg(long, value_name = "PATH")]
    out_path: Option<PathBuf>,

    /// Initial voice.
    #[arg(long, default_value = "default")]
    voice: String,

    /// Script run before the voice is set and SCRIPT runs, e.g. to register custom voices.
    #[arg(long, value_name = "PS")]
    pre_script: Option<PathBuf>,

    /// Sample cache directory.
    #[arg(long, env = "TAVOX_CACHE_DIR", value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Enable debug output.
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let fallback = if debug { "tavox=debug" } else { "tavox=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    tracing::debug!("debug output enabled");

    let registry = VoiceRegistry::with_builtin_voices()?;
    if cli.list_voices {
        for name in registry.available_voices() {
            println!("{name}");
        }
        return Ok(());
    }
    let Some(script) = cli.script.as_deref() else {
        anyhow::bail!("no script given");
    };

    let cwd = std::env::current_dir().context("determine working directory")?;
    let mut builder = ProjectBuilder::new(registry, &cwd)?;
    if let Some(pre) = &cli.pre_script {
        tavox::run_script(pre, &mut builder)?;
    }
    builder.set_voice(&cli.voice)?;
    tavox::run_script(script, &mut builder)?;
    let project = builder.finish();

    let script_name = script
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", script.display()))?;
    let mlt_path = match &cli.mlt_project {
        Some(p) => p.clone(),
        None => {
            let dir = tempfile::Builder::new()
                .prefix("tavox_")
                .tempdir()
                .context("create temporary project directory")?
                .keep();
            dir.join(format!("{script_name}.mlt"))
        }
    };

    let cache_root = match cli.cache_dir {
        Some(dir) => dir,
        None => SampleCache::default_root()
            .context("cannot determine the home directory for the sample cache")?,
    };
    let cache = SampleCache::open(&cache_root)?;

    let opts = CompileOpts {
        merge_speech: cli.speak_merge,
        remainder: if cli.remainder_on_auto {
            RemainderPlacement::LastAutoFrame
        } else {
            RemainderPlacement::LastFrame
        },
    };
    let report = tavox::compile_project(
        &project,
        &mlt_path,
        &Collaborators::system(),
        &cache,
        &opts,
    )?;
    eprintln!("wrote {}", report.project_file.display());

    if !cli.no_video {
        let out = cli
            .out_path
            .unwrap_or_else(|| PathBuf::from(format!("{script_name}.mkv")));
        render(&report.project_file, &out)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn render(project: &Path, out: &Path) -> anyhow::Result<()> {
    tracing::info!("rendering video");
    tavox::tools::render::render_video(project, out)
        .with_context(|| format!("render '{}'", project.display()))
}
