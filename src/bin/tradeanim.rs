use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;

use tradeanim::generate::mock::mock_series;
use tradeanim::generate::pattern::{Pattern, pattern};
use tradeanim::generate::trend::{TrendKind, TrendParams, trend};

#[derive(Parser, Debug)]
#[command(name = "tradeanim", version)]
struct Cli {
    /// Settings JSON (every field optional).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic candle series as a project JSON.
    #[command(subcommand)]
    Generate(GenerateCmd),
    /// Import a `time,open,high,low,close[,volume]` CSV as a project JSON.
    ImportCsv(ImportCsvArgs),
    /// Extract candles from a chart screenshot through an external vision program.
    Analyze(AnalyzeArgs),
    /// Apply a JSON list of editor actions to a project.
    Apply(ApplyArgs),
    /// Write one frame of the animation as SVG.
    Svg(StillArgs),
    /// Render one frame of the animation as a PNG.
    Frame(StillArgs),
    /// Render the animation to MP4 or WebM (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Subcommand, Debug)]
enum GenerateCmd {
    /// Biased trend from 10000 (60 candles, 1 minute apart).
    Trend {
        #[arg(long, value_enum, default_value_t = TrendChoice::Uptrend)]
        kind: TrendChoice,
        #[arg(long, default_value_t = 60)]
        count: usize,
        #[command(flatten)]
        common: GenerateCommon,
    },
    /// Named chart pattern.
    Pattern {
        #[arg(long, value_enum, default_value_t = PatternChoice::BullFlag)]
        pattern: PatternChoice,
        #[arg(long, default_value_t = 60)]
        count: usize,
        #[arg(long, default_value_t = 100.0)]
        start: f64,
        #[command(flatten)]
        common: GenerateCommon,
    },
    /// Market-like mock data, 15 minutes apart.
    Mock {
        #[arg(long, default_value_t = 60)]
        count: usize,
        #[arg(long, default_value_t = 65_000.0)]
        start: f64,
        #[command(flatten)]
        common: GenerateCommon,
    },
}

#[derive(Args, Debug)]
struct GenerateCommon {
    /// RNG seed; omit for a random series.
    #[arg(long)]
    seed: Option<u64>,
    /// Output project JSON (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TrendChoice {
    Uptrend,
    Downtrend,
    Ranging,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PatternChoice {
    BullFlag,
    RandomWalk,
}

#[derive(Args, Debug)]
struct ImportCsvArgs {
    #[arg(long = "in")]
    in_path: PathBuf,
    /// Output project JSON (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Chart screenshot.
    #[arg(long)]
    image: PathBuf,
    /// Vision program; the image path is appended to its arguments.
    #[arg(long)]
    program: PathBuf,
    /// Argument passed before the image path (repeatable).
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,
    /// Output project JSON (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
    /// JSON array of actions, e.g. `[{"type":"set_mode","payload":"draw_trendline"}]`.
    /// Unknown action types are skipped with a warning.
    #[arg(long)]
    actions: PathBuf,
    /// Output project JSON (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StillArgs {
    /// Input project or render-request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Frame index in the exported video; omit for the settled design view.
    #[arg(long)]
    frame: Option<u64>,
    /// Frame the chart into the video canvas instead of the bare chart area.
    #[arg(long)]
    video: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input project or render-request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
    /// Output video; `.webm` selects WebM, anything else MP4.
    #[arg(long)]
    out: PathBuf,
    /// Title card text.
    #[arg(long)]
    title: Option<String>,
    #[arg(long, requires = "title")]
    subtitle: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = tradeanim::Settings::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Generate(cmd) => cmd_generate(cmd),
        Command::ImportCsv(args) => cmd_import_csv(args),
        Command::Analyze(args) => cmd_analyze(args, &settings),
        Command::Apply(args) => cmd_apply(args),
        Command::Svg(args) => cmd_svg(args, settings),
        Command::Frame(args) => cmd_frame(args, settings),
        Command::Render(args) => cmd_render(args, settings),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn cmd_generate(cmd: GenerateCmd) -> anyhow::Result<()> {
    let (candles, common) = match cmd {
        GenerateCmd::Trend {
            kind,
            count,
            common,
        } => {
            let kind = match kind {
                TrendChoice::Uptrend => TrendKind::Uptrend,
                TrendChoice::Downtrend => TrendKind::Downtrend,
                TrendChoice::Ranging => TrendKind::Ranging,
            };
            let params = TrendParams {
                count,
                start_ms: chrono::Utc::now().timestamp_millis(),
                ..TrendParams::default()
            };
            (trend(kind, &params, &mut rng(common.seed)), common)
        }
        GenerateCmd::Pattern {
            pattern: choice,
            count,
            start,
            common,
        } => {
            let p = match choice {
                PatternChoice::BullFlag => Pattern::BullFlag,
                PatternChoice::RandomWalk => Pattern::RandomWalk,
            };
            (pattern(p, count, start, &mut rng(common.seed)), common)
        }
        GenerateCmd::Mock {
            count,
            start,
            common,
        } => {
            let now = chrono::Utc::now().timestamp_millis();
            (mock_series(count, start, now, &mut rng(common.seed)), common)
        }
    };
    write_project(&tradeanim::EditorState::with_candles(candles), common.out.as_deref())
}

fn cmd_import_csv(args: ImportCsvArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read csv '{}'", args.in_path.display()))?;
    let candles = tradeanim::parse_candles_csv(&text)?;
    write_project(&tradeanim::EditorState::with_candles(candles), args.out.as_deref())
}

fn cmd_analyze(args: AnalyzeArgs, settings: &tradeanim::Settings) -> anyhow::Result<()> {
    let image = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let ext = args
        .image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    let pipeline =
        tradeanim::VisionPipeline::new(args.program, args.args, settings.export.vision_timeout());
    let candles = pipeline.analyze(&image, ext)?;
    write_project(&tradeanim::EditorState::with_candles(candles), args.out.as_deref())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read project '{}'", args.in_path.display()))?;
    let mut state: tradeanim::EditorState =
        serde_json::from_str(&text).with_context(|| "parse project JSON")?;
    let text = std::fs::read_to_string(&args.actions)
        .with_context(|| format!("read actions '{}'", args.actions.display()))?;
    let actions = tradeanim::actions_from_json(&text)
        .with_context(|| format!("parse actions '{}'", args.actions.display()))?;
    for action in actions {
        state.apply(action);
    }
    write_project(&state, args.out.as_deref())
}

fn still_scene(args: &StillArgs, settings: tradeanim::Settings) -> anyhow::Result<tradeanim::Scene> {
    let request = read_request(&args.in_path)?;
    let input = request.scene_input();
    if args.video || args.frame.is_some() {
        let session = tradeanim::RenderSession::new(input, settings, tradeanim::Rasterizer::new())?;
        return Ok(match args.frame {
            Some(frame) => session.scene_at_frame(tradeanim::FrameIndex(frame)),
            None => session.scene_at(tradeanim::Clock::Settled),
        });
    }
    let viewport = tradeanim::Viewport::editor(settings.chart.extent(input.candles.len()));
    Ok(tradeanim::evaluate(
        &input,
        &settings,
        &viewport,
        tradeanim::Clock::Settled,
    ))
}

fn cmd_svg(args: StillArgs, settings: tradeanim::Settings) -> anyhow::Result<()> {
    let scene = still_scene(&args, settings)?;
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, tradeanim::to_svg(&scene))
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: StillArgs, settings: tradeanim::Settings) -> anyhow::Result<()> {
    let scene = still_scene(&args, settings)?;
    let frame = tradeanim::Rasterizer::new().render_scene(&scene)?;
    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs, settings: tradeanim::Settings) -> anyhow::Result<()> {
    let mut request = read_request(&args.in_path)?;
    if let Some(title) = args.title {
        request.title = Some(tradeanim::TitleCard {
            title,
            subtitle: args.subtitle.unwrap_or_default(),
        });
    }
    let mut video = request.video.take().unwrap_or_else(|| settings.video.clone());
    video.container = tradeanim::Container::from_path(&args.out);
    request.video = Some(video);

    let timeout = settings.export.render_timeout();
    let service = tradeanim::LocalRenderService::new(settings, tradeanim::Rasterizer::new());
    let export = tradeanim::ExportController::new(Arc::new(service), timeout);
    let saved = export.export(request, &args.out)?;
    eprintln!("wrote {}", saved.display());
    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<tradeanim::RenderRequest> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    // Project files parse too: candle ids and editor-only fields are ignored.
    serde_json::from_str(&text).with_context(|| format!("parse '{}'", path.display()))
}

fn write_project(state: &tradeanim::EditorState, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(state).context("serialize project")?;
    match out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, json)
                .with_context(|| format!("write project '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
