use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hoesgen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one record to a PNG preview.
    Preview(PreviewArgs),
    /// Export one JPEG artifact per parsed dimension line.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Source product photo.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Product title shown in the banner.
    #[arg(long, default_value = "")]
    title: String,

    /// File with one dimension line per row (e.g. "220 x 90 x 80").
    #[arg(long, conflicts_with = "dims_text")]
    dims: Option<PathBuf>,

    /// Dimension lines passed inline; separate rows with '\n'.
    #[arg(long)]
    dims_text: Option<String>,

    /// Bold TTF/OTF font used for all canvas text.
    #[arg(long)]
    font: PathBuf,

    /// JSON file with label anchor positions (percentages).
    #[arg(long)]
    positions: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Record index to preview (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output directory for the exported artifacts.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn build_state(args: &ProjectArgs) -> anyhow::Result<hoesgen::ProjectState> {
    let dims_text = match (&args.dims, &args.dims_text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("read dimension list '{}'", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => String::new(),
    };

    let mut state = hoesgen::ProjectState {
        title: args.title.clone(),
        ..hoesgen::ProjectState::default()
    };
    state.set_dimensions_text(&dims_text);

    if let Some(path) = &args.image {
        state.image = Some(hoesgen::load_image(path)?);
    }
    if let Some(path) = &args.positions {
        state.positions = read_positions(path)?;
    }
    Ok(state)
}

fn read_positions(path: &Path) -> anyhow::Result<hoesgen::AnchorPositions> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read positions '{}'", path.display()))?;
    let positions: hoesgen::AnchorPositions =
        serde_json::from_slice(&bytes).with_context(|| "parse positions JSON")?;
    Ok(positions)
}

fn build_renderer(args: &ProjectArgs) -> anyhow::Result<hoesgen::Renderer> {
    let font_bytes = std::fs::read(&args.font)
        .with_context(|| format!("read font '{}'", args.font.display()))?;
    let engine = hoesgen::TextEngine::from_font_bytes(font_bytes)?;
    Ok(hoesgen::Renderer::new(engine))
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut state = build_state(&args.project)?;
    let mut renderer = build_renderer(&args.project)?;

    if !state.records.is_empty() {
        state.set_active(args.index)?;
    }
    let frame = renderer.render(&state)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut state = build_state(&args.project)?;
    let mut renderer = build_renderer(&args.project)?;
    let mut sink = hoesgen::DirectorySink::new(&args.out_dir)?;

    let stats = hoesgen::export_all(&mut state, &mut renderer, &mut sink)?;
    eprintln!(
        "exported {}/{} artifacts to {} ({} failed)",
        stats.exported,
        stats.requested,
        args.out_dir.display(),
        stats.failed
    );
    Ok(())
}
