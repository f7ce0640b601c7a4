use anyhow::{Context, Result, bail};
use batch::{Frame, RenderBatch, StringIndex};
use bus::Bus;
use bus::ipc::{decode_host_message, encode_client_message};
use clap::{Parser, Subcommand};
use html::serialize::inner_html;
use html::snapshot::DomSnapshot;
use html::{Document, Namespace, parse_fragment};
use renderer::{RendererConfig, WebRenderer};
use std::fs;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const DEFAULT_PAGE: &str = r#"<div id="app"></div>"#;

#[derive(Parser)]
#[command(name = "remote-ui")]
#[command(about = "Apply render batches to an in-memory document")]
struct Cli {
    /// Renderer settings (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override `browser_renderer_id` from the config
    #[arg(long, global = true)]
    renderer_id: Option<u32>,

    /// Trace every batch under the `renderer.batch` target
    #[arg(long, global = true)]
    log_batches: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a transcript of `__bwv:` host messages, one per line
    Replay {
        transcript: PathBuf,
        /// Markup placed in <body> before the first message
        #[arg(long)]
        page: Option<PathBuf>,
        /// Print the final body as markup instead of a tree snapshot
        #[arg(long)]
        html: bool,
    },
    /// Print the sections of a binary render batch
    Decode { batch: PathBuf },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Replay {
            transcript,
            page,
            html,
        } => replay(config, &transcript, page.as_deref(), html),
        Commands::Decode { batch } => decode(&batch),
    }
}

fn load_config(cli: &Cli) -> Result<RendererConfig> {
    let mut config = match &cli.config {
        Some(path) => RendererConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RendererConfig::default(),
    };
    if let Some(id) = cli.renderer_id {
        config.browser_renderer_id = id;
    }
    if cli.log_batches {
        config.log_batches = true;
    }
    Ok(config)
}

fn replay(
    config: RendererConfig,
    transcript: &Path,
    page: Option<&Path>,
    as_html: bool,
) -> Result<()> {
    let markup = match page {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => DEFAULT_PAGE.to_string(),
    };
    let text = fs::read_to_string(transcript)
        .with_context(|| format!("reading {}", transcript.display()))?;

    let mut doc = Document::with_body();
    let Some(body) = doc.body() else {
        bail!("document has no body");
    };
    for node in parse_fragment(&mut doc, &markup, Namespace::Html) {
        doc.append_child(body, node)?;
    }

    let mut renderer = WebRenderer::new(config, doc);
    let bus = Bus::new();
    renderer.connect(bus.client_tx.clone());

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let message = decode_host_message(line)
            .with_context(|| format!("line {}", number + 1))?;
        let Some(message) = message else {
            log::warn!(target: "remote_ui", "line {}: not a host frame, skipped", number + 1);
            continue;
        };
        renderer
            .handle_message(message)
            .with_context(|| format!("line {}", number + 1))?;
        for sent in bus.drain_client() {
            println!("{}", encode_client_message(&sent)?);
        }
    }

    if as_html {
        println!("{}", inner_html(renderer.document(), body));
    } else {
        println!("{}", DomSnapshot::children(renderer.document(), body).render());
    }
    Ok(())
}

fn decode(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let batch = RenderBatch::new(&bytes)?;
    let counts = batch.section_counts();
    println!("{} bytes, {counts:?}", bytes.len());

    for diff in batch.updated_components() {
        let diff = diff?;
        println!("component {}: {} edits", diff.component_id().0, diff.edit_count());
        for edit in diff.edits() {
            println!("  {:?}", edit?);
        }
    }

    let frames = batch.reference_frames();
    if !frames.is_empty() {
        println!("frames:");
    }
    for index in 0..frames.len() {
        let frame = frames.frame(index)?;
        println!("  {index:>4} {}", describe_frame(&batch, &frame)?);
    }

    for index in 0..batch.disposed_component_ids_len() {
        println!("disposed component {}", batch.disposed_component_id(index)?.0);
    }
    for index in 0..batch.disposed_event_handler_ids_len() {
        println!("disposed handler {}", batch.disposed_event_handler_id(index)?.0);
    }
    Ok(())
}

fn describe_frame(batch: &RenderBatch<'_>, frame: &Frame) -> Result<String> {
    let string = |index: StringIndex| -> Result<String> {
        Ok(match batch.read_string(index)? {
            Some(value) => format!("{value:?}"),
            None => "null".to_string(),
        })
    };
    Ok(match *frame {
        Frame::Element { subtree_length, name } => {
            format!("element <{}> ({subtree_length})", string(name)?)
        }
        Frame::Text { content } => format!("text {}", string(content)?),
        Frame::Attribute {
            name,
            value,
            event_handler_id,
        } => {
            let mut out = format!("attribute {}={}", string(name)?, string(value)?);
            if event_handler_id.0 != 0 {
                out.push_str(&format!(" handler {}", event_handler_id.0));
            }
            out
        }
        Frame::Component {
            subtree_length,
            component_id,
        } => format!("component {} ({subtree_length})", component_id.0),
        Frame::Region { subtree_length } => format!("region ({subtree_length})"),
        Frame::ElementReferenceCapture {
            reference_capture_id,
        } => format!("capture {}", string(reference_capture_id)?),
        Frame::Markup { content } => format!("markup {}", string(content)?),
    })
}
