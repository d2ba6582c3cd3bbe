use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hilite_core::{
    CompositePattern, Document, DocumentEvent, Editor, load_pattern, markup_document,
    reformat_document, to_html,
};
use hilite_tld::{
    ConfigFile, FileTldSource, HighlighterConfig, HttpTldSource, JsonFileStore, PatternCell,
    RefreshPolicy, TldSource, refresh_pattern,
};
use miette::{IntoDiagnostic, Result};

mod script;

#[derive(Parser)]
#[command(version, about = "hilite - live URL, hashtag, mention and cashtag highlighting", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "HILITE_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the key-value store file
    #[arg(long, env = "HILITE_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight a text in one pass
    Highlight {
        /// Input file, stdin if omitted
        input: Option<PathBuf>,

        /// Print HTML instead of markup
        #[arg(long)]
        html: bool,
    },
    /// Replay a keystroke script through the live editor
    Replay {
        /// Script file, stdin if omitted
        script: Option<PathBuf>,

        /// Print HTML instead of markup
        #[arg(long)]
        html: bool,

        /// Print the document notifications after each step
        #[arg(long)]
        events: bool,
    },
    /// Fetch a fresh TLD list and store the rebuilt pattern
    Refresh {
        /// TLD list URL
        #[arg(long, env = "HILITE_TLD_URL", conflicts_with = "file")]
        url: Option<String>,

        /// Read the TLD list from a local file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the stored pattern source
    ShowPattern,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();
    let config_file = cli.config.map(ConfigFile::new).unwrap_or_default();
    let mut config = HighlighterConfig::load(&config_file).await?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    tracing::debug!(config = %config_file.path().display(), store = %config.store_path.display(), "loaded configuration");

    match cli.command {
        Commands::Highlight { input, html } => highlight(&config, input.as_deref(), html)?,
        Commands::Replay {
            script,
            html,
            events,
        } => replay(&config, script.as_deref(), html, events)?,
        Commands::Refresh { url, file } => match file {
            Some(file) => refresh(&config, &FileTldSource::new(file)).await?,
            None => {
                let url = url.unwrap_or_else(|| config.tld_url.clone());
                refresh(&config, &HttpTldSource::new(url)).await?
            }
        },
        Commands::ShowPattern => println!("{}", stored_pattern(&config).source()),
    }

    Ok(())
}

fn highlight(config: &HighlighterConfig, input: Option<&Path>, html: bool) -> Result<()> {
    let text = read_input(input)?;
    let pattern = stored_pattern(config);
    let mut document = Document::from_text(text.trim_end_matches('\n'));
    reformat_document(&mut document, &pattern);
    print_document(&document, html);
    Ok(())
}

fn replay(config: &HighlighterConfig, input: Option<&Path>, html: bool, events: bool) -> Result<()> {
    let steps = script::parse_script(&read_input(input)?)?;
    let pattern = stored_pattern(config);
    let mut editor = Editor::new(config.notify_debounce());

    for (index, step) in steps.iter().enumerate() {
        if !script::run_step(&mut editor, step, &pattern) {
            tracing::warn!(position = index + 1, ?step, "step could not be applied");
        }
        if events {
            for event in editor.flush_events() {
                print_event(index + 1, &event);
            }
        }
    }
    print_document(editor.document(), html);
    Ok(())
}

async fn refresh(config: &HighlighterConfig, source: &impl TldSource) -> Result<()> {
    let mut store = JsonFileStore::new(config.store_path.clone());
    let cell = PatternCell::new(load_pattern(&store, &config.pattern_key));
    let policy = RefreshPolicy::from(config);

    refresh_pattern(source, &mut store, &cell, &policy, &config.pattern_key).await?;
    println!("Pattern refreshed");
    println!("Stored in: {}", config.store_path.display());
    Ok(())
}

fn stored_pattern(config: &HighlighterConfig) -> CompositePattern {
    load_pattern(
        &JsonFileStore::new(config.store_path.as_path()),
        &config.pattern_key,
    )
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).into_diagnostic(),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()?;
            Ok(text)
        }
    }
}

fn print_document(document: &Document, html: bool) {
    if html {
        println!("{}", to_html(document));
    } else {
        println!("{}", markup_document(document));
    }
}

fn print_event(step: usize, event: &DocumentEvent) {
    match event {
        DocumentEvent::TextUpdated(text) => println!("[{step}] text {text:?}"),
        DocumentEvent::CursorChanged { start, end } => println!("[{step}] cursor {start}..{end}"),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hilite=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
