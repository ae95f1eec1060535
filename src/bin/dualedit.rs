use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dualedit::clipboard::{ClipboardPayload, ClipboardSource, SystemClipboard};
use dualedit::config::{self, EditorConfig};
use dualedit::prompt::StdinPrompt;
use dualedit::script::run_script;
use dualedit::{Editor, MemoryEngine, logging, sanitize};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dualedit")]
#[command(about = "Dual-view HTML editing core", long_about = None)]
struct Args {
    /// Config file (default: platform config dir)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sanitize pasted HTML
    Clean {
        /// File to read (default: stdin)
        file: Option<PathBuf>,
    },
    /// Paste into an empty editor and print the resulting markup
    Paste {
        /// HTML flavour of the payload
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
        /// Plain-text flavour of the payload
        #[arg(long, value_name = "FILE")]
        text: Option<PathBuf>,
        /// Read the payload from the system clipboard
        #[arg(long, conflicts_with_all = ["html", "text"])]
        system: bool,
    },
    /// Run an editing script and print the final markup
    Run {
        /// Script file
        script: PathBuf,
        /// Also copy the final markup to the system clipboard
        #[arg(long)]
        copy: bool,
    },
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn cmd_clean(file: Option<PathBuf>) -> Result<()> {
    let html = read_input(file.as_deref())?;
    println!("{}", sanitize::clean(&html));
    Ok(())
}

fn cmd_paste(
    html: Option<PathBuf>,
    text: Option<PathBuf>,
    system: bool,
    config: EditorConfig,
) -> Result<()> {
    let payload = if system {
        let mut clipboard = SystemClipboard::new()?;
        clipboard.read_payload()?
    } else {
        if html.is_none() && text.is_none() {
            bail!("Nothing to paste: pass --html, --text or --system");
        }
        let html = html.map(|path| read_input(Some(&path))).transpose()?;
        let text = text.map(|path| read_input(Some(&path))).transpose()?;
        ClipboardPayload::new(html.as_deref(), text.as_deref())
    };

    let mut editor = Editor::with_config(MemoryEngine::new(), config);
    editor.engine_mut().collapse_to_end();
    editor.handle_paste(&payload);
    println!("{}", editor.content().as_str());
    Ok(())
}

fn cmd_run(script: &Path, copy: bool, config: EditorConfig) -> Result<()> {
    let source = read_input(Some(script))?;
    let mut editor = Editor::with_config(MemoryEngine::new(), config);

    let output = run_script(&mut editor, &mut StdinPrompt, &source)
        .with_context(|| format!("Script '{}' failed", script.display()))?;
    for content in output {
        println!("{content}");
    }
    println!("{}", editor.content().as_str());

    if copy {
        let mut clipboard = SystemClipboard::new()?;
        let ack = editor.export(&mut clipboard)?;
        eprintln!("{ack}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_error) = match config::load(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (EditorConfig::default(), Some(err)),
    };

    if let Err(e) = logging::init(&config.log_filter) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
    if let Some(err) = config_error {
        tracing::warn!(%err, "using default config");
    }

    match args.command {
        Commands::Clean { file } => cmd_clean(file),
        Commands::Paste { html, text, system } => cmd_paste(html, text, system, config),
        Commands::Run { script, copy } => cmd_run(&script, copy, config),
    }
}
