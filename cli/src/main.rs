mod config;
mod render;
mod script;
mod session;

use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mention_editor::Candidate;
use mention_user_search::UserDirectory;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ConfigStore;
use crate::config::Settings;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Drive the mention editor with a key script and print each resulting state"
)]
struct Cli {
    /// JSON file with the user directory, e.g. `[{"id":1,"name":"Ada"}]`.
    ///
    /// A small built-in directory is used when omitted.
    #[arg(long, env = "MENTION_EDITOR_USERS")]
    users: Option<PathBuf>,

    /// Initial editor content in wire format.
    #[arg(long, default_value = "")]
    initial: String,

    /// Read the script from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Settings file (defaults to `~/.mention-editor/config.toml`).
    #[arg(long, env = "MENTION_EDITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Delay before a blur closes the popup (clamped to 50..=1000).
    #[arg(long)]
    blur_delay_ms: Option<u64>,

    /// Debounce applied to user lookups.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Maximum number of candidates per lookup.
    #[arg(long)]
    max_results: Option<usize>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = resolve_settings(&cli)?;
    let directory = match &cli.users {
        Some(path) => UserDirectory::from_json_file(path)
            .with_context(|| format!("load users from {}", path.display()))?,
        None => UserDirectory::new(sample_users()),
    }
    .with_limit(settings.max_results);

    let mut session = Session::new(&cli.initial, Arc::new(directory), settings);
    let script = read_script(cli.script.as_deref()).await?;
    for (idx, line) in script.iter().enumerate() {
        let rendered = session
            .run_line(line)
            .await
            .with_context(|| format!("script line {}", idx + 1))?;
        println!("> {line}");
        print!("{rendered}");
    }
    tracing::debug!(value = %session.value(), "script finished");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Config file values, overridden by command-line flags.
fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default()?,
    };
    let mut settings = store
        .load()
        .with_context(|| format!("load settings from {}", store.path().display()))?;
    if let Some(ms) = cli.blur_delay_ms {
        settings = settings.with_blur_close_delay_ms(ms);
    }
    if let Some(ms) = cli.debounce_ms {
        settings = settings.with_search_debounce_ms(ms);
    }
    if let Some(max) = cli.max_results {
        settings = settings.with_max_results(max);
    }
    Ok(settings)
}

async fn read_script(path: Option<&std::path::Path>) -> anyhow::Result<Vec<String>> {
    if let Some(path) = path {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read script {}", path.display()))?;
        return Ok(contents.lines().map(str::to_string).collect());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut script = Vec::new();
    while let Some(line) = lines.next_line().await.context("read script from stdin")? {
        script.push(line);
    }
    Ok(script)
}

fn sample_users() -> Vec<Candidate> {
    vec![
        Candidate::new(1, "Ada Lovelace"),
        Candidate::new(2, "Alan Turing"),
        Candidate::new(3, "Barbara Liskov"),
        Candidate::new(4, "Bob"),
        Candidate::new(5, "Bobby Tables"),
        Candidate::new(6, "Grace Hopper"),
        Candidate::new(7, "Linus"),
        Candidate::new(8, "Margaret Hamilton"),
    ]
}
