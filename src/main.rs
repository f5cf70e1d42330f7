use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use connect_four::ai::HttpMoveProvider;
use connect_four::config::AppConfig;
use connect_four::session::GameMode;
use connect_four::ui::App;

/// Connect Four in the terminal, with an optional remote AI opponent.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Base URL of the move service (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Search depth hint sent with every move request
    #[arg(long)]
    depth: Option<u32>,

    /// Starting mode: "human" or "ai"
    #[arg(long)]
    mode: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr and stay off the alternate screen; silent unless
    // RUST_LOG asks for output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut config = AppConfig::load_or_default(&args.config)?;
    if let Some(server) = args.server {
        config.server.base_url = server;
    }
    if let Some(depth) = args.depth {
        config.game.search_depth = depth;
    }
    if let Some(mode) = args.mode {
        config.game.default_mode = match mode.as_str() {
            "human" => GameMode::HumanVsHuman,
            "ai" | "remote" => GameMode::HumanVsRemote,
            other => anyhow::bail!("unknown mode {other:?} (expected \"human\" or \"ai\")"),
        };
    }
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let provider = HttpMoveProvider::new(config.server.base_url.as_str(), config.server.timeout())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, Box::new(provider), runtime);
    let res = app.run(&mut terminal);

    // Restore terminal — always runs, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    Ok(res?)
}
