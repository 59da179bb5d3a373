//! calc-widget: the calculator widget in a terminal
//!
//! ```bash
//! calc-widget                                   # posts to http://127.0.0.1:8000/api/eval
//! calc-widget --endpoint http://calc.local/api/eval --policy latest-request
//! calc-widget --config widget.json --log-file widget.log
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use calc_widget::config::{ResponsePolicy, WidgetConfig};
use calc_widget::error::WidgetResult;
use calc_widget::service::HttpEvaluator;
use calc_widget::tui::{render, SharedEvaluator, TerminalApp};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Endpoint used when neither `--endpoint` nor `--config` names one
const TERMINAL_ENDPOINT: &str = "http://127.0.0.1:8000/api/eval";

/// Calculator input widget backed by a remote evaluation service
#[derive(Parser, Debug)]
#[command(name = "calc-widget")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Evaluation service URL
    #[arg(long)]
    endpoint: Option<String>,

    /// JSON widget configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which of several overlapping evaluations may update the displays
    /// (last-arrival, latest-request)
    #[arg(long)]
    policy: Option<ResponsePolicy>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> WidgetResult<()> {
    let config = build_config(cli)?;
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    info!(endpoint = %config.endpoint, policy = ?config.response_policy, "starting");

    let evaluator: SharedEvaluator = Arc::new(HttpEvaluator::from_config(&config)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_terminal(&config, evaluator))
}

/// File values, overridden by flags
fn build_config(cli: &Cli) -> WidgetResult<WidgetConfig> {
    let mut config = match &cli.config {
        Some(path) => WidgetConfig::from_file(path)?,
        None => WidgetConfig::default().with_endpoint(TERMINAL_ENDPOINT),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(policy) = cli.policy {
        config.response_policy = policy;
    }
    if cli.timeout_secs.is_some() {
        config.timeout_secs = cli.timeout_secs;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(path: &Path) -> WidgetResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("calc_widget=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_terminal(config: &WidgetConfig, evaluator: SharedEvaluator) -> WidgetResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, TerminalApp::new(config, evaluator)).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: TerminalApp,
) -> WidgetResult<()> {
    let mut events = EventStream::new();
    while !app.should_quit() {
        terminal.draw(|frame| {
            app.set_viewport(frame.area());
            render(&app, frame);
        })?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => app.handle_event(&event),
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(applied) = app.next_outcome() => {
                debug!(applied, "evaluation outcome");
            }
        }
    }
    info!("quit");
    Ok(())
}
