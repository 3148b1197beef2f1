use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

mod handlers;
mod logging;
mod ui;

use servicefinder::backend::{memory::MemoryBackend, Backend};
use servicefinder::config::{resolve_config_path, Config};
use servicefinder::model::Model;
use servicefinder::services::api::{spawn_api_service, ApiRequest, ApiResponse};
use servicefinder::services::events::{spawn_auth_listener, AuthEvent};
use servicefinder::services::Services;
use servicefinder::update::{apply_response, update, Intent};

/// Local services directory in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging to the temp directory (servicefinder-debug.log)
    #[arg(short, long)]
    debug: bool,

    /// Enable vim keybindings (hjkl, ^D/U, ^F/B, gg/G)
    #[arg(long)]
    vim: bool,

    /// Path to config file (default: platform-specific, see docs)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run against built-in sample data instead of Firebase
    #[arg(long)]
    demo: bool,
}

/// Longest the loop sleeps waiting for input
const MAX_POLL: Duration = Duration::from_millis(250);

/// Channels between the UI loop and background tasks
struct Channels {
    api_tx: mpsc::UnboundedSender<ApiRequest>,
    api_rx: mpsc::UnboundedReceiver<ApiResponse>,
    auth_rx: mpsc::UnboundedReceiver<AuthEvent>,
}

impl Channels {
    fn send_all(&self, requests: Vec<ApiRequest>) {
        for request in requests {
            debug!("sending {:?}", request);
            // The worker only stops once this sender is dropped
            let _ = self.api_tx.send(request);
        }
    }
}

fn build_backend(args: &Args) -> Result<(Config, Backend)> {
    if args.demo {
        let config = Config::demo();
        let backend = Backend::in_memory(MemoryBackend::demo(&config.listings_collection));
        info!("running with demo data");
        return Ok((config, backend));
    }

    let config_path = resolve_config_path(args.config.clone())?;
    info!("loading config from {}", config_path.display());
    let config = Config::load(&config_path)?;
    let backend = Backend::firebase(&config)?;
    Ok((config, backend))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.debug)?;

    let (mut config, backend) = build_backend(&args)?;
    if args.vim {
        config.vim_mode = true;
    }

    let services = Services::new(backend, &config);
    let (auth_tx, auth_rx) = mpsc::unbounded_channel();
    let subscription = spawn_auth_listener(services.auth.on_auth_change(), auth_tx);
    let (api_tx, api_rx) = spawn_api_service(services);

    let mut channels = Channels {
        api_tx,
        api_rx,
        auth_rx,
    };
    let mut model = Model::from_config(&config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut model, &mut channels).await;

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    subscription.unregister();
    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    model: &mut Model,
    channels: &mut Channels,
) -> Result<()> {
    let requests = update(model, Intent::Refresh, Instant::now());
    channels.send_all(requests);

    let mut frame: usize = 0;

    loop {
        // Always render (Elm Architecture approach)
        terminal.draw(|f| ui::render(f, model, frame))?;
        frame = frame.wrapping_add(1);

        // Toast expiry and debounced search
        update(model, Intent::Tick, Instant::now());

        if model.ui.should_quit {
            break;
        }

        // Process API responses (non-blocking)
        while let Ok(response) = channels.api_rx.try_recv() {
            let follow_up = apply_response(model, response, Instant::now());
            channels.send_all(follow_up);
        }

        // Sign-in state changes
        while let Ok(AuthEvent::Changed(user)) = channels.auth_rx.try_recv() {
            let requests = update(model, Intent::AuthChanged(user), Instant::now());
            channels.send_all(requests);
        }

        // Wake early when the search debounce is due
        let timeout = model
            .next_wakeup(Instant::now())
            .map_or(MAX_POLL, |due| due.min(MAX_POLL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(intent) = handlers::key_to_intent(model, key) {
                    let requests = update(model, intent, Instant::now());
                    channels.send_all(requests);
                }
            }
        }
    }

    Ok(())
}
