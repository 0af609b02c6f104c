mod api;
mod cache;
mod config;
mod content;
mod models;
mod selection;
mod tui;
mod validate;
mod view;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use api::AdminClient;
use config::Config;
use tui::App;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit it with your API URL and token, then run coursedesk.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("coursedesk — a terminal admin console for an online course platform");
        println!();
        println!("USAGE:");
        println!("  coursedesk           Start the TUI");
        println!("  coursedesk --init    Generate a default config file");
        println!();
        println!("CONFIG:");
        println!("  File: ~/.config/coursedesk/config.toml");
        println!("  Or set env vars: COURSEDESK_API_URL, COURSEDESK_API_TOKEN,");
        println!("  COURSEDESK_ASSETS_URL");
        println!();
        println!("KEYBINDINGS:");
        println!("  Tab / Shift+Tab   Switch tabs");
        println!("  1-3               Jump to tab");
        println!("  h/l  j/k          Move between columns / rows");
        println!("  Enter             Drill into the highlighted row");
        println!("  Backspace         Back out one selection level");
        println!("  a / e / D / t     Add, edit, delete, toggle active");
        println!("  q / Ctrl+C        Quit");
        return Ok(());
    }

    // The TUI owns stdout, so logs go to a file next to the cache.
    init_logging();

    let config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `coursedesk --init` to generate a config file,\n\
         or set COURSEDESK_API_URL and COURSEDESK_API_TOKEN environment variables."
    })?;

    let client = AdminClient::new(&config.api_url, &config.assets_url, &config.api_token)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

fn init_logging() {
    let Some(dir) = cache::log_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("coursedesk.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("COURSEDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: AdminClient,
) -> Result<()> {
    let mut app = App::new(client);

    // Show cached data instantly, then kick off a background sync.
    if let Some(cached) = cache::load_cache() {
        app.load_from_cache(cached);
        app.start_root_fetch();
        app.status_message = "Showing cached data — syncing in background…".into();
    } else {
        app.start_root_fetch();
    }
    terminal.draw(|f| tui::ui::render(f, &mut app))?;

    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(event) = tui::event::poll_event(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event
            {
                tui::event::handle_key(&mut app, code, modifiers);
            }
        }

        if !app.running {
            break;
        }

        // Apply completed background work without blocking.
        app.poll_outcomes();

        if app.needs_root_refresh {
            app.needs_root_refresh = false;
            app.start_root_fetch();
        }
    }

    Ok(())
}
