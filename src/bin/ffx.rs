// Native binary for ffx - Terminal UI mode

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use ffx::{
    api::{HttpSource, RecordSource},
    app::{App, InputMode},
    clipboard::SystemClipboard,
    config::{load, Config},
    source::spawn_fetch,
    types::AppEvent,
    ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg.log_file)?;
    cfg.log_summary();

    let source: Arc<dyn RecordSource> = Arc::new(
        HttpSource::new(cfg.api_root.clone(), cfg.timeout_ms, cfg.retries)
            .with_auth_token(cfg.auth_token.clone()),
    );

    let mut app = App::new(
        cfg.namespace.clone(),
        cfg.resource,
        cfg.page_sizes.clone(),
        cfg.render_fps,
        cfg.theme,
        Box::new(SystemClipboard),
    );
    if !cfg.filter.is_empty() && !app.apply_filter_text(&cfg.filter) {
        log::warn!("Ignoring invalid startup filter {:?}", cfg.filter);
    }

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (tx, rx) = unbounded_channel::<AppEvent>();
    let res = run_loop(&mut app, &mut terminal, &cfg, source, tx, rx).await;

    // cleanup (always, even if the loop failed)
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    Ok(())
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &Config,
    source: Arc<dyn RecordSource>,
    tx: UnboundedSender<AppEvent>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut last_frame = Instant::now();
    let mut last_refresh = Instant::now();
    let refresh_every = (cfg.refresh_ms > 0).then(|| Duration::from_millis(cfg.refresh_ms));

    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                    handle_key(app, k);
                }
                Event::Mouse(m) => handle_mouse(app, m),
                _ => {}
            }
        }

        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }

        if let Some(every) = refresh_every {
            // don't pile refreshes onto a slow node
            if last_refresh.elapsed() >= every && !app.list().loading() {
                app.refresh();
                last_refresh = Instant::now();
            }
        }

        if let Some(req) = app.take_request() {
            spawn_fetch(source.clone(), req, tx.clone());
        }

        if last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.up(),
        MouseEventKind::ScrollDown => app.down(),
        _ => {}
    }
}

fn handle_key(app: &mut App, k: KeyEvent) {
    // Prompt modes take all printable input
    if app.input_mode() != InputMode::Normal {
        match k.code {
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Enter => app.submit_input(),
            KeyCode::Esc => app.cancel_input(),
            _ => {}
        }
        return;
    }

    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.on_event(AppEvent::Quit);
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.up(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.down(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.left(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.right(),
        (KeyCode::PageUp, _) if app.detail().is_open() => app.scroll_detail(-20),
        (KeyCode::PageDown, _) if app.detail().is_open() => app.scroll_detail(20),
        (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => app.next_page(),
        (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => app.prev_page(),
        (KeyCode::Char('s'), _) => app.cycle_page_size(),
        (KeyCode::Enter, _) => app.activate_selected_row(),
        (KeyCode::Char(' '), _) => app.activate_selected_cell(),
        (KeyCode::Char('c'), _) => app.copy(),
        (KeyCode::Tab, _) => app.next_resource(),
        (KeyCode::Char('/'), _) | (KeyCode::Char('f'), _) => app.start_filter(),
        (KeyCode::Char(':'), _) => app.start_namespace(),
        (KeyCode::Char('r'), _) => app.refresh(),
        (KeyCode::Esc, _) => app.dismiss(),
        _ => {}
    }
}
