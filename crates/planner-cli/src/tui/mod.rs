//! Interactive TUI dashboard for browsing the catalog and saved plans.

pub mod app;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use planner_core::store::Store;

use app::{App, InputMode, View};

/// Launch the interactive TUI dashboard.
pub async fn run_dashboard(store: Arc<dyn Store>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);

    let result = match app.refresh().await {
        Ok(()) => run_event_loop(&mut terminal, &mut app).await,
        Err(e) => Err(e),
    };

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = app.tick_rate;

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Data is only reloaded on request; the timeout just redraws.
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.status_message = None;
                match app.input_mode {
                    InputMode::Search => handle_search_key(app, key),
                    InputMode::Normal => handle_normal_key(app, key).await,
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.finish_search(),
        KeyCode::Backspace => app.pop_search(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char(c) => app.push_search(c),
        _ => {}
    }
}

async fn handle_normal_key(app: &mut App, key: KeyEvent) {
    let reload = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.navigate_back();
            true
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            false
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let opens = matches!(app.current_view, View::Plans);
            app.navigate_enter();
            opens
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
            false
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
            false
        }
        KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Left | KeyCode::Right => {
            app.switch_focus();
            false
        }
        KeyCode::Tab => {
            app.cycle_view();
            true
        }
        KeyCode::Char('/') if app.current_view == View::Dashboard => {
            app.start_search();
            false
        }
        KeyCode::Char('x') if app.current_view == View::Dashboard => {
            app.clear_search();
            false
        }
        KeyCode::Char('a') if app.current_view == View::Dashboard => {
            app.toggle_all();
            false
        }
        KeyCode::Char('v') if app.current_view == View::Dashboard => {
            app.cycle_view_mode();
            false
        }
        KeyCode::Char('s') => {
            if let Err(e) = app.cycle_plan_status().await {
                app.status_message = Some(format!("Status update failed: {e}"));
            }
            false
        }
        KeyCode::Char('r') => true,
        KeyCode::Char('?') => {
            app.show_help();
            false
        }
        _ => false,
    };

    if reload && !app.should_quit {
        if let Err(e) = app.refresh().await {
            app.status_message = Some(format!("Refresh failed: {e}"));
        }
    }
}
