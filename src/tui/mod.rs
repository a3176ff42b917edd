mod event;
pub mod notice;

pub use event::{Event, EventHandler};
pub use notice::{draw_notice, NoticeAction, NoticeScreen};

use crate::privacy::controller::ConsentSyncController;
use anyhow::Result;
use std::sync::Arc;

type CrosstermTerminal = ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>;
type PanicHook = dyn Fn(&std::panic::PanicHookInfo<'_>) + Send + Sync + 'static;

/// Shows the privacy notice until the user dismisses it.
///
/// The controller is refreshed in the background on entry; key presses
/// trigger refreshes and updates as spawned tasks so the screen keeps
/// redrawing while requests are in flight.
pub async fn run_notice(controller: Arc<ConsentSyncController>) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

    let _panic_guard = PanicHookGuard::install(|| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );
    });

    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let result = notice_loop(&mut terminal, controller).await;
    let restored = restore_terminal(&mut terminal);
    finish(result, restored)
}

/// The loop's own error wins over a failure to restore the terminal.
fn finish(result: Result<()>, restored: Result<()>) -> Result<()> {
    if let (Err(_), Err(e)) = (&result, &restored) {
        tracing::warn!(error = %e, "Failed to restore terminal after notice error");
    }
    result.and(restored)
}

/// Runs `restore` before the previous panic hook while installed, and puts
/// the previous hook back on drop.
struct PanicHookGuard {
    previous: Arc<PanicHook>,
}

impl PanicHookGuard {
    fn install(restore: impl Fn() + Send + Sync + 'static) -> Self {
        let previous: Arc<PanicHook> = Arc::from(std::panic::take_hook());
        let chained = previous.clone();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore();
            chained(panic_info);
        }));
        Self { previous }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        // Hooks cannot be swapped from a panicking thread.
        if std::thread::panicking() {
            return;
        }
        let previous = self.previous.clone();
        let _ = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| previous(panic_info)));
    }
}

async fn notice_loop(
    terminal: &mut CrosstermTerminal,
    controller: Arc<ConsentSyncController>,
) -> Result<()> {
    let mut status_rx = controller.subscribe();
    let mut screen = NoticeScreen::new(controller.status());
    let mut events = EventHandler::spawn();

    spawn_refresh(&controller);

    loop {
        terminal.draw(|frame| draw_notice(frame, &screen))?;

        tokio::select! {
            event = events.next() => match event? {
                Event::Key(key) => match screen.handle_key(key) {
                    NoticeAction::Dismiss => break,
                    NoticeAction::Refresh => spawn_refresh(&controller),
                    NoticeAction::Update(desired) => {
                        let controller = controller.clone();
                        tokio::spawn(async move { controller.update_opt_in(desired).await });
                    }
                    NoticeAction::None => {}
                },
                Event::Resize { width, height } => {
                    terminal.resize(ratatui::layout::Rect::new(0, 0, width, height))?;
                }
            },
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                screen.apply_status(status_rx.borrow_and_update().clone());
            }
        }
    }
    tracing::debug!("Privacy notice dismissed");
    Ok(())
}

fn spawn_refresh(controller: &Arc<ConsentSyncController>) {
    let controller = controller.clone();
    tokio::spawn(async move { controller.refresh().await });
}

fn restore_terminal(terminal: &mut CrosstermTerminal) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/runner_tests.rs"]
mod tests;
