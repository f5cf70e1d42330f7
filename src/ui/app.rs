use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use tokio::runtime::Runtime;
use tracing::warn;

use crate::ai::MoveProvider;
use crate::config::AppConfig;
use crate::error::GameError;
use crate::game::COLUMNS;
use crate::session::{play_remote_turn, GameMode, GameSession, SessionStatus};

pub struct App {
    session: GameSession,
    provider: Box<dyn MoveProvider>,
    runtime: Runtime,
    search_depth: u32,
    selected_column: usize,
    should_quit: bool,
    remote_move_failed: bool,
    message: Option<String>,
}

impl App {
    pub fn new(config: &AppConfig, provider: Box<dyn MoveProvider>, runtime: Runtime) -> Self {
        App {
            session: GameSession::new(config.game.default_mode),
            provider,
            runtime,
            search_depth: config.game.search_depth,
            selected_column: 3, // Start in middle
            should_quit: false,
            remote_move_failed: false,
            message: None,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // The frame above already shows the "thinking" state; the call
            // below blocks until the service answers or fails.
            if self.session.is_remote_turn() && !self.remote_move_failed {
                self.run_remote_turn();
                continue;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column < COLUMNS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                self.session.start_new_game();
                self.selected_column = 3;
                self.remote_move_failed = false;
                self.message = Some("New game started!".to_string());
            }
            KeyCode::Char('m') => {
                self.toggle_mode();
            }
            KeyCode::Char('a') => {
                // Retry a failed AI move
                if self.session.is_remote_turn() {
                    self.remote_move_failed = false;
                }
            }
            _ => {}
        }
    }

    fn toggle_mode(&mut self) {
        let next = match self.session.mode() {
            GameMode::HumanVsHuman => GameMode::HumanVsRemote,
            GameMode::HumanVsRemote => GameMode::HumanVsHuman,
        };
        match self.session.set_mode(next) {
            Ok(()) => {
                self.remote_move_failed = false;
                self.message = Some(format!("{}: new game started", next.name()));
            }
            Err(err) => {
                self.message = Some(err.to_string());
            }
        }
    }

    /// Drop piece in selected column
    fn drop_piece(&mut self) {
        match self.session.submit_move(self.selected_column) {
            Ok(status) => {
                self.message = outcome_message(status);
            }
            Err(GameError::GameOver) => {
                self.message = Some("Game over! Press 'r' to restart.".to_string());
            }
            Err(GameError::RemoteTurn) => {
                self.message =
                    Some("Waiting for the AI's move. Press 'a' to request it again.".to_string());
            }
            Err(err) => {
                self.message = Some(err.to_string());
            }
        }
    }

    /// Run one remote turn to completion, blocking the UI on the request.
    fn run_remote_turn(&mut self) {
        let result = self.runtime.block_on(play_remote_turn(
            &mut self.session,
            self.provider.as_ref(),
            self.search_depth,
        ));
        match result {
            Ok(()) => {
                self.message = outcome_message(self.session.status());
            }
            Err(err) => {
                warn!(error = %err, "remote move failed");
                self.remote_move_failed = true;
                self.message = Some(format!(
                    "AI move failed: {err}. Press 'a' to retry or 'r' to restart."
                ));
            }
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, &self.session, self.selected_column, &self.message);
    }
}

fn outcome_message(status: &SessionStatus) -> Option<String> {
    match status {
        SessionStatus::InProgress => None,
        SessionStatus::Won(win) => Some(format!("{} wins!", win.player.name())),
        SessionStatus::Drawn => Some("It's a draw!".to_string()),
    }
}
