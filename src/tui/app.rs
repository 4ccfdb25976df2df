//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous prediction on submit

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::{ArtifactLoader, DenseNetwork, FittedScaler};
use crate::application::ReadmissionPredictor;
use crate::config::Settings;

use super::ui::{
    inference::{render_inference, InferenceState},
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Inference,
}

/// Main application state
///
/// One instance per operator session. The form and the last result live here
/// and nowhere else; the predictor only borrows them for the call.
pub struct App {
    screen: Screen,
    should_quit: bool,
    predictor: ReadmissionPredictor<FittedScaler, DenseNetwork>,
    patient_form_state: PatientFormState,
    inference_state: InferenceState,
}

impl App {
    /// Load artifacts from the configured directory and build the app.
    ///
    /// # Errors
    /// Returns error if the artifacts are missing, malformed or fail
    /// verification. The app refuses to start rather than predict without
    /// a model.
    pub fn new(settings: &Settings) -> Result<Self> {
        let artifacts = ArtifactLoader::new()
            .require_manifest(settings.require_manifest)
            .load(&settings.model_dir)
            .with_context(|| {
                format!(
                    "Failed to load model artifacts from {:?}. Set READMIT_MODEL_PATH to a \
                     directory containing scaler.json and classifier.json.",
                    settings.model_dir
                )
            })?;

        Ok(Self::with_predictor(ReadmissionPredictor::from_artifacts(
            artifacts,
        )))
    }

    /// Create application with an injected predictor.
    #[must_use]
    pub fn with_predictor(predictor: ReadmissionPredictor<FittedScaler, DenseNetwork>) -> Self {
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            predictor,
            patient_form_state: PatientFormState::default(),
            inference_state: InferenceState::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::PatientForm => {
                        render_patient_form(f, chunks[0], &self.patient_form_state);
                    }
                    Screen::Inference => render_inference(f, chunks[0], &self.inference_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Dispatch one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Inference => self.handle_inference_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        let form = &mut self.patient_form_state;
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.decrement(),
            KeyCode::Right => form.increment(),
            KeyCode::PageUp => form.page_up(),
            KeyCode::PageDown => form.page_down(),
            KeyCode::Home => form.jump_to_min(),
            KeyCode::End => form.jump_to_max(),
            KeyCode::Char('s') | KeyCode::Char('S') => form.load_sample_data(),
            KeyCode::Char('r') | KeyCode::Char('R') => form.reset(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_inference_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state = PatientFormState::default();
                self.inference_state = InferenceState::Idle;
                self.screen = Screen::PatientForm;
            }
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let outcome = self
            .patient_form_state
            .to_patient_attributes()
            .and_then(|attrs| self.predictor.predict(&attrs));

        self.inference_state = match outcome {
            Ok(prediction) => InferenceState::Complete { prediction },
            Err(e) => {
                tracing::error!("Prediction failed: {}", e.kind());
                InferenceState::Error {
                    message: e.to_string(),
                }
            }
        };
        self.screen = Screen::Inference;
    }
}
