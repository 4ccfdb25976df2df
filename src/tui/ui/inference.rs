//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Prediction, READMISSION_THRESHOLD};
use crate::tui::styles::ClinicalTheme;

/// Outcome of the last submitted form
#[derive(Debug, Clone, Default)]
pub enum InferenceState {
    /// Nothing submitted yet
    #[default]
    Idle,
    Complete { prediction: Prediction },
    Error { message: String },
}

/// Render the prediction result
pub fn render_inference(f: &mut Frame, area: Rect, state: &InferenceState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_inference_header(f, chunks[0]);
    match state {
        InferenceState::Idle => render_idle(f, chunks[1]),
        InferenceState::Complete { prediction } => render_result(f, chunks[1], prediction),
        InferenceState::Error { message } => render_error(f, chunks[1], message),
    }
    render_inference_footer(f, chunks[2]);
}

fn render_inference_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Prediction Result", ClinicalTheme::title()),
        Span::styled(" │ 30-day readmission", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No prediction yet",
            ClinicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_result(f: &mut Frame, area: Rect, prediction: &Prediction) {
    let block = Block::default()
        .title(Span::styled(" Prediction Result ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Probability
            Constraint::Length(3), // Gauge
            Constraint::Length(3), // Verdict
            Constraint::Length(1), // Timestamp
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let style = ClinicalTheme::verdict(prediction.verdict);

    let probability = Paragraph::new(Line::from(vec![
        Span::styled("Probability of Readmission: ", ClinicalTheme::text_secondary()),
        Span::styled(
            prediction.formatted_probability(),
            ClinicalTheme::text().add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(probability, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(style)
        .ratio(prediction.probability.clamp(0.0, 1.0))
        .label(format!(
            "{} (threshold {READMISSION_THRESHOLD:.2})",
            prediction.formatted_probability()
        ));
    f.render_widget(gauge, chunks[1]);

    let verdict = Paragraph::new(vec![
        Line::from(Span::styled(
            prediction.verdict.to_string(),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(prediction.verdict.description(), style)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(verdict, chunks[2]);

    let computed = Paragraph::new(Line::from(Span::styled(
        format!(
            "Computed {}",
            prediction.computed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        ClinicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(computed, chunks[3]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", ClinicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, ClinicalTheme::danger())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_inference_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Enter/Esc] ", ClinicalTheme::key_hint()),
        Span::styled("Back to Form ", ClinicalTheme::key_desc()),
        Span::styled("[N] ", ClinicalTheme::key_hint()),
        Span::styled("New Patient ", ClinicalTheme::key_desc()),
        Span::styled("[Ctrl+Q] ", ClinicalTheme::key_hint()),
        Span::styled("Quit", ClinicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}
