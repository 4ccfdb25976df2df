//! Patient data input form.
//!
//! Every choice field offers exactly the labels of its code table, and every
//! slider is bounded by the attribute's range, so the form cannot produce a
//! selection the encoder does not know.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{
    AdmissionType, AgeBracket, Categorical, ClinicalCount, DiabetesMedication, DiagnosisCategory,
    DosageChange, Gender, Medication, MedicationChange, PatientAttributes, Race,
};
use crate::tui::styles::ClinicalTheme;
use crate::{ReadmitError, Result};

/// Slider step for PgUp/PgDn.
const PAGE_STEP: u32 = 10;

const DIAGNOSIS_LABELS: [&str; 3] = ["Diagnosis 1", "Diagnosis 2", "Diagnosis 3"];

/// Which attribute a field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Age,
    Gender,
    Race,
    AdmissionType,
    Diagnosis(usize),
    Medication(Medication),
    Change,
    DiabetesMed,
    Count(ClinicalCount),
}

/// Form column a field is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Admission,
    Encounter,
    Medications,
}

impl Section {
    const ALL: [Self; 3] = [Self::Admission, Self::Encounter, Self::Medications];

    fn title(self) -> &'static str {
        match self {
            Self::Admission => " Patient & Admission ",
            Self::Encounter => " Encounter ",
            Self::Medications => " Medications ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// One of a fixed list of labels
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
    /// Bounded integer
    Slider { value: u32, min: u32, max: u32 },
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub key: FieldKey,
    pub label: &'static str,
    pub section: Section,
    pub input: FieldInput,
}

impl FormField {
    fn choice<T: Categorical>(key: FieldKey, label: &'static str, section: Section, value: T) -> Self {
        Self {
            key,
            label,
            section,
            input: FieldInput::Choice {
                options: T::labels(),
                selected: value.position(),
            },
        }
    }

    fn slider(count: ClinicalCount, section: Section, value: u32) -> Self {
        let (min, max) = count.range();
        Self {
            key: FieldKey::Count(count),
            label: count.label(),
            section,
            input: FieldInput::Slider {
                value: count.clamp(value),
                min,
                max,
            },
        }
    }

    /// Text of the current value.
    #[must_use]
    pub fn display_value(&self) -> String {
        match &self.input {
            FieldInput::Choice { options, selected } => {
                options.get(*selected).copied().unwrap_or("?").to_string()
            }
            FieldInput::Slider { value, .. } => value.to_string(),
        }
    }

    /// Move by `delta`; choices wrap, sliders clamp.
    fn shift(&mut self, delta: i64) {
        match &mut self.input {
            FieldInput::Choice { options, selected } => {
                if options.is_empty() {
                    return;
                }
                let len = options.len() as i64;
                *selected = (*selected as i64 + delta).rem_euclid(len) as usize;
            }
            FieldInput::Slider { value, min, max } => {
                let next = (i64::from(*value) + delta).clamp(i64::from(*min), i64::from(*max));
                *value = u32::try_from(next).unwrap_or(*min);
            }
        }
    }

    fn jump(&mut self, to_end: bool) {
        match &mut self.input {
            FieldInput::Choice { options, selected } => {
                *selected = if to_end { options.len().saturating_sub(1) } else { 0 };
            }
            FieldInput::Slider { value, min, max } => {
                *value = if to_end { *max } else { *min };
            }
        }
    }

    fn selected_label(&self) -> Option<&'static str> {
        match &self.input {
            FieldInput::Choice { options, selected } => options.get(*selected).copied(),
            FieldInput::Slider { .. } => None,
        }
    }

    fn slider_value(&self) -> Option<u32> {
        match self.input {
            FieldInput::Slider { value, .. } => Some(value),
            FieldInput::Choice { .. } => None,
        }
    }
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self::from_attributes(&PatientAttributes::default())
    }
}

impl PatientFormState {
    /// Build a form showing the given selections.
    #[must_use]
    pub fn from_attributes(attrs: &PatientAttributes) -> Self {
        use Section::{Admission, Encounter, Medications};

        let mut fields = vec![
            FormField::choice(FieldKey::Age, AgeBracket::ATTRIBUTE, Admission, attrs.age),
            FormField::choice(FieldKey::Gender, Gender::ATTRIBUTE, Admission, attrs.gender),
            FormField::choice(FieldKey::Race, Race::ATTRIBUTE, Admission, attrs.race),
            FormField::choice(
                FieldKey::AdmissionType,
                AdmissionType::ATTRIBUTE,
                Admission,
                attrs.admission_type,
            ),
        ];
        for count in [ClinicalCount::DischargeDisposition, ClinicalCount::AdmissionSource] {
            fields.push(FormField::slider(count, Admission, attrs.counts.get(count)));
        }
        for (i, label) in DIAGNOSIS_LABELS.into_iter().enumerate() {
            fields.push(FormField::choice(
                FieldKey::Diagnosis(i),
                label,
                Admission,
                attrs.diagnoses[i],
            ));
        }

        for count in ClinicalCount::ALL.iter().skip(2) {
            fields.push(FormField::slider(*count, Encounter, attrs.counts.get(*count)));
        }
        fields.push(FormField::choice(
            FieldKey::Change,
            MedicationChange::ATTRIBUTE,
            Encounter,
            attrs.change,
        ));
        fields.push(FormField::choice(
            FieldKey::DiabetesMed,
            DiabetesMedication::ATTRIBUTE,
            Encounter,
            attrs.diabetes_med,
        ));

        for med in Medication::FORM_ORDER {
            fields.push(FormField::choice(
                FieldKey::Medication(med),
                med.label(),
                Medications,
                attrs.medications.get(med),
            ));
        }

        Self {
            fields,
            selected_field: 0,
        }
    }

    /// The field that currently has focus
    #[must_use]
    pub fn focused(&self) -> &FormField {
        &self.fields[self.selected_field]
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    pub fn increment(&mut self) {
        self.edit(|field| field.shift(1));
    }

    pub fn decrement(&mut self) {
        self.edit(|field| field.shift(-1));
    }

    /// Step a slider up by a page; choices are left alone.
    pub fn page_up(&mut self) {
        self.edit(|field| {
            if field.slider_value().is_some() {
                field.shift(i64::from(PAGE_STEP));
            }
        });
    }

    pub fn page_down(&mut self) {
        self.edit(|field| {
            if field.slider_value().is_some() {
                field.shift(-i64::from(PAGE_STEP));
            }
        });
    }

    /// Jump to the slider minimum (or first choice).
    pub fn jump_to_min(&mut self) {
        self.edit(|field| field.jump(false));
    }

    /// Jump to the slider maximum (or last choice).
    pub fn jump_to_max(&mut self) {
        self.edit(|field| field.jump(true));
    }

    fn edit(&mut self, f: impl FnOnce(&mut FormField)) {
        f(&mut self.fields[self.selected_field]);
    }

    /// Load sample data (high-utilisation elderly patient)
    pub fn load_sample_data(&mut self) {
        self.load(&PatientAttributes::sample());
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        self.load(&PatientAttributes::default());
    }

    fn load(&mut self, attrs: &PatientAttributes) {
        let focus = self.selected_field;
        *self = Self::from_attributes(attrs);
        self.selected_field = focus.min(self.fields.len() - 1);
    }

    /// Resolve the current selections through the code tables.
    ///
    /// # Errors
    /// Returns `ReadmitError::Encoding` if a selected label has no code, or
    /// `ReadmitError::Validation` if a field is missing.
    pub fn to_patient_attributes(&self) -> Result<PatientAttributes> {
        let mut attrs = PatientAttributes {
            age: self.resolve(FieldKey::Age)?,
            gender: self.resolve(FieldKey::Gender)?,
            race: self.resolve(FieldKey::Race)?,
            admission_type: self.resolve(FieldKey::AdmissionType)?,
            diagnoses: [
                self.resolve::<DiagnosisCategory>(FieldKey::Diagnosis(0))?,
                self.resolve::<DiagnosisCategory>(FieldKey::Diagnosis(1))?,
                self.resolve::<DiagnosisCategory>(FieldKey::Diagnosis(2))?,
            ],
            change: self.resolve(FieldKey::Change)?,
            diabetes_med: self.resolve(FieldKey::DiabetesMed)?,
            ..PatientAttributes::default()
        };

        for med in Medication::ALL {
            let dosage: DosageChange = self.resolve(FieldKey::Medication(med))?;
            attrs.medications.set(med, dosage);
        }
        for count in ClinicalCount::ALL {
            let value = self
                .field(FieldKey::Count(count))?
                .slider_value()
                .ok_or_else(|| ReadmitError::Validation(format!("{} is not a slider", count.label())))?;
            attrs.counts.set(count, value);
        }
        Ok(attrs)
    }

    fn field(&self, key: FieldKey) -> Result<&FormField> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| ReadmitError::Validation(format!("form has no {key:?} field")))
    }

    fn resolve<T: Categorical>(&self, key: FieldKey) -> Result<T> {
        let field = self.field(key)?;
        let label = field.selected_label().unwrap_or_default();
        Ok(T::from_label(label)?)
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2]);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Predict Patient Readmission", ClinicalTheme::title()),
        Span::styled(
            " │ Predicts whether a diabetic patient is likely to be readmitted within 30 days",
            ClinicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(36),
            Constraint::Percentage(32),
            Constraint::Percentage(32),
        ])
        .split(area);

    for (section, column) in Section::ALL.into_iter().zip(columns.iter()) {
        render_field_column(f, *column, state, section);
    }
}

fn render_field_column(f: &mut Frame, area: Rect, state: &PatientFormState, section: Section) {
    let focused_here = state.focused().section == section;
    let block = Block::default()
        .title(Span::styled(
            section.title(),
            if focused_here {
                ClinicalTheme::focused()
            } else {
                ClinicalTheme::text_secondary()
            },
        ))
        .borders(Borders::ALL)
        .border_style(if focused_here {
            ClinicalTheme::border_focused()
        } else {
            ClinicalTheme::border()
        });

    let members: Vec<(usize, &FormField)> = state
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.section == section)
        .collect();
    let label_width = members.iter().map(|(_, f)| f.label.len()).max().unwrap_or(0);

    let lines: Vec<Line> = members
        .into_iter()
        .map(|(i, field)| field_line(field, i == state.selected_field, label_width))
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(field: &FormField, focused: bool, label_width: usize) -> Line<'static> {
    let label = format!(" {:<width$} ", field.label, width = label_width);
    if !focused {
        return Line::from(vec![
            Span::styled(label, ClinicalTheme::text_secondary()),
            Span::styled(field.display_value(), ClinicalTheme::text()),
        ]);
    }

    let mut spans = vec![
        Span::styled(label, ClinicalTheme::focused()),
        Span::styled(format!("◀ {} ▶", field.display_value()), ClinicalTheme::selected()),
    ];
    if let FieldInput::Slider { min, max, .. } = field.input {
        spans.push(Span::styled(
            format!(" {min}-{max}"),
            ClinicalTheme::text_muted(),
        ));
    }
    Line::from(spans)
}

/// Key hints. Request errors are shown on the result screen, never here.
fn render_form_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[↑↓] ", ClinicalTheme::key_hint()),
        Span::styled("Navigate ", ClinicalTheme::key_desc()),
        Span::styled("[←→] ", ClinicalTheme::key_hint()),
        Span::styled("Change ", ClinicalTheme::key_desc()),
        Span::styled("[PgUp/PgDn] ", ClinicalTheme::key_hint()),
        Span::styled("±10 ", ClinicalTheme::key_desc()),
        Span::styled("[Enter] ", ClinicalTheme::key_hint()),
        Span::styled("Predict Readmission ", ClinicalTheme::key_desc()),
        Span::styled("[S] ", ClinicalTheme::key_hint()),
        Span::styled("Sample ", ClinicalTheme::key_desc()),
        Span::styled("[R] ", ClinicalTheme::key_hint()),
        Span::styled("Reset ", ClinicalTheme::key_desc()),
        Span::styled("[Esc] ", ClinicalTheme::key_hint()),
        Span::styled("Quit", ClinicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(state: &mut PatientFormState, key: FieldKey) {
        state.selected_field = state
            .fields
            .iter()
            .position(|f| f.key == key)
            .expect("field exists");
    }

    #[test]
    fn test_every_attribute_has_one_field() {
        let state = PatientFormState::default();
        assert_eq!(
            state.fields.len(),
            4 + 3 + Medication::COUNT + 2 + ClinicalCount::COUNT
        );
        for med in Medication::ALL {
            assert_eq!(
                state.fields.iter().filter(|f| f.key == FieldKey::Medication(med)).count(),
                1
            );
        }
    }

    #[test]
    fn test_default_form_resolves_to_default_attributes() {
        let state = PatientFormState::default();
        let attrs = state.to_patient_attributes().expect("resolve");
        assert_eq!(attrs, PatientAttributes::default());
    }

    #[test]
    fn test_sample_and_reset() {
        let mut state = PatientFormState::default();
        state.selected_field = 5;
        state.load_sample_data();
        assert_eq!(state.selected_field, 5);
        assert_eq!(
            state.to_patient_attributes().unwrap(),
            PatientAttributes::sample()
        );

        state.reset();
        assert_eq!(
            state.to_patient_attributes().unwrap(),
            PatientAttributes::default()
        );
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = PatientFormState::default();
        state.prev_field();
        assert_eq!(state.selected_field, state.fields.len() - 1);
        state.next_field();
        assert_eq!(state.selected_field, 0);
    }

    #[test]
    fn test_choice_cycles_through_table() {
        let mut state = PatientFormState::default();
        focus(&mut state, FieldKey::Gender);
        state.decrement();
        assert_eq!(state.to_patient_attributes().unwrap().gender, Gender::Female);
        state.increment();
        assert_eq!(state.to_patient_attributes().unwrap().gender, Gender::Male);

        focus(&mut state, FieldKey::Medication(Medication::Insulin));
        state.jump_to_max();
        assert_eq!(
            state.to_patient_attributes().unwrap().medications.get(Medication::Insulin),
            DosageChange::Down
        );
    }

    #[test]
    fn test_slider_is_clamped() {
        let mut state = PatientFormState::default();
        focus(&mut state, FieldKey::Count(ClinicalCount::TimeInHospital));

        state.page_up();
        state.page_up();
        state.page_up();
        state.increment();
        let attrs = state.to_patient_attributes().unwrap();
        assert_eq!(attrs.counts.get(ClinicalCount::TimeInHospital), 30);

        state.jump_to_min();
        state.decrement();
        state.page_down();
        let attrs = state.to_patient_attributes().unwrap();
        assert_eq!(attrs.counts.get(ClinicalCount::TimeInHospital), 1);
    }

    #[test]
    fn test_page_step_ignores_choices() {
        let mut state = PatientFormState::default();
        focus(&mut state, FieldKey::Race);
        state.page_up();
        assert_eq!(state.to_patient_attributes().unwrap().race, Race::Caucasian);
    }

    #[test]
    fn test_unknown_label_is_an_encoding_error() {
        let mut state = PatientFormState::default();
        focus(&mut state, FieldKey::Diagnosis(1));
        state.fields[state.selected_field].input = FieldInput::Choice {
            options: vec!["Gout (274.xx)"],
            selected: 0,
        };
        let err = state.to_patient_attributes().unwrap_err();
        assert!(matches!(err, ReadmitError::Encoding(e) if e.attribute == "Diagnosis"));
    }

    fn render_to_text(state: &PatientFormState) -> String {
        use ratatui::{backend::TestBackend, Terminal};

        let mut terminal = Terminal::new(TestBackend::new(200, 40)).expect("terminal");
        terminal
            .draw(|f| render_patient_form(f, f.area(), state))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_footer_always_shows_key_hints() {
        let mut state = PatientFormState::default();
        assert!(render_to_text(&state).contains("Predict Readmission"));

        // Corrupted selections still render hints; the error belongs to the result screen.
        focus(&mut state, FieldKey::Race);
        state.fields[state.selected_field].input = FieldInput::Choice {
            options: vec!["Martian"],
            selected: 0,
        };
        assert!(state.to_patient_attributes().is_err());
        let text = render_to_text(&state);
        assert!(text.contains("Predict Readmission"));
        assert!(text.contains("Martian"));
    }
}
