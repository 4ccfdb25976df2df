//! Patient attribute types for readmission risk prediction.
//!
//! Based on the "Diabetes 130-US hospitals" encounter features.

use serde::{Deserialize, Serialize};

use super::codes::{
    AdmissionType, AgeBracket, DiabetesMedication, DiagnosisCategory, DosageChange, Gender,
    Medication, MedicationChange, Race,
};

/// Bounded integer attributes collected with sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClinicalCount {
    DischargeDisposition,
    AdmissionSource,
    TimeInHospital,
    LabProcedures,
    Procedures,
    Medications,
    OutpatientVisits,
    EmergencyVisits,
    InpatientVisits,
    Diagnoses,
}

impl ClinicalCount {
    pub const COUNT: usize = 10;

    pub const ALL: [Self; Self::COUNT] = [
        Self::DischargeDisposition,
        Self::AdmissionSource,
        Self::TimeInHospital,
        Self::LabProcedures,
        Self::Procedures,
        Self::Medications,
        Self::OutpatientVisits,
        Self::EmergencyVisits,
        Self::InpatientVisits,
        Self::Diagnoses,
    ];

    /// Encounter counts that trail the feature vector, in feature order.
    pub const ENCOUNTER: [Self; 8] = [
        Self::TimeInHospital,
        Self::LabProcedures,
        Self::Procedures,
        Self::Medications,
        Self::OutpatientVisits,
        Self::EmergencyVisits,
        Self::InpatientVisits,
        Self::Diagnoses,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DischargeDisposition => "Discharge Disposition ID",
            Self::AdmissionSource => "Admission Source ID",
            Self::TimeInHospital => "Time in Hospital (days)",
            Self::LabProcedures => "Number of Lab Procedures",
            Self::Procedures => "Number of Procedures",
            Self::Medications => "Number of Medications",
            Self::OutpatientVisits => "Number of Outpatient visits",
            Self::EmergencyVisits => "Number of Emergency visits",
            Self::InpatientVisits => "Number of Inpatient visits",
            Self::Diagnoses => "Number of Diagnoses",
        }
    }

    /// Inclusive slider bounds.
    #[must_use]
    pub fn range(self) -> (u32, u32) {
        match self {
            Self::DischargeDisposition => (0, 25),
            Self::AdmissionSource => (0, 20),
            Self::TimeInHospital => (1, 30),
            Self::LabProcedures => (0, 150),
            Self::Procedures => (0, 10),
            Self::Medications => (0, 100),
            Self::OutpatientVisits | Self::EmergencyVisits | Self::InpatientVisits => (0, 20),
            Self::Diagnoses => (0, 16),
        }
    }

    #[must_use]
    pub fn default_value(self) -> u32 {
        match self {
            Self::DischargeDisposition | Self::AdmissionSource => 1,
            Self::TimeInHospital => 5,
            Self::LabProcedures => 40,
            Self::Procedures => 1,
            Self::Medications => 10,
            Self::OutpatientVisits | Self::EmergencyVisits | Self::InpatientVisits => 0,
            Self::Diagnoses => 5,
        }
    }

    /// Clamp a value into this count's range.
    #[must_use]
    pub fn clamp(self, value: u32) -> u32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Slider values, indexed by `ClinicalCount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalCounts([u32; ClinicalCount::COUNT]);

impl Default for ClinicalCounts {
    fn default() -> Self {
        Self(ClinicalCount::ALL.map(ClinicalCount::default_value))
    }
}

impl ClinicalCounts {
    #[must_use]
    pub fn get(&self, count: ClinicalCount) -> u32 {
        self.0[count.index()]
    }

    pub fn set(&mut self, count: ClinicalCount, value: u32) {
        self.0[count.index()] = value;
    }
}

/// Dosage change per medication, indexed in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MedicationRegimen([DosageChange; Medication::COUNT]);

impl MedicationRegimen {
    #[must_use]
    pub fn get(&self, medication: Medication) -> DosageChange {
        self.0[medication.index()]
    }

    pub fn set(&mut self, medication: Medication, dosage: DosageChange) {
        self.0[medication.index()] = dosage;
    }

    /// Dosages in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (Medication, DosageChange)> + '_ {
        Medication::ALL.iter().map(|&m| (m, self.get(m)))
    }
}

/// Operator selections for one prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientAttributes {
    pub age: AgeBracket,
    pub gender: Gender,
    pub race: Race,
    pub admission_type: AdmissionType,
    /// Primary, secondary and additional diagnosis
    pub diagnoses: [DiagnosisCategory; 3],
    pub medications: MedicationRegimen,
    pub change: MedicationChange,
    pub diabetes_med: DiabetesMedication,
    pub counts: ClinicalCounts,
}

impl Default for PatientAttributes {
    fn default() -> Self {
        Self {
            age: AgeBracket::Age0To10,
            gender: Gender::Male,
            race: Race::Caucasian,
            admission_type: AdmissionType::Emergency,
            diagnoses: [
                DiagnosisCategory::Diabetes,
                DiagnosisCategory::Hypertension,
                DiagnosisCategory::IschemicHeartDisease,
            ],
            medications: MedicationRegimen::default(),
            change: MedicationChange::No,
            diabetes_med: DiabetesMedication::No,
            counts: ClinicalCounts::default(),
        }
    }
}

impl PatientAttributes {
    /// Validate that every slider value lies in its range.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = ClinicalCount::ALL
            .iter()
            .filter_map(|&count| {
                let value = self.counts.get(count);
                let (min, max) = count.range();
                (!(min..=max).contains(&value))
                    .then(|| format!("{} {} out of range [{}, {}]", count.label(), value, min, max))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A frequently readmitted profile: elderly, several prior inpatient stays,
    /// insulin adjusted during the stay.
    #[must_use]
    pub fn sample() -> Self {
        let mut attrs = Self {
            age: AgeBracket::Age70To80,
            gender: Gender::Female,
            race: Race::AfricanAmerican,
            admission_type: AdmissionType::Emergency,
            diagnoses: [
                DiagnosisCategory::IschemicHeartDisease,
                DiagnosisCategory::ChronicKidneyDisease,
                DiagnosisCategory::Diabetes,
            ],
            change: MedicationChange::Changed,
            diabetes_med: DiabetesMedication::Yes,
            ..Self::default()
        };
        attrs.medications.set(Medication::Insulin, DosageChange::Up);
        attrs.medications.set(Medication::Metformin, DosageChange::Steady);
        for (count, value) in [
            (ClinicalCount::DischargeDisposition, 3),
            (ClinicalCount::AdmissionSource, 7),
            (ClinicalCount::TimeInHospital, 9),
            (ClinicalCount::LabProcedures, 68),
            (ClinicalCount::Procedures, 2),
            (ClinicalCount::Medications, 24),
            (ClinicalCount::OutpatientVisits, 1),
            (ClinicalCount::EmergencyVisits, 2),
            (ClinicalCount::InpatientVisits, 4),
            (ClinicalCount::Diagnoses, 9),
        ] {
            attrs.counts.set(count, value);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let attrs = PatientAttributes::default();
        assert_eq!(attrs.counts.get(ClinicalCount::TimeInHospital), 5);
        assert_eq!(attrs.counts.get(ClinicalCount::LabProcedures), 40);
        assert_eq!(attrs.counts.get(ClinicalCount::Diagnoses), 5);
        assert_eq!(attrs.counts.get(ClinicalCount::DischargeDisposition), 1);
        assert_eq!(attrs.diagnoses[1], DiagnosisCategory::Hypertension);
        assert!(attrs.medications.iter().all(|(_, d)| d == DosageChange::No));
        assert!(attrs.validate().is_ok());
    }

    #[test]
    fn test_defaults_lie_within_ranges() {
        for count in ClinicalCount::ALL {
            let (min, max) = count.range();
            assert!((min..=max).contains(&count.default_value()), "{count:?}");
        }
    }

    #[test]
    fn test_validation_reports_each_out_of_range_count() {
        let mut attrs = PatientAttributes::default();
        attrs.counts.set(ClinicalCount::TimeInHospital, 0);
        attrs.counts.set(ClinicalCount::LabProcedures, 151);
        let errors = attrs.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Time in Hospital"));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(ClinicalCount::TimeInHospital.clamp(0), 1);
        assert_eq!(ClinicalCount::Procedures.clamp(99), 10);
        assert_eq!(ClinicalCount::Medications.clamp(42), 42);
    }

    #[test]
    fn test_sample_is_valid() {
        let sample = PatientAttributes::sample();
        assert!(sample.validate().is_ok());
        assert_eq!(sample.medications.get(Medication::Insulin), DosageChange::Up);
    }

    #[test]
    fn test_attributes_json_uses_labels() {
        let json = serde_json::to_value(PatientAttributes::default()).unwrap();
        assert_eq!(json["age"], "[0-10)");
        assert_eq!(json["diagnoses"][2], "Ischemic Heart Disease (414.xx)");
    }
}
