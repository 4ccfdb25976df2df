//! Categorical code tables.
//!
//! Each categorical attribute is an enum whose variants are the only labels the
//! operator can be offered. The label and the integer code the model was
//! trained on live side by side in one table per attribute, so the form and
//! the encoder can never disagree about the domain.

use serde::{Deserialize, Serialize};

/// A label was offered or supplied that has no code in the attribute's table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no code for {attribute} label {label:?}")]
pub struct EncodingError {
    /// Attribute whose table was consulted
    pub attribute: &'static str,
    /// The label that failed to resolve
    pub label: String,
}

/// A finite, immutable label-to-code table.
pub trait Categorical: Copy + Eq + Sized + 'static {
    /// Human-readable attribute name (used in form labels and errors).
    const ATTRIBUTE: &'static str;

    /// Every variant, in the order the operator is offered them.
    const ALL: &'static [Self];

    /// Label shown to the operator.
    fn label(self) -> &'static str;

    /// Integer code used at training time.
    fn code(self) -> u32;

    /// Resolve a label to its variant.
    ///
    /// # Errors
    /// Returns `EncodingError` if the label is not in the table.
    fn from_label(label: &str) -> Result<Self, EncodingError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label() == label)
            .ok_or_else(|| EncodingError {
                attribute: Self::ATTRIBUTE,
                label: label.to_string(),
            })
    }

    /// Labels in offer order.
    #[must_use]
    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.label()).collect()
    }

    /// Position of this variant in `ALL`.
    #[must_use]
    fn position(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident, $attribute:literal {
            $($(#[$vmeta:meta])* $variant:ident => ($label:literal, $code:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl Categorical for $name {
            const ATTRIBUTE: &'static str = $attribute;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn code(self) -> u32 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = EncodingError;

            fn try_from(label: String) -> Result<Self, Self::Error> {
                Self::from_label(&label)
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.label()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

code_table! {
    /// Age bracket in decades.
    AgeBracket, "Age" {
        Age0To10 => ("[0-10)", 0),
        Age10To20 => ("[10-20)", 1),
        Age20To30 => ("[20-30)", 2),
        Age30To40 => ("[30-40)", 3),
        Age40To50 => ("[40-50)", 4),
        Age50To60 => ("[50-60)", 5),
        Age60To70 => ("[60-70)", 6),
        Age70To80 => ("[70-80)", 7),
        Age80To90 => ("[80-90)", 8),
        Age90To100 => ("[90-100)", 9),
    }
}

code_table! {
    Gender, "Gender" {
        Male => ("Male", 1),
        Female => ("Female", 0),
    }
}

code_table! {
    Race, "Race" {
        Caucasian => ("Caucasian", 0),
        AfricanAmerican => ("AfricanAmerican", 1),
        Other => ("Other", 2),
        Asian => ("Asian", 3),
        Hispanic => ("Hispanic", 4),
    }
}

code_table! {
    /// Admission type as recorded at intake.
    AdmissionType, "Admission Type" {
        Emergency => ("Emergency", 0),
        Urgent => ("Urgent", 1),
        Elective => ("Elective", 2),
        Newborn => ("Newborn", 3),
        NotAvailable => ("Not Available", 4),
        TraumaCenter => ("Trauma Center", 5),
        NotMapped => ("Not Mapped", 6),
        Unknown => ("Unknown", 7),
    }
}

code_table! {
    /// Diagnosis category (ICD-9 group). Codes are the label-encoder values of
    /// the grouped diagnosis column, not ICD codes.
    DiagnosisCategory, "Diagnosis" {
        Diabetes => ("Diabetes (250.xx)", 42),
        Hypertension => ("Hypertension (401.xx)", 18),
        IschemicHeartDisease => ("Ischemic Heart Disease (414.xx)", 27),
        Asthma => ("Asthma (493.xx)", 36),
        Pneumonia => ("Pneumonia (486.xx)", 22),
        ChronicKidneyDisease => ("Chronic Kidney Disease (585.xx)", 57),
        Obesity => ("Obesity (278.xx)", 13),
        Other => ("Other", 0),
    }
}

code_table! {
    /// Dosage change of a single medication during the encounter.
    DosageChange, "Dosage" {
        No => ("No", 0),
        Steady => ("Steady", 1),
        Up => ("Up", 2),
        Down => ("Down", 3),
    }
}

impl Default for DosageChange {
    fn default() -> Self {
        Self::No
    }
}

code_table! {
    /// Whether any diabetic medication was changed.
    MedicationChange, "Change in medications?" {
        No => ("No", 0),
        Changed => ("Ch", 1),
    }
}

code_table! {
    /// Whether any diabetic medication was prescribed.
    DiabetesMedication, "Is on diabetes medication?" {
        No => ("No", 0),
        Yes => ("Yes", 1),
    }
}

/// Medications tracked by the model.
///
/// Discriminants follow the training-time feature order. `examide` and
/// `citoglipton` are constant in the source data and were dropped before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Medication {
    Metformin,
    Repaglinide,
    Nateglinide,
    Chlorpropamide,
    Glimepiride,
    Acetohexamide,
    Glipizide,
    Glyburide,
    Tolbutamide,
    Pioglitazone,
    Rosiglitazone,
    Acarbose,
    Miglitol,
    Troglitazone,
    Tolazamide,
    Insulin,
    GlyburideMetformin,
    GlipizideMetformin,
    GlimepiridePioglitazone,
    MetforminRosiglitazone,
    MetforminPioglitazone,
}

impl Medication {
    pub const COUNT: usize = 21;

    /// Feature order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Metformin,
        Self::Repaglinide,
        Self::Nateglinide,
        Self::Chlorpropamide,
        Self::Glimepiride,
        Self::Acetohexamide,
        Self::Glipizide,
        Self::Glyburide,
        Self::Tolbutamide,
        Self::Pioglitazone,
        Self::Rosiglitazone,
        Self::Acarbose,
        Self::Miglitol,
        Self::Troglitazone,
        Self::Tolazamide,
        Self::Insulin,
        Self::GlyburideMetformin,
        Self::GlipizideMetformin,
        Self::GlimepiridePioglitazone,
        Self::MetforminRosiglitazone,
        Self::MetforminPioglitazone,
    ];

    /// Order in which the form presents medications (most prescribed first).
    pub const FORM_ORDER: [Self; Self::COUNT] = [
        Self::Metformin,
        Self::Insulin,
        Self::Glipizide,
        Self::Glyburide,
        Self::Glimepiride,
        Self::Repaglinide,
        Self::Nateglinide,
        Self::Chlorpropamide,
        Self::Acetohexamide,
        Self::Tolbutamide,
        Self::Pioglitazone,
        Self::Rosiglitazone,
        Self::Acarbose,
        Self::Miglitol,
        Self::Troglitazone,
        Self::Tolazamide,
        Self::GlyburideMetformin,
        Self::GlipizideMetformin,
        Self::GlimepiridePioglitazone,
        Self::MetforminRosiglitazone,
        Self::MetforminPioglitazone,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Metformin => "Metformin",
            Self::Repaglinide => "Repaglinide",
            Self::Nateglinide => "Nateglinide",
            Self::Chlorpropamide => "Chlorpropamide",
            Self::Glimepiride => "Glimepiride",
            Self::Acetohexamide => "Acetohexamide",
            Self::Glipizide => "Glipizide",
            Self::Glyburide => "Glyburide",
            Self::Tolbutamide => "Tolbutamide",
            Self::Pioglitazone => "Pioglitazone",
            Self::Rosiglitazone => "Rosiglitazone",
            Self::Acarbose => "Acarbose",
            Self::Miglitol => "Miglitol",
            Self::Troglitazone => "Troglitazone",
            Self::Tolazamide => "Tolazamide",
            Self::Insulin => "Insulin",
            Self::GlyburideMetformin => "Glyburide-Metformin",
            Self::GlipizideMetformin => "Glipizide-Metformin",
            Self::GlimepiridePioglitazone => "Glimepiride-Pioglitazone",
            Self::MetforminRosiglitazone => "Metformin-Rosiglitazone",
            Self::MetforminPioglitazone => "Metformin-Pioglitazone",
        }
    }

    /// Column name in the training data.
    #[must_use]
    pub fn feature_name(self) -> &'static str {
        match self {
            Self::Metformin => "metformin",
            Self::Repaglinide => "repaglinide",
            Self::Nateglinide => "nateglinide",
            Self::Chlorpropamide => "chlorpropamide",
            Self::Glimepiride => "glimepiride",
            Self::Acetohexamide => "acetohexamide",
            Self::Glipizide => "glipizide",
            Self::Glyburide => "glyburide",
            Self::Tolbutamide => "tolbutamide",
            Self::Pioglitazone => "pioglitazone",
            Self::Rosiglitazone => "rosiglitazone",
            Self::Acarbose => "acarbose",
            Self::Miglitol => "miglitol",
            Self::Troglitazone => "troglitazone",
            Self::Tolazamide => "tolazamide",
            Self::Insulin => "insulin",
            Self::GlyburideMetformin => "glyburide-metformin",
            Self::GlipizideMetformin => "glipizide-metformin",
            Self::GlimepiridePioglitazone => "glimepiride-pioglitazone",
            Self::MetforminRosiglitazone => "metformin-rosiglitazone",
            Self::MetforminPioglitazone => "metformin-pioglitazone",
        }
    }

    /// Index into feature-ordered arrays.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}
