use crate::registry::AmountBound;

/// Reasons a declaration cannot be submitted yet. The `Display` output is the
/// message shown next to the offending field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("{label} is required")]
    FieldMissing { key: String, label: String },
    #[error("Select at least one {label} item")]
    SelectionMissing { key: String, label: String },
    #[error("{label} must {bound}")]
    RangeViolation {
        key: String,
        label: String,
        bound: AmountBound,
    },
    #[error("{label} '{value}' is not a valid choice for this instrument")]
    InvalidChoice {
        key: String,
        label: String,
        value: String,
    },
    #[error("Expire date must not be earlier than the effective date")]
    DateOrder { key: String },
}

impl ValidationFailure {
    /// The form key the UI highlights for this failure.
    pub fn key(&self) -> &str {
        match self {
            Self::FieldMissing { key, .. }
            | Self::SelectionMissing { key, .. }
            | Self::RangeViolation { key, .. }
            | Self::InvalidChoice { key, .. }
            | Self::DateOrder { key } => key,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeclarationError {
    #[error("Declaration has {0} outstanding validation error(s)")]
    Invalid(usize),
    #[error("Filing service rejected submission {0}")]
    Rejected(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
