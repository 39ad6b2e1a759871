pub type ExpandResult<T> = std::result::Result<T, ExpandError>;

/// The failure a derived field's compute function reports.
///
/// Compute functions build these themselves, or get one for free from
/// [`Record::field`](crate::Record::field) and
/// [`Record::lookup`](crate::Record::lookup) when a sibling is absent.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeriveError {
    pub message: String,
}

impl DeriveError {
    pub fn new<T: Into<String>>(message: T) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing<T: AsRef<str>>(field_name: T) -> Self {
        Self::new(format!("no field '{}' on candidate", field_name.as_ref()))
    }

    pub fn type_mismatch<T: AsRef<str>>(field_name: T, expected: &str) -> Self {
        Self::new(format!(
            "field '{}' is not {}",
            field_name.as_ref(),
            expected
        ))
    }
}

impl std::fmt::Display for DeriveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DeriveError {}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpandError {
    /// No object along the override chain declares the field.
    MissingField { field_name: String },
    /// The override chain revisited an object it had already walked through.
    ///
    /// `links` is the number of chain links followed before the repeat.
    CyclicChain { links: usize },
    /// A derived field's compute function failed.
    DerivedField {
        field_name: String,
        source: DeriveError,
    },
}

impl std::fmt::Display for ExpandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field_name } => {
                write!(f, "Field not found along override chain: {}", field_name)
            }
            Self::CyclicChain { links } => {
                write!(f, "Override chain cycles back on itself after {} links", links)
            }
            Self::DerivedField { field_name, source } => {
                write!(f, "Derived field {} failed: {}", field_name, source)
            }
        }
    }
}

impl std::error::Error for ExpandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DerivedField { source, .. } => Some(source),
            Self::MissingField { .. } | Self::CyclicChain { .. } => None,
        }
    }
}
