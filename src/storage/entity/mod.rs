pub mod geographic_record;
pub mod language_record;
pub mod onomatopoeia_type;
pub mod speaker;
pub mod village;

/// A choice field received a code outside its closed vocabulary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {field} choice {value:?}")]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
}

impl UnknownChoice {
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}
