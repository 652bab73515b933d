use serde::{Deserialize, Serialize};

/// A single vehicle application of a part
///
/// Every field is free text as published by the vendor; any of them may be
/// blank. Two fitments are equal when all five fields are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fitment {
    pub year: String,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub engine: String,
}

impl Fitment {
    pub fn new(
        year: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        trim: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        Self {
            year: year.into(),
            make: make.into(),
            model: model.into(),
            trim: trim.into(),
            engine: engine.into(),
        }
    }

    /// The placeholder used when a product lists no applications
    pub fn blank() -> Self {
        Self::default()
    }

    /// Returns true if every field is empty
    pub fn is_blank(&self) -> bool {
        self.year.is_empty()
            && self.make.is_empty()
            && self.model.is_empty()
            && self.trim.is_empty()
            && self.engine.is_empty()
    }
}
