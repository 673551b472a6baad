use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ReportField;
use crate::error::{ColourError, Result};

// ---------------------------------------------------------------------------
// FieldSelection – which report fields a caller wants
// ---------------------------------------------------------------------------

/// Enabled report fields. Iteration always follows canonical field order,
/// regardless of the order fields were enabled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldSelection {
    enabled: BTreeSet<ReportField>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FieldSelection {
    /// Every field enabled.
    pub fn all() -> Self {
        FieldSelection {
            enabled: ReportField::ALL.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        FieldSelection {
            enabled: BTreeSet::new(),
        }
    }

    /// Select fields by title, e.g. `["X", "CIELAB-L*", "YI"]`.
    pub fn from_titles<I, S>(titles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let enabled = titles
            .into_iter()
            .map(|t| t.as_ref().parse::<ReportField>())
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(FieldSelection { enabled })
    }

    pub fn set(&mut self, field: ReportField, enabled: bool) {
        if enabled {
            self.enabled.insert(field);
        } else {
            self.enabled.remove(&field);
        }
    }

    pub fn is_enabled(&self, field: ReportField) -> bool {
        self.enabled.contains(&field)
    }

    /// Enabled fields in canonical order.
    pub fn fields(&self) -> Vec<ReportField> {
        self.enabled.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl TryFrom<Vec<String>> for FieldSelection {
    type Error = ColourError;

    fn try_from(titles: Vec<String>) -> Result<Self> {
        Self::from_titles(titles)
    }
}

impl From<FieldSelection> for Vec<String> {
    fn from(selection: FieldSelection) -> Self {
        selection
            .fields()
            .into_iter()
            .map(|f| f.title().to_string())
            .collect()
    }
}
