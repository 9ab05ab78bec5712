//! Public configuration and output types for area scoring.
#![forbid(unsafe_code)]

use cellmark_core::Precision;
use serde::{Deserialize, Serialize};

use crate::ScoreReportError;

/// Cell size used to turn areas and lengths into scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Edge length of one scoring cell in degrees.
    pub cell_resolution_degrees: f64,
}

impl ScoreConfig {
    /// Area of one scoring cell in square degrees.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "cell area is the square of the edge length"
    )]
    pub const fn cell_area(&self) -> f64 {
        self.cell_resolution_degrees * self.cell_resolution_degrees
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            cell_resolution_degrees: Precision::FINEST.resolution_degrees(),
        }
    }
}

/// One report line: `(name, score, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    /// Display name of the feature, if any.
    pub name: Option<String>,
    /// Score of the feature.
    pub score: u64,
    /// Identifier of the feature.
    pub id: u64,
}

/// Scores for a sequence of features, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    rows: Vec<ScoreRow>,
}

impl ScoreReport {
    /// Wrap pre-computed rows.
    #[must_use]
    pub const fn new(rows: Vec<ScoreRow>) -> Self {
        Self { rows }
    }

    /// Borrow the rows.
    #[must_use]
    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Return the number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Report whether the report has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all scores, saturating at `u64::MAX`.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows
            .iter()
            .fold(0_u64, |total, row| total.saturating_add(row.score))
    }

    /// Consume the report and return the rows.
    #[must_use]
    pub fn into_inner(self) -> Vec<ScoreRow> {
        self.rows
    }

    /// Render the rows as a JSON array of `{name, score, id}` objects.
    ///
    /// # Errors
    /// Returns [`ScoreReportError::Serialise`] if encoding fails.
    pub fn to_json(&self) -> Result<String, ScoreReportError> {
        serde_json::to_string(&self.rows).map_err(|source| ScoreReportError::Serialise { source })
    }

    /// Render the rows as delimited text with a `name,score,id` header.
    ///
    /// Names containing the delimiter, a double quote, or a line break are
    /// quoted, with inner quotes doubled. Missing names are left empty.
    ///
    /// # Errors
    /// Returns [`ScoreReportError::InvalidDelimiter`] for `"`, `\r` or
    /// `\n`.
    pub fn to_delimited(&self, delimiter: char) -> Result<String, ScoreReportError> {
        if matches!(delimiter, '"' | '\r' | '\n') {
            return Err(ScoreReportError::InvalidDelimiter { delimiter });
        }
        let mut text = format!("name{delimiter}score{delimiter}id\n");
        for row in &self.rows {
            let name = row
                .name
                .as_deref()
                .map(|name| quote_field(name, delimiter))
                .unwrap_or_default();
            text.push_str(&format!(
                "{name}{delimiter}{}{delimiter}{}\n",
                row.score, row.id
            ));
        }
        Ok(text)
    }
}

impl<'a> IntoIterator for &'a ScoreReport {
    type Item = &'a ScoreRow;
    type IntoIter = std::slice::Iter<'a, ScoreRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn quote_field(field: &str, delimiter: char) -> String {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || matches!(c, '"' | '\r' | '\n'));
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
