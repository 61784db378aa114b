//! Reference Table - empirical feed and speed data
//!
//! One row per (material, tool material, operation, depth of cut, cutter diameter)
//! combination, as published in handbook speed/feed charts. The table is read once
//! from CSV and never mutated afterwards.

use crate::error::LoadError;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns of the reference source, with the header text they are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    MaterialFamily,
    MaterialSpecies,
    ToolMaterial,
    Operation,
    DepthOfCut,
    CutterDiameter,
    Feed,
    Speed,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::MaterialFamily,
        Column::MaterialSpecies,
        Column::ToolMaterial,
        Column::Operation,
        Column::DepthOfCut,
        Column::CutterDiameter,
        Column::Feed,
        Column::Speed,
    ];

    /// Header text in the source table
    pub fn header(self) -> &'static str {
        match self {
            Column::MaterialFamily => "Material Family",
            Column::MaterialSpecies => "material species",
            Column::ToolMaterial => "Tool Material",
            Column::Operation => "Operation",
            Column::DepthOfCut => "DOC",
            Column::CutterDiameter => "Cutter Diameter",
            Column::Feed => "Feed",
            Column::Speed => "Speed",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// One entry of the reference table
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    pub family: String,
    pub species: Option<String>,
    pub tool_material: String,
    pub operation: String,
    pub depth_of_cut: Option<f64>,    // inches
    pub cutter_diameter: Option<f64>, // inches
    pub feed: f64,                    // inches per tooth
    pub speed: f64,                   // surface feet per minute
}

impl ReferenceRow {
    /// Text value of a column, `None` for numeric columns and absent species
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::MaterialFamily => Some(&self.family),
            Column::MaterialSpecies => self.species.as_deref(),
            Column::ToolMaterial => Some(&self.tool_material),
            Column::Operation => Some(&self.operation),
            _ => None,
        }
    }

    /// Numeric value of a column, `None` for text columns and blank cells
    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::DepthOfCut => self.depth_of_cut,
            Column::CutterDiameter => self.cutter_diameter,
            Column::Feed => Some(self.feed),
            Column::Speed => Some(self.speed),
            _ => None,
        }
    }
}

/// Immutable table of reference rows
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    /// Load a table from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), rows = table.len(), "loaded reference table");
        Ok(table)
    }

    /// Load a table from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let mut positions = [0usize; 8];
        for (slot, column) in positions.iter_mut().zip(Column::ALL) {
            *slot = headers
                .iter()
                .position(|h| h == column.header())
                .ok_or_else(|| LoadError::MissingColumn(column.header().to_string()))?;
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let row_number = idx + 1;
            let field = |column: Column| {
                record
                    .get(positions[column as usize])
                    .filter(|s| !s.is_empty())
            };
            let number = |column: Column| -> Result<Option<f64>, LoadError> {
                field(column)
                    .map(|raw| {
                        raw.parse::<f64>().map_err(|_| LoadError::InvalidValue {
                            row: row_number,
                            column: column.header().to_string(),
                            value: raw.to_string(),
                        })
                    })
                    .transpose()
            };
            let required = |column: Column| -> Result<f64, LoadError> {
                number(column)?.ok_or_else(|| LoadError::InvalidValue {
                    row: row_number,
                    column: column.header().to_string(),
                    value: String::new(),
                })
            };

            rows.push(ReferenceRow {
                family: field(Column::MaterialFamily).unwrap_or_default().to_string(),
                species: field(Column::MaterialSpecies).map(str::to_string),
                tool_material: field(Column::ToolMaterial).unwrap_or_default().to_string(),
                operation: field(Column::Operation).unwrap_or_default().to_string(),
                depth_of_cut: number(Column::DepthOfCut)?,
                cutter_diameter: number(Column::CutterDiameter)?,
                feed: required(Column::Feed)?,
                speed: required(Column::Speed)?,
            });
        }

        debug!(rows = rows.len(), "parsed reference rows");
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct non-null values of a text column, used for choice lists
    pub fn distinct_values(&self, column: Column) -> BTreeSet<String> {
        distinct_values(self.rows.iter(), column)
    }

    /// Material families present in the table
    pub fn families(&self) -> BTreeSet<String> {
        self.distinct_values(Column::MaterialFamily)
    }
}

/// Distinct non-null text values among `rows`
pub fn distinct_values<'a>(
    rows: impl IntoIterator<Item = &'a ReferenceRow>,
    column: Column,
) -> BTreeSet<String> {
    rows.into_iter()
        .filter_map(|row| row.text(column))
        .map(str::to_string)
        .collect()
}

/// Distinct non-null numbers among `rows`, in first-seen order
pub fn distinct_numbers<'a>(
    rows: impl IntoIterator<Item = &'a ReferenceRow>,
    column: Column,
) -> Vec<f64> {
    let mut seen: Vec<f64> = Vec::new();
    for value in rows.into_iter().filter_map(|row| row.number(column)) {
        if !value.is_nan() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
