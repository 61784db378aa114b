//! Filter pipeline - narrows the reference table to the rows bracketing a setup
//!
//! Stages run in a fixed order. Equality stages keep rows matching a criterion and
//! pass everything through when the criterion is unset. Bracket stages keep rows
//! whose depth of cut (or cutter diameter) is one of the two table values nearest
//! the request.
//!
//! A stage that fails leaves the rows exactly as the previous stage produced them.
//! The failure is recorded in the outcome and the remaining stages still run.

use crate::bracket::Bracket;
use crate::error::InvalidArgument;
use crate::reference::{distinct_numbers, Column, ReferenceRow, ReferenceTable};
use tracing::{debug, warn};

/// What the user has selected so far
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub family: Option<String>,
    pub species: Option<String>,
    pub tool_material: Option<String>,
    pub operation: Option<String>,
    pub depth_of_cut: f64,
    pub cutter_diameter: Option<f64>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            family: None,
            species: None,
            tool_material: None,
            operation: None,
            depth_of_cut: 0.25,
            cutter_diameter: None,
        }
    }
}

/// Named pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Family,
    Species,
    ToolMaterial,
    Operation,
    DepthOfCut,
    CutterDiameter,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Family,
        Stage::Species,
        Stage::ToolMaterial,
        Stage::Operation,
        Stage::DepthOfCut,
        Stage::CutterDiameter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Family => "material family",
            Stage::Species => "material species",
            Stage::ToolMaterial => "tool material",
            Stage::Operation => "operation",
            Stage::DepthOfCut => "depth of cut",
            Stage::CutterDiameter => "cutter diameter",
        }
    }

    /// Run this stage over `rows`
    pub fn apply<'t>(
        self,
        rows: Vec<&'t ReferenceRow>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'t ReferenceRow>, InvalidArgument> {
        match self {
            // The family is mandatory: with none selected nothing matches
            Stage::Family => Ok(match &criteria.family {
                Some(family) => keep_equal(rows, Column::MaterialFamily, family),
                None => Vec::new(),
            }),
            Stage::Species => Ok(keep_if_set(rows, Column::MaterialSpecies, &criteria.species)),
            Stage::ToolMaterial => Ok(keep_if_set(
                rows,
                Column::ToolMaterial,
                &criteria.tool_material,
            )),
            Stage::Operation => Ok(keep_if_set(rows, Column::Operation, &criteria.operation)),
            Stage::DepthOfCut => keep_bracketed(rows, Column::DepthOfCut, criteria.depth_of_cut),
            Stage::CutterDiameter => {
                let diameter = criteria
                    .cutter_diameter
                    .ok_or(InvalidArgument::DiameterUndefined)?;
                keep_bracketed(rows, Column::CutterDiameter, diameter)
            }
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn keep_equal<'t>(rows: Vec<&'t ReferenceRow>, column: Column, wanted: &str) -> Vec<&'t ReferenceRow> {
    rows.into_iter()
        .filter(|row| row.text(column) == Some(wanted))
        .collect()
}

fn keep_if_set<'t>(
    rows: Vec<&'t ReferenceRow>,
    column: Column,
    wanted: &Option<String>,
) -> Vec<&'t ReferenceRow> {
    match wanted {
        Some(value) => keep_equal(rows, column, value),
        None => rows,
    }
}

fn keep_bracketed<'t>(
    rows: Vec<&'t ReferenceRow>,
    column: Column,
    target: f64,
) -> Result<Vec<&'t ReferenceRow>, InvalidArgument> {
    let values = distinct_numbers(rows.iter().copied(), column);
    let bracket = Bracket::around(&values, target)?;
    debug!(%column, target, low = bracket.low, high = bracket.high, "bracket");

    Ok(rows
        .into_iter()
        .filter(|row| row.number(column).is_some_and(|v| bracket.contains(v)))
        .collect())
}

/// A stage that failed and was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: InvalidArgument,
}

/// Rows surviving the pipeline, plus any stages that had to be skipped
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome<'t> {
    pub rows: Vec<&'t ReferenceRow>,
    pub failures: Vec<StageFailure>,
}

impl<'t> FilterOutcome<'t> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered sequence of stages
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPipeline {
    stages: Vec<Stage>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPipeline {
    /// The full pipeline, all six stages in order
    pub fn new() -> Self {
        Self {
            stages: Stage::ALL.to_vec(),
        }
    }

    pub fn with_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Stages from the start up to and including `last`
    pub fn through(last: Stage) -> Self {
        let end = Stage::ALL
            .iter()
            .position(|s| *s == last)
            .map_or(Stage::ALL.len(), |i| i + 1);
        Self {
            stages: Stage::ALL[..end].to_vec(),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn run<'t>(&self, table: &'t ReferenceTable, criteria: &FilterCriteria) -> FilterOutcome<'t> {
        let mut rows: Vec<&'t ReferenceRow> = table.rows().iter().collect();
        let mut failures = Vec::new();

        for &stage in &self.stages {
            let before = rows.len();
            match stage.apply(rows.clone(), criteria) {
                Ok(kept) => {
                    debug!(%stage, before, after = kept.len(), "filter stage");
                    rows = kept;
                }
                Err(error) => {
                    warn!(%stage, %error, rows = before, "filter stage skipped");
                    failures.push(StageFailure { stage, error });
                }
            }
        }

        debug!(results = rows.len(), "filter pipeline done");
        FilterOutcome { rows, failures }
    }
}

/// Run the full pipeline
pub fn filter<'t>(table: &'t ReferenceTable, criteria: &FilterCriteria) -> FilterOutcome<'t> {
    FilterPipeline::new().run(table, criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
Material Family,material species,Tool Material,Operation,DOC,Cutter Diameter,Feed,Speed
Plywood,,HSS,End Milling,0.25,0.125,0.003,500
Plywood,,HSS,End Milling,0.25,0.25,0.005,600
Plywood,,HSS,End Milling,0.25,0.5,0.009,700
Plywood,,HSS,End Milling,0.5,0.25,0.004,500
Plywood,,HSS,End Milling,0.5,0.5,0.007,600
Plywood,Baltic Birch,Carbide,End Milling,0.25,0.25,0.006,900
Plywood,Baltic Birch,Carbide,End Milling,0.25,0.5,0.011,1000
Plywood,,HSS,Slotting,0.125,0.25,0.002,400
MDF,,HSS,End Milling,0.25,0.25,0.004,600
";

    fn table() -> ReferenceTable {
        ReferenceTable::from_reader(TABLE.as_bytes()).unwrap()
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria {
            family: Some("Plywood".to_string()),
            species: None,
            tool_material: Some("HSS".to_string()),
            operation: Some("End Milling".to_string()),
            depth_of_cut: 0.25,
            cutter_diameter: Some(0.157),
        }
    }

    fn diameters(outcome: &FilterOutcome) -> Vec<f64> {
        outcome.rows.iter().filter_map(|r| r.cutter_diameter).collect()
    }

    #[test]
    fn test_full_pipeline_brackets_diameter() {
        let table = table();
        let outcome = filter(&table, &criteria());
        assert!(outcome.is_complete());
        assert_eq!(diameters(&outcome), vec![0.125, 0.25]);
        assert!(outcome.rows.iter().all(|r| r.depth_of_cut == Some(0.25)));
    }

    #[test]
    fn test_exact_diameter_keeps_one_row() {
        let table = table();
        let mut c = criteria();
        c.cutter_diameter = Some(0.25);
        let outcome = filter(&table, &c);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].feed, 0.005);
    }

    #[test]
    fn test_unknown_family_matches_nothing() {
        let table = table();
        let mut c = criteria();
        c.family = Some("Granite".to_string());
        let outcome = filter(&table, &c);
        assert!(outcome.rows.is_empty());
        // Bracket stages have nothing to bracket and are skipped
        let stages: Vec<_> = outcome.failures.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec![Stage::DepthOfCut, Stage::CutterDiameter]);
    }

    #[test]
    fn test_unset_family_matches_nothing() {
        let table = table();
        let mut c = criteria();
        c.family = None;
        assert!(filter(&table, &c).rows.is_empty());
    }

    #[test]
    fn test_unset_criterion_is_identity() {
        let table = table();
        let mut c = criteria();
        c.species = None;
        c.tool_material = None;
        c.operation = None;

        let full = filter(&table, &c);
        let without = FilterPipeline::with_stages(vec![
            Stage::Family,
            Stage::DepthOfCut,
            Stage::CutterDiameter,
        ])
        .run(&table, &c);
        assert_eq!(full.rows, without.rows);

        for stage in [Stage::Species, Stage::ToolMaterial, Stage::Operation] {
            let rows: Vec<_> = table.rows().iter().collect();
            assert_eq!(stage.apply(rows.clone(), &c).unwrap(), rows);
        }
    }

    #[test]
    fn test_species_filter() {
        let table = table();
        let mut c = criteria();
        c.species = Some("Baltic Birch".to_string());
        c.tool_material = None;
        c.cutter_diameter = Some(0.3);
        let outcome = filter(&table, &c);
        assert_eq!(diameters(&outcome), vec![0.25, 0.5]);
        assert!(outcome.rows.iter().all(|r| r.tool_material == "Carbide"));
    }

    #[test]
    fn test_depth_bracket() {
        let table = table();
        let mut c = criteria();
        c.depth_of_cut = 0.3;
        c.cutter_diameter = Some(0.5);
        let outcome = filter(&table, &c);
        // Depths 0.25 and 0.5 both carry a 0.5" row
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(diameters(&outcome), vec![0.5, 0.5]);
    }

    #[test]
    fn test_undefined_diameter_keeps_depth_rows() {
        let table = table();
        let mut c = criteria();
        c.cutter_diameter = None;
        let outcome = filter(&table, &c);
        assert_eq!(
            outcome.failures,
            vec![StageFailure {
                stage: Stage::CutterDiameter,
                error: InvalidArgument::DiameterUndefined,
            }]
        );
        // Rows left as the depth stage produced them
        assert_eq!(diameters(&outcome), vec![0.125, 0.25, 0.5]);
    }

    #[test]
    fn test_partial_pipelines() {
        assert_eq!(
            FilterPipeline::through(Stage::Species).stages(),
            &[Stage::Family, Stage::Species]
        );
        let table = table();
        let outcome = FilterPipeline::through(Stage::Family).run(&table, &criteria());
        assert_eq!(outcome.rows.len(), 8);
    }
}
