//! Session - one tool, material and operation against a loaded table
//!
//! Every setter validates its input, applies it, and recomputes everything from
//! scratch: filter, interpolate, spindle speed, table feed. A setter that rejects
//! its input changes nothing. A recomputation that fails clears the derived values
//! instead of leaving the previous recommendation on display.
//!
//! A session is not shared. Independent callers each get their own.

use crate::config::Config;
use crate::error::{InvalidArgument, LookupError, SessionError};
use crate::filter::{FilterCriteria, FilterPipeline, Stage};
use crate::interpolate::{resolve, FeedSpeed};
use crate::model::{Material, Operation, Tool};
use crate::physics::{self, PowerConstants, PowerEstimate};
use crate::reference::{distinct_values, Column, ReferenceTable};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Where feed and speed come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Filter and interpolate the reference table
    #[default]
    Table,
    /// Material surface speed and operation chip load, as entered
    Formula,
}

/// Result of a successful recomputation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub feed: f64,      // in/tooth
    pub speed: f64,     // ft/min
    pub rpm: u32,
    pub feed_rate: f64, // in/min
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feed={} speed={} rpm={} feedrate={}",
            self.feed, self.speed, self.rpm, self.feed_rate
        )
    }
}

pub type Outcome = Result<Recommendation, SessionError>;

pub struct Session<'t> {
    table: &'t ReferenceTable,
    power_constants: Option<&'t PowerConstants>,
    pipeline: FilterPipeline,
    tool: Tool,
    material: Material,
    operation: Operation,
    mode: ResolutionMode,
    doc_follows_diameter: bool,
}

impl<'t> Session<'t> {
    pub fn new(table: &'t ReferenceTable) -> Self {
        Self {
            table,
            power_constants: None,
            pipeline: FilterPipeline::new(),
            tool: Tool::default(),
            material: Material::default(),
            operation: Operation::default(),
            mode: ResolutionMode::Table,
            doc_follows_diameter: false,
        }
    }

    pub fn with_config(table: &'t ReferenceTable, config: &Config) -> Self {
        Self {
            tool: config.defaults.tool(),
            operation: config.defaults.operation(),
            doc_follows_diameter: config.doc_follows_diameter,
            ..Self::new(table)
        }
    }

    pub fn with_power_constants(mut self, constants: &'t PowerConstants) -> Self {
        self.power_constants = Some(constants);
        self
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Current selections as filter criteria
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            family: self.material.family.clone(),
            species: self.material.species.clone(),
            tool_material: self.tool.material.clone(),
            operation: self.operation.kind.clone(),
            depth_of_cut: self.operation.depth_of_cut,
            cutter_diameter: self.tool.diameter,
        }
    }

    // Selections

    /// Select a material family. The species belongs to the old family and is cleared.
    pub fn set_material_family(&mut self, family: &str) -> Outcome {
        self.material.family = Some(family.to_string());
        self.material.species = None;
        self.recompute()
    }

    pub fn set_material_species(&mut self, species: Option<&str>) -> Outcome {
        self.material.species = species.map(str::to_string);
        self.recompute()
    }

    pub fn set_tool_material(&mut self, material: Option<&str>) -> Outcome {
        self.tool.material = material.map(str::to_string);
        self.recompute()
    }

    pub fn set_operation(&mut self, kind: Option<&str>) -> Outcome {
        self.operation.kind = kind.map(str::to_string);
        self.recompute()
    }

    pub fn set_depth_of_cut(&mut self, depth: f64) -> Outcome {
        positive("depth of cut", depth)?;
        self.operation.depth_of_cut = depth;
        self.recompute()
    }

    pub fn set_cutter_diameter(&mut self, diameter: f64) -> Outcome {
        positive("tool diameter", diameter)?;
        self.tool.diameter = Some(diameter);
        if self.doc_follows_diameter {
            self.operation.depth_of_cut = diameter;
        }
        self.recompute()
    }

    pub fn set_tooth_count(&mut self, teeth: u32) -> Outcome {
        if teeth == 0 {
            return Err(InvalidArgument::ZeroTeeth.into());
        }
        self.tool.teeth = teeth;
        self.recompute()
    }

    pub fn set_cut_width(&mut self, width: f64) -> Outcome {
        positive("cut width", width)?;
        self.operation.cut_width = width;
        self.recompute()
    }

    pub fn set_chipload(&mut self, chipload: f64) -> Outcome {
        positive("chip load", chipload)?;
        self.operation.chipload = chipload;
        self.recompute()
    }

    pub fn set_hardness(&mut self, hardness: f64) -> Outcome {
        positive("hardness", hardness)?;
        self.material.hardness = hardness;
        self.recompute()
    }

    pub fn set_surface_speed(&mut self, speed: f64) -> Outcome {
        positive("surface speed", speed)?;
        self.material.surface_speed = speed;
        self.recompute()
    }

    pub fn set_mode(&mut self, mode: ResolutionMode) -> Outcome {
        self.mode = mode;
        self.recompute()
    }

    pub fn reset_material(&mut self) -> Outcome {
        self.material.reset();
        self.recompute()
    }

    // Computation

    /// Run the full pass and store the derived values, or clear them on failure
    pub fn recompute(&mut self) -> Outcome {
        self.operation.clear_power();
        match self.compute() {
            Ok(rec) => {
                self.operation.resolved = Some(FeedSpeed {
                    feed: rec.feed,
                    speed: rec.speed,
                });
                self.operation.rpm = Some(rec.rpm);
                self.operation.feed_rate = Some(rec.feed_rate);
                info!(%rec, "recommendation");
                Ok(rec)
            }
            Err(error) => {
                self.operation.clear_derived();
                warn!(%error, "no recommendation");
                Err(error)
            }
        }
    }

    fn compute(&self) -> Outcome {
        let diameter = self.tool.diameter.ok_or(InvalidArgument::DiameterUndefined)?;
        let fs = self.feed_speed(diameter)?;

        let rpm = physics::rpm(fs.speed, Some(diameter))?;
        let feed_rate = physics::table_feed_rate(fs.feed, self.tool.teeth, rpm);
        debug!(rpm, feed_rate, teeth = self.tool.teeth, "derived");

        Ok(Recommendation {
            feed: fs.feed,
            speed: fs.speed,
            rpm,
            feed_rate,
        })
    }

    fn feed_speed(&self, diameter: f64) -> Result<FeedSpeed, SessionError> {
        match self.mode {
            ResolutionMode::Formula => Ok(FeedSpeed {
                feed: self.operation.chipload,
                speed: self.material.surface_speed,
            }),
            ResolutionMode::Table => {
                let outcome = self.pipeline.run(self.table, &self.criteria());
                Ok(resolve(&outcome.rows, diameter, self.operation.depth_of_cut)?)
            }
        }
    }

    /// Removal rate and motor power for the current cut
    pub fn power(&mut self) -> Result<PowerEstimate, SessionError> {
        let rec = self.recompute()?;
        match self.estimate_power(rec.feed_rate) {
            Ok(estimate) => {
                self.operation.removal_rate = Some(estimate.removal_rate);
                self.operation.motor_power = Some(estimate.motor_power);
                Ok(estimate)
            }
            Err(error) => {
                self.operation.clear_power();
                warn!(%error, "no power estimate");
                Err(error)
            }
        }
    }

    fn estimate_power(&self, feed_rate: f64) -> Result<PowerEstimate, SessionError> {
        let constants = self.power_constants.ok_or(LookupError::NoTable)?;
        let family = self
            .material
            .family
            .as_deref()
            .ok_or(LookupError::MaterialUnset)?;
        let kp = constants.kp(family, self.material.hardness)?;

        let op = &self.operation;
        let removal_rate = physics::metal_removal_rate(feed_rate, op.cut_width, op.depth_of_cut);
        let motor_power = physics::motor_power(
            kp,
            op.feed_factor,
            removal_rate,
            op.wear_factor,
            op.efficiency,
        )?;

        Ok(PowerEstimate {
            kp,
            removal_rate,
            motor_power,
        })
    }

    // Choice lists

    /// Species recorded for a family
    pub fn distinct_species_for(&self, family: &str) -> BTreeSet<String> {
        let criteria = FilterCriteria {
            family: Some(family.to_string()),
            ..FilterCriteria::default()
        };
        let outcome = FilterPipeline::through(Stage::Family).run(self.table, &criteria);
        distinct_values(outcome.rows, Column::MaterialSpecies)
    }

    /// Tool materials left after the family and species selections
    pub fn distinct_tool_materials(&self) -> BTreeSet<String> {
        let outcome = FilterPipeline::through(Stage::Species).run(self.table, &self.criteria());
        distinct_values(outcome.rows, Column::ToolMaterial)
    }

    /// Operations left after the family, species and tool material selections
    pub fn distinct_operations(&self) -> BTreeSet<String> {
        let outcome =
            FilterPipeline::through(Stage::ToolMaterial).run(self.table, &self.criteria());
        distinct_values(outcome.rows, Column::Operation)
    }
}

fn positive(what: &'static str, value: f64) -> Result<(), InvalidArgument> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(InvalidArgument::NonPositive { what, value })
    }
}
