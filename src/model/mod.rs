//! Tool, workpiece material and operation state

use crate::interpolate::FeedSpeed;

/// Cutting tool
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub diameter: Option<f64>, // inches, unset until the user supplies it
    pub teeth: u32,
    pub material: Option<String>, // HSS, Carbide, ...
    pub stickout: f64,
    pub scale_factor: f64,
}

impl Default for Tool {
    fn default() -> Self {
        Self {
            diameter: None,
            teeth: 1,
            material: None,
            stickout: 0.0,
            scale_factor: 1.0,
        }
    }
}

/// Workpiece material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub family: Option<String>,
    pub species: Option<String>,
    pub hardness: f64,      // Brinell
    pub surface_speed: f64, // ft/min, nominal
}

impl Default for Material {
    fn default() -> Self {
        Self {
            family: None,
            species: None,
            hardness: 1.0,
            surface_speed: 1.0,
        }
    }
}

impl Material {
    pub fn reset(&mut self) {
        self.family = None;
        self.species = None;
    }
}

/// Cut parameters and the quantities derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: Option<String>, // e.g. "End Milling"
    pub cut_width: f64,       // in
    pub depth_of_cut: f64,    // in
    pub chipload: f64,        // in/tooth, as entered

    // Power model factors
    pub feed_factor: f64, // C
    pub wear_factor: f64, // W
    pub efficiency: f64,  // E

    // Derived
    pub resolved: Option<FeedSpeed>, // feed and speed of the last pass
    pub rpm: Option<u32>,
    pub feed_rate: Option<f64>,    // in/min
    pub removal_rate: Option<f64>, // in^3/min
    pub motor_power: Option<f64>,  // hp
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            kind: None,
            cut_width: 2.0,
            depth_of_cut: 0.25,
            chipload: 0.01,
            feed_factor: 1.0,
            wear_factor: 1.0,
            efficiency: 1.0,
            resolved: None,
            rpm: None,
            feed_rate: None,
            removal_rate: None,
            motor_power: None,
        }
    }
}

impl Operation {
    /// Forget every derived quantity so nothing stale is shown
    pub fn clear_derived(&mut self) {
        self.resolved = None;
        self.rpm = None;
        self.feed_rate = None;
        self.clear_power();
    }

    pub fn clear_power(&mut self) {
        self.removal_rate = None;
        self.motor_power = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tool = Tool::default();
        assert_eq!(tool.teeth, 1);
        assert_eq!(tool.diameter, None);

        let op = Operation::default();
        assert_eq!(op.cut_width, 2.0);
        assert_eq!(op.depth_of_cut, 0.25);
        assert_eq!(op.chipload, 0.01);
    }

    #[test]
    fn test_clear_derived() {
        let mut op = Operation {
            resolved: Some(FeedSpeed { feed: 0.004, speed: 300.0 }),
            rpm: Some(1100),
            feed_rate: Some(8.8),
            removal_rate: Some(4.4),
            motor_power: Some(0.5),
            ..Operation::default()
        };
        op.clear_derived();
        assert_eq!(op.resolved, None);
        assert_eq!(op.rpm, None);
        assert_eq!(op.feed_rate, None);
        assert_eq!(op.motor_power, None);
    }

    #[test]
    fn test_material_reset() {
        let mut m = Material {
            family: Some("Plywood".to_string()),
            species: Some("Baltic Birch".to_string()),
            ..Material::default()
        };
        m.reset();
        assert_eq!(m, Material::default());
    }
}
