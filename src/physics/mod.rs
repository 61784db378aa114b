//! Milling formulas (Machinery's Handbook)
//!
//! Spindle speed from surface speed, table feed from chip load, metal removal
//! rate and motor power from cut geometry.

use crate::error::InvalidArgument;
use std::f64::consts::PI;
use tracing::debug;

pub mod power;

pub use power::{PowerConstants, PowerEstimate};

/// Spindle speed for a surface speed in ft/min and a diameter in inches,
/// rounded to a selectable spindle step.
///
/// N = 12 * ss / (pi * D)
pub fn rpm(surface_speed: f64, tool_diameter: Option<f64>) -> Result<u32, InvalidArgument> {
    let diameter = tool_diameter.ok_or(InvalidArgument::DiameterUndefined)?;
    if !(diameter > 0.0) {
        return Err(InvalidArgument::NonPositive {
            what: "tool diameter",
            value: diameter,
        });
    }

    let n = (12.0 * surface_speed) / (PI * diameter);
    let rounded = round_rpm(n);
    debug!(surface_speed, diameter, raw = n, rpm = rounded, "spindle speed");
    Ok(rounded)
}

/// Steps of 10 below 1000 RPM, steps of 100 from 1000 up
pub fn round_rpm(x: f64) -> u32 {
    if x < 1000.0 {
        ((x / 10.0).round() * 10.0) as u32
    } else {
        ((x / 100.0).round() * 100.0) as u32
    }
}

/// Table feed in in/min, to one decimal
///
/// fm = f * nt * N
pub fn table_feed_rate(chipload: f64, teeth: u32, rpm: u32) -> f64 {
    let fm = chipload * teeth as f64 * rpm as f64;
    (fm * 10.0).round() / 10.0
}

/// Metal removal rate in in^3/min
///
/// Q = fm * w * doc
pub fn metal_removal_rate(feed_rate: f64, cut_width: f64, depth_of_cut: f64) -> f64 {
    feed_rate * cut_width * depth_of_cut
}

/// Power at the motor in hp
///
/// Pm = Kp * C * Q * W / E
pub fn motor_power(
    kp: f64,
    feed_factor: f64,
    removal_rate: f64,
    wear_factor: f64,
    efficiency: f64,
) -> Result<f64, InvalidArgument> {
    if !(efficiency > 0.0) {
        return Err(InvalidArgument::NonPositive {
            what: "machine efficiency",
            value: efficiency,
        });
    }
    Ok((kp * feed_factor * removal_rate * wear_factor) / efficiency)
}
