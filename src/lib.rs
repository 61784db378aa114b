//! Speed and feed selection for milling
//!
//! Narrows an empirical reference table to the rows that bracket a setup,
//! interpolates chip load and surface speed at the tool diameter, and turns them
//! into spindle speed, table feed and motor power.

pub mod bracket;
pub mod config;
pub mod error;
pub mod filter;
pub mod interpolate;
pub mod lexer;
pub mod model;
pub mod physics;
pub mod reference;
pub mod script;
pub mod session;

pub use error::{InvalidArgument, LoadError, LookupError, SessionError, Unresolved};
pub use reference::{ReferenceRow, ReferenceTable};
pub use session::{Recommendation, ResolutionMode, Session};
