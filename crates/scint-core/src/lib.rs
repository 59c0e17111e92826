#![deny(missing_docs)]
#![doc = "Core error, unit, and geometry primitives shared across the scintillator simulation crates."]

pub mod errors;
pub mod geom;
pub mod units;

pub use errors::{ErrorInfo, SimError};
pub use geom::{Axis3, Size3Mm, Vec3Mm};
