//! Domain models for the patient records system.

mod patient;
mod update;
mod validation;

pub use patient::*;
pub use update::*;
pub use validation::*;
