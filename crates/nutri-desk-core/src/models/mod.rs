//! Domain models for the nutri-desk system.

mod food;
mod meal_plan;
mod measurement;
mod patient;
mod settings;

pub use food::*;
pub use meal_plan::*;
pub use measurement::*;
pub use patient::*;
pub use settings::*;

#[cfg(test)]
pub(crate) use patient::tests::sample_intake;
