//! Read-only views over networks.

pub mod coi;

pub use coi::CoiView;
