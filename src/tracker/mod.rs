mod area;
mod cadence;
mod error;
mod fetch;
mod parsing;
mod reckoning;
mod registry;
mod simulation;
mod tracker;
mod types;

pub use area::BoundingBox;
pub use fetch::OpenSkyClient;
pub use parsing::parse_states;
pub use registry::HeadingMode;
pub use tracker::{Tracker, TrackerCommand, TrackerMode, TrackerService, TrackerStatus};
pub use types::{GeoPosition, SizeClass};
