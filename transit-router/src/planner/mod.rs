//! Route planner.
//!
//! A single label-correcting search answers every query kind: shortest
//! distance, cheapest fare (with or without waiting for timetables),
//! earliest arrival, and cheapest fare under an arrival deadline. The
//! query kind is chosen by a `SearchConfig`, not by separate code paths.

mod config;
mod path;
mod search;

pub use config::{Dominance, Objective, SearchConfig};
pub use path::{DisconnectedPath, Hop, Path};
pub use search::{Planner, SearchError, SearchResult, SettledLabel};
