//! Domain types for the transit router.
//!
//! This module contains the small value types shared by every layer:
//! transport modes with their per-mode lookup tables, and the simulated
//! clock. All types enforce their invariants at construction time.

mod clock;
mod mode;

pub use clock::{MINUTES_PER_DAY, Minute, TimeError};
pub use mode::{Mode, ModeMap, ModeSet};
