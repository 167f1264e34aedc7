//! Multimodal route planner.
//!
//! Answers "how do I get from here to there?" over a network of roads and
//! timetabled transit lines, minimizing distance, fare or arrival time,
//! optionally under an arrival deadline.

pub mod batch;
pub mod domain;
pub mod export;
pub mod geo;
pub mod graph;
pub mod ingest;
pub mod itinerary;
pub mod planner;
pub mod router;
pub mod schedule;
