//! # Engine Module
//!
//! The stateful pieces of one minimization run.
//!
//! ## Overview
//!
//! Everything here has a create/use/discard lifecycle scoped to a single run:
//! the spatial selector builds the run's atom set, the supervisor owns the
//! external engine subprocess, the trajectory parser turns its streamed output
//! into frames, the mapper turns frames back into scene coordinates, and the
//! packet window meters how fast those coordinates may be pushed to the live
//! channel. No piece holds process-wide state; a new run builds all of them
//! fresh.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run parameters and engine invocation settings
//! - **Error Handling** ([`error`]) - Run-level error types
//! - **Atom Selection** ([`selection`]) - Proximity-driven selection policy
//! - **Process Supervision** ([`supervisor`]) - Subprocess launch, line assembly, typed events
//! - **Trajectory Parsing** ([`trajectory`]) - Marker-delimited frame extraction
//! - **Coordinate Mapping** ([`mapper`]) - Frame → flat position buffer
//! - **Flow Control** ([`stream`]) - Sliding-window packet publisher
//! - **Progress Monitoring** ([`progress`]) - Host-facing run status events

pub mod config;
pub mod error;
pub mod mapper;
pub mod progress;
pub mod selection;
pub mod stream;
pub mod supervisor;
pub mod trajectory;
