//! # Core Module
//!
//! Stateless building blocks for the minimization pipeline.
//!
//! ## Overview
//!
//! This module holds everything the pipeline needs that carries no per-run mutable
//! state: data models for the workspace snapshot handed over by the host scene,
//! the records produced by atom selection, coordinate-space transforms, file
//! writers for the engine's input formats, and the capability interfaces the
//! pipeline consumes rather than implements.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Workspace snapshots and selection records
//! - **Coordinate Spaces** ([`transform`]) - Complex-local ↔ workspace conversions
//! - **Proximity Queries** ([`spatial`]) - Injected nearest-neighbor capability
//! - **File I/O** ([`io`]) - Interchange (SDF V2000) and constraints writers
//! - **Scene Interface** ([`scene`]) - Workspace fetch and live-stream creation

pub mod io;
pub mod models;
pub mod scene;
pub mod spatial;
pub mod transform;
