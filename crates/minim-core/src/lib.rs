//! # Minim Core Library
//!
//! A pipeline that mediates between an interactive 3D molecular workspace and an
//! external, opaque force-field minimization engine run as a subprocess. It selects
//! which atoms participate in a run, exports them to an interchange file, launches
//! and supervises the engine, incrementally parses its streamed per-step trajectory
//! while the engine is still running, maps resulting coordinates back into the
//! scene's coordinate spaces, and republishes them to a live visualization channel
//! under sliding-window flow control.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (workspace
//!   snapshots, selection records, coordinate transforms), the interchange and
//!   constraints file writers, and the interfaces the pipeline consumes from its
//!   host scene (proximity index, live position stream).
//!
//! - **[`engine`]: The Logic Core.** This stateful layer holds the moving parts of
//!   one minimization run: the spatial selector, the subprocess supervisor, the
//!   incremental trajectory parser, the frame-to-scene coordinate mapper, and the
//!   acknowledgment-windowed packet publisher.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It
//!   ties `engine` and `core` together into the complete
//!   select → export → supervise → parse → map → publish pipeline and is the
//!   entry point for hosts embedding the minimization feature.

pub mod core;
pub mod engine;
pub mod workflows;
