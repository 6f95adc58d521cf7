//! # Workflows Module
//!
//! The public, highest-level API of the crate.
//!
//! [`minimize`] ties the core models and the engine components together into
//! the complete pipeline: select atoms from a workspace snapshot, export the
//! interchange and constraints files, supervise the external engine, parse its
//! streamed trajectory incrementally, map frames back into scene coordinates,
//! and publish them to the live channel under sliding-window flow control.

pub mod minimize;
