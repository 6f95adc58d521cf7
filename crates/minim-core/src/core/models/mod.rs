//! Data models shared across the pipeline.
//!
//! [`workspace`] describes the input side: the snapshot of the host scene the
//! pipeline operates on. [`selection`] describes the output of the spatial
//! selector: the run-local atom/bond set with synthetic serials and the
//! serial → buffer-slot map used to correlate engine output back to the scene.

pub mod selection;
pub mod workspace;
