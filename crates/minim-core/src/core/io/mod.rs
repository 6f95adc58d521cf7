//! Writers for the two files the external engine consumes.
//!
//! The interchange file ([`sdf`]) carries the selected atom/bond set as one
//! synthetic molecule with 3D coordinates and bonds enabled. The constraints
//! file ([`constraints`]) pins every context atom so only the user's explicit
//! selection is free to move. Both writers are plain `io::Result` producers;
//! the workflow wraps failures with the offending path.

pub mod constraints;
pub mod sdf;
