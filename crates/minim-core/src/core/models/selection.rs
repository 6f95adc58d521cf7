use super::workspace::{AtomIndex, BondOrder, ComplexId};
use crate::core::transform::ComplexTransform;
use nalgebra::Point3;
use std::collections::HashMap;

/// One atom accepted into a minimization run.
///
/// Created at selection time, discarded when the run ends. The synthetic serial
/// is the identity the external engine sees and echoes back in trajectory
/// frames; it is dense (1..=N) and never reused within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// Run-local synthetic serial, assigned 1..=N in acceptance order.
    pub serial: u32,
    /// The scene's own identity for this atom.
    pub index: AtomIndex,
    /// Element symbol, carried through to the interchange file.
    pub element: String,
    /// Workspace-absolute position recorded at acceptance.
    pub position: Point3<f64>,
    /// The user's original selection flag. `false` means the atom was pulled in
    /// only by proximity (a context atom) and will be pinned by the constraints
    /// file.
    pub selected: bool,
    /// The complex the atom belongs to.
    pub complex: ComplexId,
}

/// A bond between two accepted atoms, by synthetic serial.
///
/// Bonds are the induced subgraph of the selection: a bond is recorded iff both
/// endpoints were accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondRecord {
    pub a: u32,
    pub b: u32,
    pub order: BondOrder,
}

/// Where a synthetic serial lands in the flat position buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    /// Index into the selection-ordered position buffer (`slot * 3` is the x lane).
    pub slot: usize,
    /// Owning complex, used to pick the session transform when mapping back.
    pub complex: ComplexId,
}

/// Everything one run needs to know about its accepted atom set.
///
/// Built once by the spatial selector, read-only afterwards. Owned by the
/// pipeline run, not by the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    /// Accepted atoms in serial order.
    pub atoms: Vec<AtomRecord>,
    /// Bonds of the induced subgraph.
    pub bonds: Vec<BondRecord>,
    /// Scene indices of the accepted atoms, in serial order; this is the key
    /// list the live update channel is created over.
    pub original_indices: Vec<AtomIndex>,
    /// Synthetic serial → position-buffer slot.
    pub serial_map: HashMap<u32, SlotRef>,
    /// Session-captured transforms of every visible complex.
    pub transforms: HashMap<ComplexId, ComplexTransform>,
}

impl SelectionSet {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Length of the flat position buffer: three lanes per tracked atom.
    pub fn buffer_len(&self) -> usize {
        self.atoms.len() * 3
    }
}
