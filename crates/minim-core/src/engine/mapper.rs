use crate::core::models::selection::SelectionSet;
use crate::core::models::workspace::ComplexId;
use crate::core::transform::ComplexTransform;
use crate::engine::trajectory::Frame;
use std::collections::HashMap;
use tracing::trace;

/// Maps parsed trajectory frames back into scene coordinates.
///
/// Owns the flat position buffer for the run: three lanes per tracked atom,
/// selection order, complex-local coordinates. The buffer is seeded from each
/// atom's position at selection time and is never re-zeroed between frames, so
/// an atom absent from a particular frame keeps its last published position
/// instead of snapping to the origin (re-zeroing produces visible flicker).
#[derive(Debug)]
pub struct FrameMapper {
    serial_slots: HashMap<u32, (usize, ComplexId)>,
    transforms: HashMap<ComplexId, ComplexTransform>,
    buffer: Vec<f64>,
}

impl FrameMapper {
    pub fn new(selection: &SelectionSet) -> Self {
        let mut buffer = vec![0.0; selection.buffer_len()];
        for (slot, atom) in selection.atoms.iter().enumerate() {
            let transform = selection
                .transforms
                .get(&atom.complex)
                .copied()
                .unwrap_or_default();
            let local = transform.to_local(&atom.position);
            buffer[slot * 3] = local.x;
            buffer[slot * 3 + 1] = local.y;
            buffer[slot * 3 + 2] = local.z;
        }
        Self {
            serial_slots: selection
                .serial_map
                .iter()
                .map(|(serial, slot_ref)| (*serial, (slot_ref.slot, slot_ref.complex)))
                .collect(),
            transforms: selection.transforms.clone(),
            buffer,
        }
    }

    /// Applies one frame and returns the buffer to publish.
    ///
    /// Each parsed atom whose serial is tracked has its workspace-absolute
    /// position converted through the owning complex's session transform and
    /// written into its three lanes. Unknown serials and empty frames are
    /// no-ops.
    pub fn apply(&mut self, frame: &Frame) -> Vec<f64> {
        let mut matched = 0usize;
        for atom in frame.atoms() {
            let Some(&(slot, complex)) = self.serial_slots.get(&atom.serial) else {
                continue;
            };
            let transform = self.transforms.get(&complex).copied().unwrap_or_default();
            let local = transform.to_local(&atom.position);
            self.buffer[slot * 3] = local.x;
            self.buffer[slot * 3 + 1] = local.y;
            self.buffer[slot * 3 + 2] = local.z;
            matched += 1;
        }
        trace!(matched, "frame mapped");
        self.buffer.clone()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}
