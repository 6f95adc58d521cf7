use crate::core::models::selection::{AtomRecord, BondRecord, SelectionSet, SlotRef};
use crate::core::models::workspace::{AtomIndex, SceneBond, WorkspaceSnapshot};
use crate::core::spatial::NeighborIndex;
use crate::core::transform::ComplexTransform;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Radius, in workspace position units, within which unselected atoms are
/// pulled into a run as fixed context.
pub const SELECTION_RADIUS: f64 = 7.0;
/// One hit is enough to accept an atom; the query is a membership test.
const NEIGHBOR_LIMIT: usize = 1;

/// Builds the atom set for one minimization run.
///
/// Two passes over the visible complexes of the snapshot. The first indexes
/// every explicitly selected atom by its workspace-absolute position. The
/// second walks every atom and accepts it if anything selected lies within
/// [`SELECTION_RADIUS`]: the atom gets the next synthetic serial (dense,
/// starting at 1), its workspace position is recorded, and any of its bonds
/// whose other endpoint is already accepted joins the induced subgraph. Atoms
/// accepted with `selected == false` are context atoms; the exporter pins them.
///
/// Deterministic for a fixed snapshot iteration order and a deterministic
/// index. An empty result (no visible complexes, or nothing selected) is the
/// caller's signal that there is nothing to minimize.
pub fn select_atoms<N: NeighborIndex>(
    snapshot: &WorkspaceSnapshot,
    mut index: N,
) -> SelectionSet {
    let mut selection = SelectionSet::default();

    for complex in snapshot.visible_complexes() {
        let transform = capture_transform(complex.local_to_workspace, complex.id.0);
        for atom in &complex.atoms {
            if atom.selected {
                index.insert(atom.index, transform.to_workspace(&atom.position));
            }
        }
        selection.transforms.insert(complex.id, transform);
    }

    let mut accepted: HashMap<AtomIndex, u32> = HashMap::new();
    let mut next_serial: u32 = 1;

    for complex in snapshot.visible_complexes() {
        let transform = selection.transforms[&complex.id];
        let adjacency = bond_adjacency(&complex.bonds);

        for atom in &complex.atoms {
            let workspace_pos = transform.to_workspace(&atom.position);
            let hits = index.nearest(&workspace_pos, SELECTION_RADIUS, NEIGHBOR_LIMIT);
            if hits.is_empty() || accepted.contains_key(&atom.index) {
                continue;
            }

            let serial = next_serial;
            next_serial += 1;
            accepted.insert(atom.index, serial);

            let slot = selection.atoms.len();
            selection.serial_map.insert(
                serial,
                SlotRef {
                    slot,
                    complex: complex.id,
                },
            );
            selection.original_indices.push(atom.index);
            selection.atoms.push(AtomRecord {
                serial,
                index: atom.index,
                element: atom.element.clone(),
                position: workspace_pos,
                selected: atom.selected,
                complex: complex.id,
            });

            // A bond joins the set exactly once, when its later endpoint is
            // accepted and the earlier one is already in the map.
            if let Some(bonds) = adjacency.get(&atom.index) {
                for bond in bonds {
                    let other = if bond.a == atom.index { bond.b } else { bond.a };
                    if other == atom.index {
                        continue;
                    }
                    if let Some(&other_serial) = accepted.get(&other) {
                        selection.bonds.push(BondRecord {
                            a: other_serial,
                            b: serial,
                            order: bond.order,
                        });
                    }
                }
            }
        }
    }

    debug!(
        atoms = selection.atoms.len(),
        bonds = selection.bonds.len(),
        "atom selection complete"
    );
    selection
}

fn capture_transform(matrix: nalgebra::Matrix4<f64>, complex_id: u32) -> ComplexTransform {
    match ComplexTransform::from_matrix(matrix) {
        Some(t) => t,
        None => {
            warn!(complex = complex_id, "complex transform is singular, using identity");
            ComplexTransform::identity()
        }
    }
}

fn bond_adjacency(bonds: &[SceneBond]) -> HashMap<AtomIndex, Vec<SceneBond>> {
    let mut adjacency: HashMap<AtomIndex, Vec<SceneBond>> = HashMap::new();
    for bond in bonds {
        adjacency.entry(bond.a).or_default().push(*bond);
        if bond.b != bond.a {
            adjacency.entry(bond.b).or_default().push(*bond);
        }
    }
    adjacency
}
