use nalgebra::{Matrix4, Point3};

/// Scene-assigned identity of an atom, stable for the lifetime of the scene.
///
/// This is the identity the live update channel is keyed on; it is distinct from
/// the run-local synthetic serial assigned during selection.
pub type AtomIndex = u64;

/// Identifies one complex within a workspace snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComplexId(pub u32);

/// Covalent bond order, mapped to CTfile codes when exporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// CTfile (molfile V2000) bond type code.
    pub fn ctfile_code(&self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }
}

/// One atom as reported by the host scene.
///
/// The position is in the owning complex's local space; conversion to workspace
/// space goes through the complex's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAtom {
    /// Scene-assigned identity, used to key the live update channel.
    pub index: AtomIndex,
    /// Element symbol (e.g. "C", "N", "Fe").
    pub element: String,
    /// Position in the owning complex's local space.
    pub position: Point3<f64>,
    /// Whether the user explicitly selected this atom for minimization.
    pub selected: bool,
}

/// A bond between two atoms of the same complex, by scene index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneBond {
    pub a: AtomIndex,
    pub b: AtomIndex,
    pub order: BondOrder,
}

/// One complex of the workspace, already reduced to its single active
/// conformer/frame by the host before the snapshot is taken.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSnapshot {
    pub id: ComplexId,
    pub visible: bool,
    /// Column-major homogeneous transform from complex-local to workspace space.
    pub local_to_workspace: Matrix4<f64>,
    pub atoms: Vec<SceneAtom>,
    pub bonds: Vec<SceneBond>,
}

impl ComplexSnapshot {
    /// Creates an empty, visible complex with an identity transform.
    pub fn new(id: ComplexId) -> Self {
        Self {
            id,
            visible: true,
            local_to_workspace: Matrix4::identity(),
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }
}

/// The scene state one minimization run operates on.
///
/// A snapshot is immutable input: the pipeline never writes back into it, and it
/// assumes the host does not reparent or move the captured complexes while the
/// run is live (positions published after such an edit would be stale).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceSnapshot {
    pub complexes: Vec<ComplexSnapshot>,
}

impl WorkspaceSnapshot {
    pub fn visible_complexes(&self) -> impl Iterator<Item = &ComplexSnapshot> {
        self.complexes.iter().filter(|c| c.visible)
    }
}
