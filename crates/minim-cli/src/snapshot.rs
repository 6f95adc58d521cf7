use crate::error::{CliError, Result};
use minim::core::models::workspace::{
    BondOrder, ComplexId, ComplexSnapshot, SceneAtom, SceneBond, WorkspaceSnapshot,
};
use nalgebra::{Matrix4, Point3};
use serde::Deserialize;
use std::path::Path;

/// On-disk workspace snapshot format.
///
/// ```toml
/// [[complex]]
/// visible = true
/// transform = [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1]  # row-major, optional
///
/// [[complex.atoms]]
/// element = "C"
/// position = [0.0, 0.0, 0.0]
/// selected = true
///
/// [[complex.bonds]]
/// a = 0          # per-complex atom indices
/// b = 1
/// order = "single"
/// ```
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default, rename = "complex")]
    complexes: Vec<ComplexEntry>,
}

#[derive(Debug, Deserialize)]
struct ComplexEntry {
    #[serde(default = "default_true")]
    visible: bool,
    /// Row-major 4x4 local→workspace matrix; identity when omitted.
    transform: Option<Vec<f64>>,
    #[serde(default)]
    atoms: Vec<AtomEntry>,
    #[serde(default)]
    bonds: Vec<BondEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    element: String,
    position: [f64; 3],
    #[serde(default)]
    selected: bool,
}

#[derive(Debug, Deserialize)]
struct BondEntry {
    a: usize,
    b: usize,
    order: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Loads a workspace snapshot, assigning scene atom indices densely across
/// complexes in file order.
pub fn load(path: &Path) -> Result<WorkspaceSnapshot> {
    let text = std::fs::read_to_string(path)?;
    let file: SnapshotFile = toml::from_str(&text).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: anyhow::Error::new(e),
    })?;

    let mut workspace = WorkspaceSnapshot::default();
    let mut next_index: u64 = 0;

    for (complex_pos, entry) in file.complexes.into_iter().enumerate() {
        let mut complex = ComplexSnapshot::new(ComplexId(complex_pos as u32));
        complex.visible = entry.visible;
        if let Some(values) = entry.transform {
            if values.len() != 16 {
                return Err(CliError::Config(format!(
                    "complex {complex_pos}: transform must have 16 entries, got {}",
                    values.len()
                )));
            }
            complex.local_to_workspace = Matrix4::from_row_slice(&values);
        }

        let base_index = next_index;
        for atom in &entry.atoms {
            complex.atoms.push(SceneAtom {
                index: next_index,
                element: atom.element.clone(),
                position: Point3::new(atom.position[0], atom.position[1], atom.position[2]),
                selected: atom.selected,
            });
            next_index += 1;
        }

        for bond in &entry.bonds {
            if bond.a >= entry.atoms.len() || bond.b >= entry.atoms.len() {
                return Err(CliError::Config(format!(
                    "complex {complex_pos}: bond references atom {} outside 0..{}",
                    bond.a.max(bond.b),
                    entry.atoms.len()
                )));
            }
            complex.bonds.push(SceneBond {
                a: base_index + bond.a as u64,
                b: base_index + bond.b as u64,
                order: parse_order(bond.order.as_deref(), complex_pos)?,
            });
        }

        workspace.complexes.push(complex);
    }

    Ok(workspace)
}

fn parse_order(order: Option<&str>, complex_pos: usize) -> Result<BondOrder> {
    match order.map(|s| s.to_ascii_lowercase()).as_deref() {
        None | Some("single") => Ok(BondOrder::Single),
        Some("double") => Ok(BondOrder::Double),
        Some("triple") => Ok(BondOrder::Triple),
        Some("aromatic") => Ok(BondOrder::Aromatic),
        Some(other) => Err(CliError::Config(format!(
            "complex {complex_pos}: unknown bond order '{other}'"
        ))),
    }
}
