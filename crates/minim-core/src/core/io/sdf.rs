use crate::core::models::selection::SelectionSet;
use std::io::{self, Write};

/// Writes the selection as a single molecule in molfile V2000 format.
///
/// Atoms appear in serial order; serials are dense and start at 1, so a bond's
/// serial pair doubles as its 1-based atom-block indices. Positions are the
/// workspace-absolute coordinates recorded at acceptance, which is the frame of
/// reference the engine minimizes in and echoes back in trajectory frames.
pub fn write_sdf<W: Write>(mut writer: W, selection: &SelectionSet) -> io::Result<()> {
    writeln!(writer, "minimization input")?;
    writeln!(writer, "minim")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0  0999 V2000",
        selection.atoms.len(),
        selection.bonds.len()
    )?;

    for atom in &selection.atoms {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
            atom.position.x, atom.position.y, atom.position.z, atom.element
        )?;
    }

    for bond in &selection.bonds {
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.a,
            bond.b,
            bond.order.ctfile_code()
        )?;
    }

    writeln!(writer, "M  END")?;
    writeln!(writer, "$$$$")?;
    Ok(())
}
