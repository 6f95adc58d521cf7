use crate::core::models::selection::SelectionSet;
use std::io::{self, Write};

/// Writes the engine's constraints file: one `ATOM:FIXED:<serial>` line per
/// context atom.
///
/// Atoms the user explicitly selected stay free; everything pulled into the run
/// only by proximity is pinned so the engine cannot drag the surroundings along.
pub fn write_constraints<W: Write>(mut writer: W, selection: &SelectionSet) -> io::Result<()> {
    for atom in &selection.atoms {
        if !atom.selected {
            writeln!(writer, "ATOM:FIXED:{}", atom.serial)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::selection::AtomRecord;
    use crate::core::models::workspace::ComplexId;
    use nalgebra::Point3;

    fn selection_with_flags(flags: &[bool]) -> SelectionSet {
        let mut selection = SelectionSet::default();
        for (i, selected) in flags.iter().enumerate() {
            selection.atoms.push(AtomRecord {
                serial: (i + 1) as u32,
                index: i as u64,
                element: "C".to_string(),
                position: Point3::origin(),
                selected: *selected,
                complex: ComplexId(0),
            });
        }
        selection
    }

    #[test]
    fn only_context_atoms_are_pinned() {
        let mut buf = Vec::new();
        write_constraints(&mut buf, &selection_with_flags(&[true, false, true, false])).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "ATOM:FIXED:2\nATOM:FIXED:4\n");
    }

    #[test]
    fn all_selected_produces_empty_file() {
        let mut buf = Vec::new();
        write_constraints(&mut buf, &selection_with_flags(&[true, true])).unwrap();
        assert!(buf.is_empty());
    }
}
