use nalgebra::Point3;
use std::collections::VecDeque;

/// Marker line opening one per-step coordinate record on the engine's stdout.
pub const FRAME_START_MARKER: &str = "Step update start";
/// Marker line closing a coordinate record.
pub const FRAME_END_MARKER: &str = "Step update end";

/// One minimization step's coordinate snapshot, as raw payload lines between
/// the start and end markers. Ephemeral: queued FIFO and consumed one at a
/// time by the mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
}

/// One atom entry parsed out of a frame's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAtom {
    pub serial: u32,
    /// Workspace-absolute position, as minimized by the engine.
    pub position: Point3<f64>,
}

impl Frame {
    /// Parses the frame's `ATOM`/`HETATM` records by fixed PDB columns:
    /// serial in 7-11, coordinates in 31-54. Lines that do not parse are
    /// skipped; a malformed or empty frame simply yields fewer atoms.
    pub fn atoms(&self) -> Vec<FrameAtom> {
        self.lines.iter().filter_map(|l| parse_atom_line(l)).collect()
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_atom_line(line: &str) -> Option<FrameAtom> {
    if !line.starts_with("ATOM") && !line.starts_with("HETATM") {
        return None;
    }
    let serial = slice_and_trim(line, 6, 11).parse::<u32>().ok()?;
    let x = slice_and_trim(line, 30, 38).parse::<f64>().ok()?;
    let y = slice_and_trim(line, 38, 46).parse::<f64>().ok()?;
    let z = slice_and_trim(line, 46, 54).parse::<f64>().ok()?;
    Some(FrameAtom {
        serial,
        position: Point3::new(x, y, z),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Idle,
    Collecting,
}

/// Incremental frame extraction from the engine's line stream.
///
/// A two-state machine over complete lines. Idle scans for the start marker;
/// Collecting gathers payload lines until the end marker, then enqueues the
/// frame and stays in Collecting so back-to-back frames need no idle line in
/// between. A start marker seen mid-frame clears the working buffer and
/// restarts collection — the engine is allowed to emit truncated or duplicated
/// markers and that is never fatal.
#[derive(Debug)]
pub struct TrajectoryParser {
    state: ParserState,
    working: Vec<String>,
    queue: VecDeque<Frame>,
}

impl TrajectoryParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            working: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        if line.contains(FRAME_START_MARKER) {
            self.working.clear();
            self.state = ParserState::Collecting;
        } else if line.contains(FRAME_END_MARKER) {
            if self.state == ParserState::Collecting {
                self.queue.push_back(Frame {
                    lines: std::mem::take(&mut self.working),
                });
            }
        } else if self.state == ParserState::Collecting {
            self.working.push(line.to_string());
        }
    }

    /// Dequeues the oldest complete frame, if any.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.queue.pop_front()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_drained(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for TrajectoryParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats one frame atom as the PDB-style record the engine emits.
/// Test and demo helper; the parser above is its inverse.
pub fn format_atom_line(serial: u32, position: &Point3<f64>) -> String {
    format!(
        "ATOM  {:>5}  C   UNL     1    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
        serial, position.x, position.y, position.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut TrajectoryParser, lines: &[&str]) {
        for line in lines {
            parser.feed_line(line);
        }
    }

    #[test]
    fn well_formed_pairs_yield_frames_in_order() {
        let mut parser = TrajectoryParser::new();
        feed_all(
            &mut parser,
            &[
                FRAME_START_MARKER,
                "LINE1",
                FRAME_END_MARKER,
                FRAME_START_MARKER,
                "LINE2",
                FRAME_END_MARKER,
            ],
        );
        assert_eq!(parser.queued(), 2);
        assert_eq!(parser.pop_frame().unwrap().lines, vec!["LINE1"]);
        assert_eq!(parser.pop_frame().unwrap().lines, vec!["LINE2"]);
        assert!(parser.pop_frame().is_none());
    }

    #[test]
    fn back_to_back_frames_need_no_idle_line() {
        let mut parser = TrajectoryParser::new();
        for k in 0..5 {
            parser.feed_line(FRAME_START_MARKER);
            parser.feed_line(&format!("payload {k}"));
            parser.feed_line(FRAME_END_MARKER);
        }
        assert_eq!(parser.queued(), 5);
    }

    #[test]
    fn duplicate_start_marker_restarts_collection() {
        let mut parser = TrajectoryParser::new();
        feed_all(
            &mut parser,
            &[
                FRAME_START_MARKER,
                "stale",
                FRAME_START_MARKER,
                "fresh",
                FRAME_END_MARKER,
            ],
        );
        assert_eq!(parser.pop_frame().unwrap().lines, vec!["fresh"]);
    }

    #[test]
    fn end_marker_while_idle_is_ignored() {
        let mut parser = TrajectoryParser::new();
        feed_all(&mut parser, &["noise", FRAME_END_MARKER, "more noise"]);
        assert_eq!(parser.queued(), 0);
    }

    #[test]
    fn lines_outside_frames_are_discarded() {
        let mut parser = TrajectoryParser::new();
        feed_all(
            &mut parser,
            &["banner", FRAME_START_MARKER, "kept", FRAME_END_MARKER, "trailer"],
        );
        assert_eq!(parser.pop_frame().unwrap().lines, vec!["kept"]);
        assert!(parser.is_drained());
    }

    #[test]
    fn empty_frame_is_still_enqueued() {
        let mut parser = TrajectoryParser::new();
        feed_all(&mut parser, &[FRAME_START_MARKER, FRAME_END_MARKER]);
        let frame = parser.pop_frame().unwrap();
        assert!(frame.lines.is_empty());
        assert!(frame.atoms().is_empty());
    }

    #[test]
    fn atom_lines_round_trip_through_formatter() {
        let position = Point3::new(12.345, -6.789, 0.001);
        let line = format_atom_line(42, &position);
        let frame = Frame { lines: vec![line] };
        let atoms = frame.atoms();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].serial, 42);
        assert!((atoms[0].position - position).norm() < 1e-3);
    }

    #[test]
    fn junk_payload_lines_are_skipped() {
        let frame = Frame {
            lines: vec![
                "REMARK something".to_string(),
                format_atom_line(1, &Point3::origin()),
                "ATOM  garbage".to_string(),
            ],
        };
        let atoms = frame.atoms();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].serial, 1);
    }

    #[test]
    fn hetatm_records_are_parsed() {
        let line = format_atom_line(7, &Point3::new(1.0, 2.0, 3.0)).replacen("ATOM  ", "HETATM", 1);
        let frame = Frame { lines: vec![line] };
        assert_eq!(frame.atoms()[0].serial, 7);
    }
}
