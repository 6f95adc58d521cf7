use minim::core::models::workspace::{AtomIndex, WorkspaceSnapshot};
use minim::core::scene::{
    AckHandle, Packet, PositionStream, SceneError, SceneLink, StreamCreationError,
};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The last position buffer the pipeline published, with the atom indices the
/// stream was created over.
#[derive(Debug, Default)]
pub struct FinalPositions {
    pub atom_indices: Vec<AtomIndex>,
    pub positions: Vec<f64>,
    pub packets: u64,
}

/// Headless scene adapter for batch runs.
///
/// In the interactive host the scene is a remote workspace; here it is a
/// snapshot loaded from disk, and the "live channel" just remembers the most
/// recent packet so the driver can write the end state to a file. Every packet
/// is acknowledged immediately, so the window never throttles a batch run.
pub struct FileScene {
    snapshot: WorkspaceSnapshot,
    result: Arc<Mutex<FinalPositions>>,
}

impl FileScene {
    pub fn new(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            snapshot,
            result: Arc::new(Mutex::new(FinalPositions::default())),
        }
    }

    pub fn result(&self) -> Arc<Mutex<FinalPositions>> {
        Arc::clone(&self.result)
    }
}

impl SceneLink for FileScene {
    async fn request_workspace(&mut self) -> Result<WorkspaceSnapshot, SceneError> {
        Ok(self.snapshot.clone())
    }

    async fn create_stream(
        &mut self,
        atom_indices: &[AtomIndex],
    ) -> Result<Box<dyn PositionStream>, StreamCreationError> {
        self.result.lock().unwrap().atom_indices = atom_indices.to_vec();
        Ok(Box::new(RecordingStream {
            result: Arc::clone(&self.result),
        }))
    }
}

struct RecordingStream {
    result: Arc<Mutex<FinalPositions>>,
}

impl PositionStream for RecordingStream {
    fn submit(&mut self, packet: Packet, ack: AckHandle) {
        debug!(packet = packet.id, "position update");
        let mut result = self.result.lock().unwrap();
        result.positions = packet.positions;
        result.packets = packet.id + 1;
        ack.done();
    }

    fn destroy(&mut self) {}
}
