use crate::core::models::workspace::{AtomIndex, WorkspaceSnapshot};
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

/// One outbound position update submitted to the live channel.
///
/// Carries a monotonically increasing id (assigned by the publisher) and the
/// full flat position buffer, three lanes per tracked atom in selection order.
/// Coordinates are in each atom's owning-complex local space, which is what the
/// host scene's position stream consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: u64,
    pub positions: Vec<f64>,
}

/// Acknowledgment handle delivered alongside each packet.
///
/// The transport calls [`AckHandle::done`] once the packet has been accepted by
/// the remote end; the publisher uses these acks to keep its sliding window.
/// Dropping the handle without calling `done` abandons the packet, which is the
/// expected behavior on stream teardown.
#[derive(Debug)]
pub struct AckHandle {
    id: u64,
    tx: mpsc::UnboundedSender<u64>,
}

impl AckHandle {
    /// Builds a handle reporting `id` onto `tx`. Normally only the publisher
    /// creates these; exposed so transports can be exercised in isolation.
    pub fn new(id: u64, tx: mpsc::UnboundedSender<u64>) -> Self {
        Self { id, tx }
    }

    /// Marks the packet as acknowledged. Safe to call after the publisher has
    /// shut down; the ack is then simply discarded.
    pub fn done(self) {
        let _ = self.tx.send(self.id);
    }
}

/// The outbound live-update transport, as the pipeline sees it.
///
/// Implementations forward each packet to the visualization channel and invoke
/// the ack handle when the channel confirms receipt. `destroy` tears the
/// channel down; packets submitted before `destroy` may remain unacknowledged.
pub trait PositionStream: Send {
    fn submit(&mut self, packet: Packet, ack: AckHandle);
    fn destroy(&mut self);
}

/// Why creating the live update channel failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamCreationError {
    /// A referenced atom no longer exists in the scene — the user edited the
    /// workspace between selection and channel creation. Recoverable: the
    /// pipeline retries once against a fresh snapshot.
    #[error("a selected atom no longer exists in the scene")]
    AtomNotFound,
    /// Any other channel-creation failure. Terminal.
    #[error("stream creation rejected: {0}")]
    Rejected(String),
}

/// Error fetching the workspace snapshot from the host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("workspace request failed: {0}")]
pub struct SceneError(pub String);

/// The scene collaborator surface the pipeline consumes.
///
/// The host embedding the pipeline provides this: a way to fetch the current
/// workspace snapshot and a way to open a position stream over a set of atoms.
/// Both are asynchronous round trips to the scene.
pub trait SceneLink {
    fn request_workspace(
        &mut self,
    ) -> impl Future<Output = Result<WorkspaceSnapshot, SceneError>> + Send;

    fn create_stream(
        &mut self,
        atom_indices: &[AtomIndex],
    ) -> impl Future<Output = Result<Box<dyn PositionStream>, StreamCreationError>> + Send;
}
