use crate::core::scene::{AckHandle, Packet, PositionStream};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::debug;

/// Sliding-window flow control over the live position stream.
///
/// Packet ids increase monotonically from zero. A packet is in flight from
/// `publish` until the transport calls its ack handle; acks arrive on an
/// internal channel and are drained on the consuming tick, never from the
/// transport's context. The window rule gates the *pipeline*, not the engine:
/// while the window is full, frame consumption pauses but engine output keeps
/// being drained upstream.
pub struct PacketWindow {
    stream: Box<dyn PositionStream>,
    window: usize,
    next_id: u64,
    acked: HashSet<u64>,
    ack_tx: mpsc::UnboundedSender<u64>,
    ack_rx: mpsc::UnboundedReceiver<u64>,
    closed: bool,
}

impl PacketWindow {
    pub fn new(stream: Box<dyn PositionStream>, window: usize) -> Self {
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        Self {
            stream,
            window: window.max(1),
            next_id: 0,
            acked: HashSet::new(),
            ack_tx,
            ack_rx,
            closed: false,
        }
    }

    fn drain_acks(&mut self) {
        while let Ok(id) = self.ack_rx.try_recv() {
            self.acked.insert(id);
        }
    }

    /// Whether the next frame may be mapped and published: the packet trailing
    /// the window (`next_id − window`) must have been acknowledged.
    pub fn can_publish(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.drain_acks();
        if self.next_id < self.window as u64 {
            return true;
        }
        self.acked.contains(&(self.next_id - self.window as u64))
    }

    /// Submits the next packet. Callers check [`can_publish`](Self::can_publish)
    /// first; publishing past the window is a caller bug and is refused.
    pub fn publish(&mut self, positions: Vec<f64>) {
        if self.closed || !self.can_publish() {
            return;
        }
        let id = self.next_id;
        self.next_id += 1;
        let ack = AckHandle::new(id, self.ack_tx.clone());
        self.stream.submit(Packet { id, positions }, ack);
    }

    /// Packets submitted and not yet acknowledged.
    pub fn in_flight(&mut self) -> usize {
        self.drain_acks();
        self.next_id as usize - self.acked.len()
    }

    pub fn published(&self) -> u64 {
        self.next_id
    }

    /// Destroys the stream and abandons all pending acknowledgments. Further
    /// publishes are silently dropped. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.closed {
            debug!(pending = self.next_id as usize - self.acked.len(), "stream shutdown");
            self.stream.destroy();
            self.closed = true;
        }
    }
}

impl Drop for PacketWindow {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records submissions and lets tests ack selectively.
    #[derive(Default)]
    struct RecordingStream {
        inner: Arc<Mutex<RecordingState>>,
    }

    #[derive(Default)]
    struct RecordingState {
        packets: Vec<Packet>,
        acks: Vec<AckHandle>,
        destroyed: bool,
    }

    impl RecordingStream {
        fn handle(&self) -> Arc<Mutex<RecordingState>> {
            Arc::clone(&self.inner)
        }
    }

    impl PositionStream for RecordingStream {
        fn submit(&mut self, packet: Packet, ack: AckHandle) {
            let mut state = self.inner.lock().unwrap();
            state.packets.push(packet);
            state.acks.push(ack);
        }

        fn destroy(&mut self) {
            self.inner.lock().unwrap().destroyed = true;
        }
    }

    fn window_of(size: usize) -> (PacketWindow, Arc<Mutex<RecordingState>>) {
        let stream = RecordingStream::default();
        let handle = stream.handle();
        (PacketWindow::new(Box::new(stream), size), handle)
    }

    fn ack_oldest(handle: &Arc<Mutex<RecordingState>>) {
        let ack = handle.lock().unwrap().acks.remove(0);
        ack.done();
    }

    #[test]
    fn ids_are_monotonic_from_zero() {
        let (mut window, handle) = window_of(8);
        for _ in 0..3 {
            window.publish(vec![0.0]);
        }
        let ids: Vec<u64> = handle.lock().unwrap().packets.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn window_blocks_until_trailing_packet_acked() {
        // Scenario: window 2, packets 0 and 1 in flight, 0 unacked.
        let (mut window, handle) = window_of(2);
        window.publish(vec![0.0]);
        window.publish(vec![1.0]);
        assert!(!window.can_publish());

        window.publish(vec![2.0]); // refused
        assert_eq!(handle.lock().unwrap().packets.len(), 2);

        ack_oldest(&handle);
        assert!(window.can_publish());
        window.publish(vec![2.0]);
        assert_eq!(handle.lock().unwrap().packets.len(), 3);
    }

    #[test]
    fn in_flight_never_exceeds_window() {
        let (mut window, handle) = window_of(4);
        for i in 0..32 {
            if window.can_publish() {
                window.publish(vec![i as f64]);
            } else {
                ack_oldest(&handle);
            }
            assert!(window.in_flight() <= 4);
        }
    }

    #[test]
    fn out_of_order_acks_only_free_the_trailing_slot_when_due() {
        let (mut window, handle) = window_of(2);
        window.publish(vec![0.0]);
        window.publish(vec![1.0]);
        // Ack packet 1 but not packet 0: the trailing slot is still held.
        let ack1 = handle.lock().unwrap().acks.remove(1);
        ack1.done();
        assert!(!window.can_publish());
        ack_oldest(&handle);
        assert!(window.can_publish());
    }

    #[test]
    fn shutdown_destroys_stream_and_drops_publishes() {
        let (mut window, handle) = window_of(2);
        window.publish(vec![0.0]);
        window.shutdown();
        window.shutdown();
        assert!(handle.lock().unwrap().destroyed);
        assert!(!window.can_publish());
        window.publish(vec![1.0]);
        assert_eq!(handle.lock().unwrap().packets.len(), 1);
    }

    #[test]
    fn acks_after_shutdown_are_harmless() {
        let (mut window, handle) = window_of(2);
        window.publish(vec![0.0]);
        window.shutdown();
        ack_oldest(&handle);
    }
}
