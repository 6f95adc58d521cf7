/// Lifecycle of one minimization run, as surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Files written, live channel requested.
    Starting,
    /// Engine alive, frames flowing under the window rule.
    Running,
    /// Engine exited; the frame backlog is still being consumed.
    Draining,
    /// Queue empty and engine gone, or an explicit stop.
    Stopped,
}

#[derive(Debug, Clone)]
pub enum Progress {
    StateChange(PipelineState),
    FramePublished { packet_id: u64 },
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
