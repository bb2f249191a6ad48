//! Frames held back until the report connection opens.

/// Ordered buffer that is drained exactly once.
///
/// Until [`OutboundQueue::drain`] is called every pushed frame is kept;
/// afterwards the queue is disabled and later pushes are dropped.
#[derive(Debug)]
pub struct OutboundQueue {
    frames: Option<Vec<String>>,
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self {
            frames: Some(Vec::new()),
        }
    }
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: String) {
        if let Some(frames) = &mut self.frames {
            frames.push(frame);
        }
    }

    /// Takes every held frame in push order and disables the queue.
    pub fn drain(&mut self) -> Vec<String> {
        self.frames.take().unwrap_or_default()
    }

    /// Frames waiting for the connection.
    pub fn held(&self) -> usize {
        self.frames.as_ref().map_or(0, Vec::len)
    }
}
