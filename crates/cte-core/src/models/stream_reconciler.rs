use std::time::{Duration, Instant};

use super::message::Citation;

/// Minimum interval between visible content flushes. Bounds UI update
/// frequency independent of how finely the provider chunks its output; a
/// fast stream costs at most one visible update per interval.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(75);

/// Accumulates one in-flight model turn.
///
/// Incoming text goes into `full_text` unconditionally; the throttle only
/// decides when the visible transcript is allowed to catch up to it. Nothing
/// is ever dropped or reordered: finalization re-reads `full_text`, so
/// increments that never cleared the throttle window still land in the
/// finalized message.
///
/// Citations bypass the throttle entirely — they are rare and cheap to show
/// promptly. They accumulate in arrival order with no deduplication.
#[derive(Debug)]
pub struct StreamReconciler {
    full_text: String,
    /// Text received since the last visible flush.
    pending: String,
    citations: Vec<Citation>,
    /// `None` until the first flush, so the first chunk shows immediately.
    last_flush: Option<Instant>,
}

impl StreamReconciler {
    pub fn new() -> Self {
        Self {
            full_text: String::new(),
            pending: String::new(),
            citations: Vec::new(),
            last_flush: None,
        }
    }

    /// Feed a text increment. Returns the full accumulated text when the
    /// throttle window has elapsed and the visible message should be
    /// updated, `None` when the increment stays buffered.
    pub fn push_text(&mut self, chunk: &str) -> Option<String> {
        self.full_text.push_str(chunk);
        self.pending.push_str(chunk);

        let due = match self.last_flush {
            None => true,
            Some(at) => at.elapsed() >= FLUSH_INTERVAL,
        };
        if due && !self.pending.is_empty() {
            self.pending.clear();
            self.last_flush = Some(Instant::now());
            Some(self.full_text.clone())
        } else {
            None
        }
    }

    /// Feed a citation increment. Always flushes: returns the complete
    /// accumulated citation list for immediate visible application.
    pub fn push_citations(&mut self, chunks: Vec<Citation>) -> Vec<Citation> {
        self.citations.extend(chunks);
        self.citations.clone()
    }

    /// Finalize the turn: the full accumulated text (not merely the last
    /// flushed value) and every citation received, in arrival order.
    pub fn finalize(self) -> (String, Vec<Citation>) {
        (self.full_text, self.citations)
    }

    /// Full accumulated text so far, throttle ignored. Used on the failure
    /// path to preserve partial content.
    pub fn accumulated(&self) -> &str {
        &self.full_text
    }
}

impl Default for StreamReconciler {
    fn default() -> Self {
        Self::new()
    }
}
