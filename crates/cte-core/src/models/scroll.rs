/// How close to the true bottom (in pixels) still counts as anchored.
pub const BOTTOM_TOLERANCE: f32 = 150.0;

/// Tracks whether the user is anchored to the bottom of the transcript.
///
/// The anchor is recomputed from every scroll event the shell reports. On
/// each visible-state change the shell asks `should_autoscroll()`: when the
/// user has scrolled up to read earlier content the answer is `false` and
/// the view is left alone.
#[derive(Debug)]
pub struct ScrollAnchor {
    anchored: bool,
}

impl ScrollAnchor {
    pub fn new() -> Self {
        // Fresh transcripts start at the bottom.
        Self { anchored: true }
    }

    /// Recompute the anchor from a scroll event's geometry.
    pub fn observe(&mut self, scroll_top: f32, scroll_height: f32, viewport_height: f32) {
        self.anchored = scroll_height - scroll_top - viewport_height < BOTTOM_TOLERANCE;
    }

    /// Re-anchor regardless of current position. Called when the user acts
    /// (sends a prompt, switches context) and expects to follow the reply.
    pub fn force_bottom(&mut self) {
        self.anchored = true;
    }

    /// Whether a visible-state change should scroll the transcript.
    pub fn should_autoscroll(&self) -> bool {
        self.anchored
    }
}

impl Default for ScrollAnchor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_anchored() {
        assert!(ScrollAnchor::new().should_autoscroll());
    }

    #[test]
    fn test_within_tolerance_counts_as_bottom() {
        let mut anchor = ScrollAnchor::new();
        // 100px short of the bottom: still anchored.
        anchor.observe(1000.0, 1700.0, 600.0);
        assert!(anchor.should_autoscroll());
    }

    #[test]
    fn test_scrolled_up_releases_anchor() {
        let mut anchor = ScrollAnchor::new();
        anchor.observe(200.0, 2000.0, 600.0);
        assert!(!anchor.should_autoscroll());
    }

    #[test]
    fn test_force_bottom_reanchors() {
        let mut anchor = ScrollAnchor::new();
        anchor.observe(0.0, 2000.0, 600.0);
        assert!(!anchor.should_autoscroll());
        anchor.force_bottom();
        assert!(anchor.should_autoscroll());
    }
}
