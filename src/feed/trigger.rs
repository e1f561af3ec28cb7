/// Edge detector for the end-of-list sentinel.
///
/// The rendering layer reports visibility on every layout pass; only the
/// false→true transition should load another page.
#[derive(Debug, Default, Clone)]
pub struct VisibilityTrigger {
    visible: bool,
}

impl VisibilityTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest visibility sample. Returns `true` on a rising edge.
    pub fn observe(&mut self, visible: bool) -> bool {
        let rising = visible && !self.visible;
        self.visible = visible;
        rising
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Forget the last sample, e.g. after the list was replaced.
    pub fn reset(&mut self) {
        self.visible = false;
    }
}
