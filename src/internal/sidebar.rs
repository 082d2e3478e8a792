/// Sidebar visibility. Starts visible on every document load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sidebar {
    hidden: bool,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_toggle_clicked(&mut self) {
        self.hidden = !self.hidden;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn reset(&mut self) {
        self.hidden = false;
    }
}
