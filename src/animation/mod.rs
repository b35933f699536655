pub mod spinner;

/// Tick-driven animation state for the whole application
#[derive(Debug, Default)]
pub struct AnimationState {
    /// Monotonically increasing tick counter
    pub tick_count: u64,
    spinner: bool,
}

impl AnimationState {
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    /// Start the scanning spinner
    pub fn start_spinner(&mut self) {
        self.spinner = true;
    }

    pub fn stop_spinner(&mut self) {
        self.spinner = false;
    }

    /// Current spinner glyph, or a blank while idle
    pub fn spinner(&self) -> char {
        if self.spinner {
            spinner::spinner_frame(self.tick_count)
        } else {
            ' '
        }
    }
}
