//! Software debounce for the start/stop button.
//!
//! The button interrupt fires on both edges and re-arms a one-shot timer of
//! [`Duration::DEBOUNCE`]; only the last edge within the window counts, which
//! also absorbs spurious double presses. When the timer finally fires, the
//! line has been stable for the whole window and the raw pin level can be
//! committed here.
//!
//! [`Duration::DEBOUNCE`]: ../time/struct.Duration.html#associatedconstant.DEBOUNCE

/// Tracks the debounced logical state of the (active-low) button.
pub struct Debouncer {
    pressed: bool,
}

impl Debouncer {
    /// Creates a debouncer initialised to the current pin level, so a button
    /// held during power-up does not register as a press.
    pub const fn new(initially_pressed: bool) -> Self {
        Debouncer {
            pressed: initially_pressed,
        }
    }

    /// Commits a settled sample of the raw pin.
    ///
    /// Returns `true` exactly on a released→pressed transition; release
    /// transitions are absorbed silently.
    pub fn settle(&mut self, raw_pressed: bool) -> bool {
        let press_edge = raw_pressed && !self.pressed;
        self.pressed = raw_pressed;
        press_edge
    }

    /// The current debounced state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
