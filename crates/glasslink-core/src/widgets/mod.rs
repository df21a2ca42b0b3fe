//! The addressable widget store.
//!
//! Buttons and sliders live in growable lists indexed by caller-chosen
//! handles. A handle stays valid for the widget's lifetime; slots are
//! reused only after RESET_ALL destroys the whole store.

pub mod button;
mod commands;
pub mod slider;

pub use button::{AutorepeatTiming, Button, ButtonFlags};
pub use slider::{Slider, SliderFlags};

use crate::error::DispatchError;

/// Buttons and sliders of one session.
#[derive(Debug, Default)]
pub struct WidgetStore {
    pub(crate) buttons: Vec<Button>,
    pub(crate) sliders: Vec<Slider>,
}

impl WidgetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Addressed button lookup for commands other than INIT.
    pub(crate) fn button_mut(&mut self, index: usize) -> Result<&mut Button, DispatchError> {
        let len = self.buttons.len();
        self.buttons.get_mut(index).ok_or(DispatchError::NoSuchWidget { index, len })
    }

    /// Addressed slider lookup for commands other than INIT.
    pub(crate) fn slider_mut(&mut self, index: usize) -> Result<&mut Slider, DispatchError> {
        let len = self.sliders.len();
        self.sliders.get_mut(index).ok_or(DispatchError::NoSuchWidget { index, len })
    }

    /// Flip the active flag over all buttons.
    pub(crate) fn set_all_buttons_active(&mut self, active: bool) {
        for button in &mut self.buttons {
            button.active = active;
        }
    }

    /// Flip the active flag over all sliders.
    pub(crate) fn set_all_sliders_active(&mut self, active: bool) {
        for slider in &mut self.sliders {
            slider.active = active;
        }
    }

    /// Destroy everything; handles become reusable.
    pub(crate) fn clear(&mut self) {
        self.buttons.clear();
        self.sliders.clear();
    }
}
