//! GPIO adapter for switch-mode pins.
//!
//! - **`target_os = "espidf"`** — drives pads through the ESP-IDF GPIO
//!   matrix, configuring each pad as an output on first use.
//! - **`not(target_os = "espidf")`** — records writes for inspection.

use crate::app::ports::{PinError, PinPort};

/// Output driver for the hub's registered switch pins.
#[derive(Default)]
pub struct HubPins {
    #[cfg(target_os = "espidf")]
    configured: heapless::Vec<u8, 16>,
    #[cfg(not(target_os = "espidf"))]
    writes: Vec<(u8, bool)>,
}

impl HubPins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes recorded by the host-side simulation, oldest first.
    #[cfg(not(target_os = "espidf"))]
    pub fn writes(&self) -> &[(u8, bool)] {
        &self.writes
    }
}

#[cfg(target_os = "espidf")]
impl PinPort for HubPins {
    fn set_level(&mut self, gpio: u8, high: bool) -> Result<(), PinError> {
        use esp_idf_svc::sys::{
            gpio_mode_t_GPIO_MODE_OUTPUT, gpio_set_direction, gpio_set_level, ESP_OK,
        };

        let pad = gpio as i32;
        if !self.configured.contains(&gpio) {
            if unsafe { gpio_set_direction(pad, gpio_mode_t_GPIO_MODE_OUTPUT) } != ESP_OK {
                return Err(PinError::UnknownPin);
            }
            // Table full just means we reconfigure on every write.
            let _ = self.configured.push(gpio);
        }
        if unsafe { gpio_set_level(pad, u32::from(high)) } != ESP_OK {
            return Err(PinError::WriteFailed);
        }
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl PinPort for HubPins {
    fn set_level(&mut self, gpio: u8, high: bool) -> Result<(), PinError> {
        self.writes.push((gpio, high));
        Ok(())
    }
}
