//! Timed low-power suspend.
//!
//! - **`target_os = "espidf"`** — timer-wakeup light sleep; execution
//!   resumes after the wakeup fires.
//! - **`not(target_os = "espidf")`** — plain thread sleep.

use log::warn;

use crate::app::ports::SleepPort;

#[derive(Default)]
pub struct TimerSleep;

impl TimerSleep {
    pub fn new() -> Self {
        Self
    }
}

impl SleepPort for TimerSleep {
    #[cfg(target_os = "espidf")]
    fn sleep(&mut self, seconds: u32) {
        use esp_idf_svc::sys::{esp_light_sleep_start, esp_sleep_enable_timer_wakeup, ESP_OK};

        let us = u64::from(seconds) * 1_000_000;
        if unsafe { esp_sleep_enable_timer_wakeup(us) } != ESP_OK {
            warn!("timer wakeup rejected, staying awake");
            return;
        }
        unsafe { esp_light_sleep_start() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep(&mut self, seconds: u32) {
        if seconds > 5 {
            warn!("host sleep capped at 5s (requested {seconds}s)");
        }
        std::thread::sleep(std::time::Duration::from_secs(u64::from(seconds.min(5))));
    }
}
