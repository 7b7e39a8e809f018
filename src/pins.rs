//! Logical pin registry for the hub's attached switches and sensors.
//!
//! The cloud addresses pins by name (`"D2"`, `"A0"`); this registry maps
//! names to GPIO numbers and records each pin's role. Actuation goes through
//! [`PinPort`](crate::app::ports::PinPort); sensor sampling is outside this
//! crate's scope — whoever samples writes the reading into [`Pin::value`].

use serde::{Deserialize, Serialize};

/// What a registered pin is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinMode {
    /// Output driven from cloud switch state.
    Switch,
    /// Input whose readings are pushed to the cloud.
    Sensor,
}

/// One registered pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub gpio: u8,
    pub name: String,
    pub mode: PinMode,
    /// Latest reading (sensors) or last commanded level (switches), as the
    /// raw text sent to / received from the cloud.
    #[serde(default)]
    pub value: String,
}

impl Pin {
    pub fn switch(gpio: u8, name: &str) -> Self {
        Self {
            gpio,
            name: name.to_owned(),
            mode: PinMode::Switch,
            value: String::new(),
        }
    }

    pub fn sensor(gpio: u8, name: &str) -> Self {
        Self {
            gpio,
            name: name.to_owned(),
            mode: PinMode::Sensor,
            value: String::new(),
        }
    }
}

/// The hub's pin table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinBank {
    pins: Vec<Pin>,
}

impl PinBank {
    pub fn new(pins: Vec<Pin>) -> Self {
        Self { pins }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pin> {
        self.pins.iter_mut()
    }

    pub fn switches(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.mode == PinMode::Switch)
    }

    pub fn sensors(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.mode == PinMode::Sensor)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
