//! UART adapter for the BC26 modem link.
//!
//! Wraps an ESP-IDF [`UartDriver`] behind [`SerialPort`]. Reads are
//! non-blocking: the channel's deadline loop owns all waiting.

use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::app::ports::SerialPort;

pub struct Bc26Uart {
    driver: UartDriver<'static>,
}

impl Bc26Uart {
    pub fn new(driver: UartDriver<'static>) -> Self {
        Self { driver }
    }
}

impl SerialPort for Bc26Uart {
    type Error = EspError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = self.driver.write(rest)?;
            rest = &rest[n..];
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut byte = [0u8; 1];
        // Zero tick delay: return immediately if the FIFO is empty.
        match self.driver.read(&mut byte, 0) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) => Err(e),
        }
    }

    fn available(&self) -> bool {
        self.driver.remaining_read().map(|n| n > 0).unwrap_or(false)
    }
}
