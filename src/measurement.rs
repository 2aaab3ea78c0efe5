//! Measurement readings and the state-topic wire format.

use core::fmt::Write;

use heapless::String;

/// Payload buffer size; generous for three two-decimal floats.
pub const STATE_PAYLOAD_LEN: usize = 160;

/// One compensated BME280 reading. Pressure is kept in pascals, as the
/// sensor driver reports it; conversion to hPa happens at render time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Pascals.
    pub pressure: f32,
    /// Percent relative humidity.
    pub humidity: f32,
}

impl Reading {
    /// Render `{"temperature":T,"pressure":P,"humidity":H}` with two decimals
    /// each, pressure converted Pa -> hPa. Errors only on buffer overflow.
    pub fn state_payload(&self) -> Result<String<STATE_PAYLOAD_LEN>, core::fmt::Error> {
        let mut payload: String<STATE_PAYLOAD_LEN> = String::new();
        write!(
            payload,
            "{{\"temperature\":{:.2},\"pressure\":{:.2},\"humidity\":{:.2}}}",
            self.temperature,
            self.pressure / 100.0,
            self.humidity
        )?;
        Ok(payload)
    }
}
