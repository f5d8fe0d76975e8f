//! GPIO port: the two pin operations a relay controller needs.
//!
//! Writes are synchronous: toggling a pin is a register write, never worth a
//! task switch. Relay timing lives with the caller.

use rollerhub_domain::error::RollerHubError;
use rollerhub_domain::gpio::{Level, PinNumber};

/// Errors raised by a [`GpioDriver`].
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The pin was written before being configured as an output.
    #[error("pin {pin} is not configured as an output")]
    NotConfigured { pin: PinNumber },

    /// The underlying driver failed.
    #[error("GPIO driver error")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<GpioError> for RollerHubError {
    fn from(err: GpioError) -> Self {
        Self::Hardware(Box::new(err))
    }
}

/// Output side of a GPIO controller.
pub trait GpioDriver: Send + Sync {
    /// Claim `pin` and switch it to output mode.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError`] if the pin cannot be claimed.
    fn setup_output(&self, pin: PinNumber) -> Result<(), GpioError>;

    /// Drive a previously configured output pin to `level`.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::NotConfigured`] for unclaimed pins, or a driver error.
    fn write_output(&self, pin: PinNumber, level: Level) -> Result<(), GpioError>;
}

impl<T: GpioDriver> GpioDriver for std::sync::Arc<T> {
    fn setup_output(&self, pin: PinNumber) -> Result<(), GpioError> {
        (**self).setup_output(pin)
    }

    fn write_output(&self, pin: PinNumber, level: Level) -> Result<(), GpioError> {
        (**self).write_output(pin, level)
    }
}
