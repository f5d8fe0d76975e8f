//! # rollerhub-adapter-gpio-rppal
//!
//! [`GpioDriver`] for the Raspberry Pi header, backed by `rppal`.
//!
//! Pins are claimed on [`setup_output`](GpioDriver::setup_output) and held
//! until the driver is dropped; `rppal` resets them to their original mode
//! at that point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rppal::gpio::{Gpio, OutputPin};

use rollerhub_app::ports::{GpioDriver, GpioError};
use rollerhub_domain::gpio::{Level, PinNumber};

pub struct RppalGpio {
    gpio: Gpio,
    outputs: Mutex<HashMap<PinNumber, OutputPin>>,
}

impl RppalGpio {
    /// Open the GPIO peripheral.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::Driver`] when `/dev/gpiomem` is unavailable or
    /// the board is not recognised.
    pub fn new() -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(driver)?;
        tracing::info!("rppal GPIO opened");
        Ok(Self {
            gpio,
            outputs: Mutex::new(HashMap::new()),
        })
    }

    fn outputs(&self) -> MutexGuard<'_, HashMap<PinNumber, OutputPin>> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GpioDriver for RppalGpio {
    fn setup_output(&self, pin: PinNumber) -> Result<(), GpioError> {
        let mut outputs = self.outputs();
        if outputs.contains_key(&pin) {
            return Ok(());
        }
        let output = self.gpio.get(pin).map_err(driver)?.into_output();
        outputs.insert(pin, output);
        tracing::debug!(pin, "pin claimed as output");
        Ok(())
    }

    fn write_output(&self, pin: PinNumber, level: Level) -> Result<(), GpioError> {
        let mut outputs = self.outputs();
        let output = outputs
            .get_mut(&pin)
            .ok_or(GpioError::NotConfigured { pin })?;
        if level.is_high() {
            output.set_high();
        } else {
            output.set_low();
        }
        tracing::trace!(pin, %level, "pin written");
        Ok(())
    }
}

fn driver(err: rppal::gpio::Error) -> GpioError {
    GpioError::Driver(Box::new(err))
}
