//! # rollerhub-adapter-gpio-virtual
//!
//! In-memory [`GpioDriver`] used when no GPIO header is available and in
//! tests. Every operation is recorded in order so callers can assert on the
//! exact write sequence, not just the final levels.
//!
//! ## Dependency rule
//!
//! Depends on `rollerhub-app` (port traits) and `rollerhub-domain` only.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rollerhub_app::ports::{GpioDriver, GpioError};
use rollerhub_domain::gpio::{Level, PinNumber};

/// One recorded driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOp {
    Setup(PinNumber),
    Write(PinNumber, Level),
}

#[derive(Debug, Default)]
struct Bank {
    outputs: HashSet<PinNumber>,
    levels: HashMap<PinNumber, Level>,
    history: Vec<PinOp>,
    faulty: HashSet<PinNumber>,
}

/// Failure raised on a pin marked with [`VirtualGpio::fail_writes_on`].
///
/// Reaches callers as [`GpioError::Driver`], like any hardware fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("simulated fault on pin {pin}")]
pub struct InjectedFault {
    pub pin: PinNumber,
}

/// Simulated GPIO bank.
#[derive(Debug, Default)]
pub struct VirtualGpio {
    bank: Mutex<Bank>,
}

impl VirtualGpio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of `pin`, `None` if it was never written.
    #[must_use]
    pub fn level(&self, pin: PinNumber) -> Option<Level> {
        self.bank().levels.get(&pin).copied()
    }

    #[must_use]
    pub fn is_output(&self, pin: PinNumber) -> bool {
        self.bank().outputs.contains(&pin)
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<PinOp> {
        self.bank().history.clone()
    }

    /// Only the writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<(PinNumber, Level)> {
        self.bank()
            .history
            .iter()
            .filter_map(|op| match *op {
                PinOp::Write(pin, level) => Some((pin, level)),
                PinOp::Setup(_) => None,
            })
            .collect()
    }

    pub fn clear_history(&self) {
        self.bank().history.clear();
    }

    /// Make every later write to `pin` fail with an [`InjectedFault`].
    pub fn fail_writes_on(&self, pin: PinNumber) {
        self.bank().faulty.insert(pin);
    }

    pub fn repair(&self, pin: PinNumber) {
        self.bank().faulty.remove(&pin);
    }

    fn bank(&self) -> MutexGuard<'_, Bank> {
        self.bank.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GpioDriver for VirtualGpio {
    fn setup_output(&self, pin: PinNumber) -> Result<(), GpioError> {
        let mut bank = self.bank();
        bank.outputs.insert(pin);
        bank.history.push(PinOp::Setup(pin));
        tracing::trace!(pin, "virtual pin configured as output");
        Ok(())
    }

    fn write_output(&self, pin: PinNumber, level: Level) -> Result<(), GpioError> {
        let mut bank = self.bank();
        if !bank.outputs.contains(&pin) {
            return Err(GpioError::NotConfigured { pin });
        }
        if bank.faulty.contains(&pin) {
            return Err(GpioError::Driver(Box::new(InjectedFault { pin })));
        }
        bank.levels.insert(pin, level);
        bank.history.push(PinOp::Write(pin, level));
        tracing::trace!(pin, %level, "virtual pin written");
        Ok(())
    }
}
