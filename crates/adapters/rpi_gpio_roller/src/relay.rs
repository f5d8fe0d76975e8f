//! Up/down relay pair of one cover.

use std::sync::Arc;

use rollerhub_app::ports::{GpioDriver, GpioError};
use rollerhub_domain::cover::Direction;
use rollerhub_domain::gpio::{PinNumber, RelayLogic};

/// Two relays driving opposite windings of the same motor.
///
/// Callers serialise access (see [`RollerCover`](crate::cover::RollerCover));
/// the pair itself only orders writes so the opposite relay is rested
/// whenever one is asserted.
pub(crate) struct RelayPair<G> {
    gpio: Arc<G>,
    up: PinNumber,
    down: PinNumber,
    logic: RelayLogic,
}

impl<G: GpioDriver> RelayPair<G> {
    /// Claim both pins as outputs and drive them to the resting level.
    pub(crate) fn new(
        gpio: Arc<G>,
        up: PinNumber,
        down: PinNumber,
        logic: RelayLogic,
    ) -> Result<Self, GpioError> {
        for pin in [up, down] {
            gpio.setup_output(pin)?;
            gpio.write_output(pin, logic.resting())?;
        }
        Ok(Self {
            gpio,
            up,
            down,
            logic,
        })
    }

    /// `(motor, opposite)` pins for a travel direction.
    fn pins(&self, direction: Direction) -> (PinNumber, PinNumber) {
        match direction {
            Direction::Up => (self.up, self.down),
            Direction::Down => (self.down, self.up),
        }
    }

    /// Assert the relay for `direction`, then make sure the opposite one rests.
    pub(crate) fn engage(&self, direction: Direction) -> Result<(), GpioError> {
        let (motor, opposite) = self.pins(direction);
        self.gpio.write_output(motor, self.logic.asserted())?;
        self.gpio.write_output(opposite, self.logic.resting())
    }

    /// Rest the relay for `direction`.
    pub(crate) fn release(&self, direction: Direction) -> Result<(), GpioError> {
        let (motor, _) = self.pins(direction);
        self.gpio.write_output(motor, self.logic.resting())
    }

    pub(crate) fn rest_both(&self) -> Result<(), GpioError> {
        self.gpio.write_output(self.up, self.logic.resting())?;
        self.gpio.write_output(self.down, self.logic.resting())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollerhub_adapter_gpio_virtual::{PinOp, VirtualGpio};
    use rollerhub_domain::gpio::Level;

    #[test]
    fn should_configure_and_rest_each_pin_in_turn() {
        let gpio = Arc::new(VirtualGpio::new());
        RelayPair::new(Arc::clone(&gpio), 17, 18, RelayLogic::Normal).unwrap();
        assert_eq!(
            gpio.history(),
            vec![
                PinOp::Setup(17),
                PinOp::Write(17, Level::Low),
                PinOp::Setup(18),
                PinOp::Write(18, Level::Low),
            ]
        );
    }

    #[test]
    fn should_engage_down_relay_before_resting_up_relay() {
        let gpio = Arc::new(VirtualGpio::new());
        let pair = RelayPair::new(Arc::clone(&gpio), 17, 18, RelayLogic::Normal).unwrap();
        gpio.clear_history();

        pair.engage(Direction::Down).unwrap();
        assert_eq!(gpio.writes(), vec![(18, Level::High), (17, Level::Low)]);
    }

    #[test]
    fn should_release_only_the_motor_relay() {
        let gpio = Arc::new(VirtualGpio::new());
        let pair = RelayPair::new(Arc::clone(&gpio), 17, 18, RelayLogic::Inverted).unwrap();
        pair.engage(Direction::Up).unwrap();
        gpio.clear_history();

        pair.release(Direction::Up).unwrap();
        assert_eq!(gpio.writes(), vec![(17, Level::High)]);
    }

    #[test]
    fn should_stop_at_first_failed_write() {
        let gpio = Arc::new(VirtualGpio::new());
        let pair = RelayPair::new(Arc::clone(&gpio), 17, 18, RelayLogic::Normal).unwrap();
        gpio.fail_writes_on(17);
        gpio.clear_history();

        assert!(pair.rest_both().is_err());
        assert!(gpio.writes().is_empty());
    }
}
