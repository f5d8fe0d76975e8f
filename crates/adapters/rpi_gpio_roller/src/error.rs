//! Roller adapter error types.

use rollerhub_app::ports::GpioError;
use rollerhub_domain::error::RollerHubError;

/// Errors raised while driving a cover.
#[derive(Debug, thiserror::Error)]
pub enum RollerError {
    /// A pin could not be configured or written. The relays are left as the
    /// last successful write put them.
    #[error("relay GPIO failure")]
    Gpio(#[from] GpioError),

    /// A domain-level error (validation, notification, …).
    #[error("domain error")]
    Domain(#[from] RollerHubError),
}

impl RollerError {
    /// Convert into a [`RollerHubError`] for propagation across port
    /// boundaries; GPIO failures become [`RollerHubError::Hardware`].
    #[must_use]
    pub fn into_domain(self) -> RollerHubError {
        match self {
            Self::Domain(err) => err,
            Self::Gpio(err) => err.into(),
        }
    }
}

impl From<RollerError> for RollerHubError {
    fn from(err: RollerError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollerhub_domain::error::ValidationError;

    #[test]
    fn should_display_gpio_error() {
        let err = RollerError::Gpio(GpioError::NotConfigured { pin: 17 });
        assert_eq!(err.to_string(), "relay GPIO failure");
    }

    #[test]
    fn should_convert_gpio_error_to_hardware_error() {
        let err: RollerHubError = RollerError::Gpio(GpioError::NotConfigured { pin: 17 }).into();
        assert!(matches!(err, RollerHubError::Hardware(_)));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let err: RollerHubError = RollerError::Domain(ValidationError::NoCovers.into()).into();
        assert!(matches!(
            err,
            RollerHubError::Validation(ValidationError::NoCovers)
        ));
    }
}
