//! Device: the physical thing behind an entity.
//!
//! For covers this is the roller motor wired to an up/down relay pair.

use serde::{Deserialize, Serialize};

use crate::error::{RollerHubError, ValidationError};
use crate::id::DeviceId;

/// A physical device registered by an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Name of the integration that registered the device.
    pub integration: String,
    /// Identifier stable across restarts, unique within `integration`.
    pub unique_id: String,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RollerHubError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), RollerHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    integration: Option<String>,
    unique_id: Option<String>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = Some(integration.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`RollerHubError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, RollerHubError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
            integration: self.integration.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_default(),
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_device_with_metadata() {
        let device = Device::builder()
            .name("Blind1")
            .manufacturer("rollerhub")
            .model("relay pair")
            .integration("rpi_gpio_roller")
            .unique_id("RollerCover.Blind1")
            .build()
            .unwrap();
        assert_eq!(device.name, "Blind1");
        assert_eq!(device.model.as_deref(), Some("relay pair"));
        assert_eq!(device.unique_id, "RollerCover.Blind1");
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Device::builder().integration("rpi_gpio_roller").build();
        assert!(matches!(
            result,
            Err(RollerHubError::Validation(ValidationError::EmptyName))
        ));
    }
}
