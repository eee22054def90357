pub(crate) mod modbus;

use crate::*;

pub(crate) trait Service: Sized {
  type Error;

  fn new(config: &config::Values) -> Result<Self, Self::Error>;
}

#[derive(Debug, Clone)]
pub(crate) struct Container {
  modbus: modbus::Service,
}

impl Container {
  pub(crate) fn new(
    config: &config::Values,
  ) -> Result<Self, modbus::ConfigurationError> {
    Ok(Self {
      modbus: modbus::Service::new(config)?,
    })
  }

  pub(crate) fn modbus(&self) -> &modbus::Service {
    &self.modbus
  }
}
