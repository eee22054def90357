use std::sync::Arc;

use crate::*;

use super::connection::{Destination, Params};
use super::map::*;
use super::poll::*;
use super::worker::*;

/// Polls one SolarEdge inverter over Modbus TCP.
#[derive(Clone, Debug)]
pub(crate) struct Service {
  worker: Worker,
  map: Arc<RegisterMap>,
  options: PollOptions,
}

impl service::Service for Service {
  type Error = ConfigurationError;

  fn new(config: &config::Values) -> Result<Self, Self::Error> {
    let map = RegisterMapBuilder::default().build(
      config.modbus.meter_count,
      &config.modbus.meter_offsets,
    )?;

    let worker = Worker::new(
      Destination {
        host: config.modbus.host.clone(),
        port: config.modbus.port,
      },
      Params::new(
        config.modbus.request_timeout,
        config.modbus.backoff,
        config.modbus.retries,
      ),
      config.modbus.termination_timeout,
    );

    Ok(Self {
      worker,
      map: Arc::new(map),
      options: PollOptions {
        max_concurrency: config.modbus.max_concurrency,
        fail_fast: config.modbus.fail_fast,
        unit: config.modbus.unit_id,
      },
    })
  }
}

impl Service {
  pub(crate) fn map(&self) -> &RegisterMap {
    &self.map
  }

  #[tracing::instrument(skip(self))]
  pub(crate) async fn poll(&self) -> Result<PollOutcome, PollError> {
    poll(&self.map, &self.worker, self.options).await
  }

  pub(crate) async fn terminate(&self) -> Result<(), TerminateError> {
    self.worker.terminate().await
  }
}
