#![deny(
  unsafe_code,
  // reason = "Let's just not do it"
)]
#![deny(
  clippy::unwrap_used,
  clippy::expect_used,
  clippy::panic,
  clippy::unreachable,
  // reason = "We have to handle errors properly"
)]

mod config;
mod process;
mod service;

use tracing_subscriber::{
  layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = config::Manager::new().await?;
  let values = config.values().await?;

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      EnvFilter::default().add_directive(values.log_level.into())
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!(
    "Polling {}:{} unit {} with {} meters",
    values.modbus.host,
    values.modbus.port,
    values.modbus.unit_id,
    values.modbus.meter_count
  );

  let services = service::Container::new(&values)?;
  let processes = process::Container::new(values.clone(), services.clone());

  let result = if values.once {
    processes.once().await
  } else {
    processes.spawn().await;
    let signal = tokio::signal::ctrl_c().await;
    processes.cancel().await;
    signal.map_err(anyhow::Error::from)
  };

  if let Err(error) = services.modbus().terminate().await {
    tracing::warn!("Failed terminating modbus worker {}", error);
  }

  result
}
