mod args;
mod env;
mod file;

use std::{num::NonZeroUsize, sync::Arc};

use thiserror::Error;
use tokio::sync::Mutex;
use tokio_modbus::Address;

use crate::service::modbus;

#[derive(Debug, Clone)]
pub(crate) struct Modbus {
  pub(crate) host: String,
  pub(crate) port: u16,
  pub(crate) unit_id: modbus::UnitId,
  pub(crate) request_timeout: chrono::Duration,
  pub(crate) retries: usize,
  pub(crate) backoff: chrono::Duration,
  pub(crate) max_concurrency: Option<NonZeroUsize>,
  pub(crate) fail_fast: bool,
  pub(crate) meter_count: usize,
  pub(crate) meter_offsets: Vec<Address>,
  pub(crate) termination_timeout: chrono::Duration,
}

#[derive(Debug, Clone)]
pub(crate) struct Report {
  pub(crate) registers: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Values {
  pub(crate) modbus: Modbus,
  pub(crate) report: Report,
  pub(crate) log_level: tracing::level_filters::LevelFilter,
  pub(crate) poll_interval: chrono::Duration,
  pub(crate) once: bool,
}

const DEFAULT_PORT: u16 = 502;

const DEFAULT_REPORT: &[&str] = &[
  "C_Manufacturer",
  "C_Model",
  "C_Version",
  "C_SerialNumber",
  "I_AC_Current",
  "I_AC_VoltageAB",
  "I_AC_Power",
  "I_AC_Energy_WH",
  "I_DC_Current",
  "I_DC_Voltage",
  "I_DC_Power",
  "I_Temp_Sink",
];

#[derive(Debug, Clone)]
struct Unparsed {
  from_args: args::Values,
  from_env: env::Values,
  from_file: file::Values,
}

#[derive(Debug, Clone)]
pub(crate) struct Manager {
  lock: Arc<Mutex<Unparsed>>,
}

#[derive(Debug, Error)]
pub(crate) enum ReadError {
  #[error("Failed reading file")]
  FileReadError(#[from] file::ParseError),

  #[error("Failed reading env")]
  EnvReadError(#[from] env::ParseError),

  #[error("Invalid configuration")]
  Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
  #[error("Unit id {0} is outside of 1..=247")]
  UnitId(u8),

  #[error("Max concurrency must be at least 1")]
  MaxConcurrency,

  #[error("Invalid port {0}")]
  Port(String),
}

impl Manager {
  pub(crate) async fn new() -> Result<Self, ReadError> {
    let config = Self::read_async().await?;
    Self::parse(config.clone())?;

    let config_manager = Self {
      lock: Arc::new(Mutex::new(config)),
    };

    Ok(config_manager)
  }

  pub(crate) async fn values(&self) -> Result<Values, ValidationError> {
    let config = self.lock.lock().await.clone();

    Self::parse(config)
  }

  fn parse(config: Unparsed) -> Result<Values, ValidationError> {
    let unit_id = config
      .from_file
      .modbus
      .unit_id
      .unwrap_or(modbus::DEFAULT_UNIT);
    if !(1..=247).contains(&unit_id) {
      return Err(ValidationError::UnitId(unit_id));
    }

    let max_concurrency = match config.from_file.modbus.max_concurrency {
      Some(max_concurrency) => Some(
        NonZeroUsize::new(max_concurrency)
          .ok_or(ValidationError::MaxConcurrency)?,
      ),
      None => None,
    };

    let port = match config.from_env.modbus.port {
      Some(port) => port
        .parse::<u16>()
        .map_err(|_| ValidationError::Port(port.clone()))?,
      None => DEFAULT_PORT,
    };

    Ok(Values {
      log_level: config.from_file.log_level.map_or_else(
        || {
          if config.from_args.trace {
            tracing::level_filters::LevelFilter::TRACE
          } else {
            #[cfg(debug_assertions)]
            {
              tracing::level_filters::LevelFilter::DEBUG
            }
            #[cfg(not(debug_assertions))]
            {
              tracing::level_filters::LevelFilter::INFO
            }
          }
        },
        |log_level| match log_level {
          file::LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
          file::LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
          file::LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
          file::LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
          file::LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
        },
      ),
      poll_interval: file::milliseconds_to_chrono(
        config.from_file.poll_interval.unwrap_or(60_000),
      ),
      once: config.from_args.once,
      modbus: Modbus {
        host: config.from_env.modbus.host,
        port,
        unit_id,
        request_timeout: file::milliseconds_to_chrono(
          config.from_file.modbus.request_timeout.unwrap_or(3_000),
        ),
        retries: config.from_file.modbus.retries.unwrap_or(1) as usize,
        backoff: file::milliseconds_to_chrono(
          config.from_file.modbus.backoff.unwrap_or(0),
        ),
        max_concurrency,
        fail_fast: config.from_file.modbus.fail_fast.unwrap_or(false),
        meter_count: config.from_file.modbus.meter_count.unwrap_or(0),
        meter_offsets: config
          .from_file
          .modbus
          .meter_offsets
          .unwrap_or_else(|| modbus::template::METER_OFFSETS.to_vec()),
        termination_timeout: file::milliseconds_to_chrono(
          config
            .from_file
            .modbus
            .termination_timeout
            .unwrap_or(10_000),
        ),
      },
      report: Report {
        registers: config.from_file.report.registers.unwrap_or_else(|| {
          DEFAULT_REPORT
            .iter()
            .map(|name| (*name).to_owned())
            .collect()
        }),
      },
    })
  }

  async fn read_async() -> Result<Unparsed, ReadError> {
    let from_args = args::parse();
    let from_env = env::parse()?;
    let from_file = file::parse_async(from_args.config.as_deref()).await?;

    Ok(Unparsed {
      from_args,
      from_env,
      from_file,
    })
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// Defaults as if only the host was configured.
  pub(crate) fn values(host: &str, port: u16) -> Values {
    let mut values =
      Manager::parse(unparsed(file::Values::default())).unwrap();
    values.modbus.host = host.to_owned();
    values.modbus.port = port;
    values
  }

  fn unparsed(from_file: file::Values) -> Unparsed {
    Unparsed {
      from_args: args::Values {
        config: None,
        trace: false,
        once: false,
      },
      from_env: env::Values {
        modbus: env::Modbus {
          host: "192.168.1.10".to_owned(),
          port: None,
        },
      },
      from_file,
    }
  }

  #[test]
  fn defaults() {
    let values = Manager::parse(unparsed(file::Values::default())).unwrap();

    assert_eq!(values.modbus.port, 502);
    assert_eq!(values.modbus.unit_id, 1);
    assert_eq!(values.modbus.retries, 1);
    assert_eq!(values.modbus.meter_count, 0);
    assert_eq!(values.modbus.meter_offsets, vec![40122, 40296, 40470]);
    assert_eq!(values.modbus.request_timeout, chrono::Duration::seconds(3));
    assert_eq!(values.modbus.max_concurrency, None);
    assert!(!values.modbus.fail_fast);
    assert_eq!(values.poll_interval, chrono::Duration::seconds(60));
    assert_eq!(values.report.registers.len(), DEFAULT_REPORT.len());
  }

  #[test]
  fn file_overrides_defaults() {
    let from_file = file::parse_str(
      Some("yaml"),
      r#"
log_level: warn
modbus:
  unit_id: 2
  request_timeout: 2000
  max_concurrency: 8
"#,
    )
    .unwrap();

    let values = Manager::parse(unparsed(from_file)).unwrap();

    assert_eq!(values.log_level, tracing::level_filters::LevelFilter::WARN);
    assert_eq!(values.modbus.unit_id, 2);
    assert_eq!(values.modbus.request_timeout, chrono::Duration::seconds(2));
    assert_eq!(values.modbus.max_concurrency, NonZeroUsize::new(8));
  }

  #[test]
  fn rejects_invalid_values() {
    for (raw, expected) in [
      ("modbus: { unit_id: 0 }", ValidationError::UnitId(0)),
      ("modbus: { unit_id: 248 }", ValidationError::UnitId(248)),
      (
        "modbus: { max_concurrency: 0 }",
        ValidationError::MaxConcurrency,
      ),
    ] {
      let from_file = file::parse_str(Some("yaml"), raw).unwrap();

      assert_eq!(
        Manager::parse(unparsed(from_file)).unwrap_err(),
        expected
      );
    }
  }

  #[test]
  fn rejects_invalid_port() {
    let mut config = unparsed(file::Values::default());
    config.from_env.modbus.port = Some("modbus".to_owned());

    assert_eq!(
      Manager::parse(config).unwrap_err(),
      ValidationError::Port("modbus".to_owned())
    );
  }
}
