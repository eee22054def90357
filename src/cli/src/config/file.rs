use serde::{Deserialize, Serialize};

// NITPICK: optional values here with #[serde(default = ...)]

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Modbus {
  pub(crate) unit_id: Option<u8>,
  pub(crate) request_timeout: Option<u32>,
  pub(crate) retries: Option<u32>,
  pub(crate) backoff: Option<u32>,
  pub(crate) max_concurrency: Option<usize>,
  pub(crate) fail_fast: Option<bool>,
  pub(crate) meter_count: Option<usize>,
  pub(crate) meter_offsets: Option<Vec<u16>>,
  pub(crate) termination_timeout: Option<u32>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Report {
  pub(crate) registers: Option<Vec<String>>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Values {
  pub(crate) log_level: Option<LogLevel>,
  pub(crate) poll_interval: Option<u32>,
  #[serde(default)]
  pub(crate) modbus: Modbus,
  #[serde(default)]
  pub(crate) report: Report,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ParseError {
  #[error("Failed creating project directories")]
  MissingProjectDirs,

  #[error("Failed reading config file")]
  Read(#[from] std::io::Error),

  #[error("Config file is missing an extension")]
  MissingExtension,

  #[error("Config file has invalid extension")]
  InvalidExtension,

  #[error("Failed deserializing config from yaml")]
  DeserializetionYaml(#[from] serde_yaml::Error),

  #[error("Failed deserializing config from toml")]
  DeserializetionToml(#[from] toml::de::Error),

  #[error("Failed deserializing config from json")]
  DeserializetionJson(#[from] serde_json::Error),
}

/// Reads `location` or the default project config.
///
/// A missing default config is not an error and yields defaults.
pub(crate) async fn parse_async(
  location: Option<&str>,
) -> Result<Values, ParseError> {
  let (location, explicit) = match location {
    Some(location) => (std::path::PathBuf::from(location), true),
    None => {
      match directories::ProjectDirs::from("com", "solaredge", "solaredge") {
        Some(project_dirs) => {
          (project_dirs.config_dir().join("config.yaml"), false)
        }
        None => return Err(ParseError::MissingProjectDirs),
      }
    }
  };

  let raw = match tokio::fs::read_to_string(&location).await {
    Ok(raw) => raw,
    Err(error)
      if !explicit && error.kind() == std::io::ErrorKind::NotFound =>
    {
      tracing::debug!("No config at {:?}, using defaults", location);
      return Ok(Values::default());
    }
    Err(error) => return Err(error.into()),
  };

  parse_str(location.extension().and_then(|str| str.to_str()), &raw)
}

pub(crate) fn parse_str(
  extension: Option<&str>,
  raw: &str,
) -> Result<Values, ParseError> {
  let values = match extension {
    None => return Err(ParseError::MissingExtension),
    Some("yaml" | "yml") => serde_yaml::from_str::<Values>(raw)?,
    Some("toml") => toml::from_str::<Values>(raw)?,
    Some("json") => serde_json::from_str::<Values>(raw)?,
    Some(_) => return Err(ParseError::InvalidExtension),
  };

  Ok(values)
}

pub(crate) fn milliseconds_to_chrono(milliseconds: u32) -> chrono::Duration {
  chrono::Duration::milliseconds(milliseconds as i64)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_yaml() {
    let values = parse_str(
      Some("yaml"),
      r#"
log_level: trace
poll_interval: 5000
modbus:
  unit_id: 3
  fail_fast: true
  meter_count: 2
  meter_offsets: [40122, 40296]
report:
  registers: [I_AC_Power]
"#,
    )
    .unwrap();

    assert_eq!(values.log_level, Some(LogLevel::Trace));
    assert_eq!(values.poll_interval, Some(5000));
    assert_eq!(values.modbus.unit_id, Some(3));
    assert_eq!(values.modbus.fail_fast, Some(true));
    assert_eq!(values.modbus.meter_count, Some(2));
    assert_eq!(values.modbus.meter_offsets, Some(vec![40122, 40296]));
    assert_eq!(
      values.report.registers,
      Some(vec!["I_AC_Power".to_owned()])
    );
  }

  #[test]
  fn parses_toml_and_json() {
    let toml = parse_str(
      Some("toml"),
      r#"
poll_interval = 1000

[modbus]
max_concurrency = 4
"#,
    )
    .unwrap();
    let json = parse_str(
      Some("json"),
      r#"{ "modbus": { "max_concurrency": 4 } }"#,
    )
    .unwrap();

    assert_eq!(toml.poll_interval, Some(1000));
    assert_eq!(toml.modbus.max_concurrency, Some(4));
    assert_eq!(json.modbus.max_concurrency, Some(4));
    assert_eq!(json.poll_interval, None);
  }

  #[test]
  fn empty_sections_default() {
    let values = parse_str(Some("json"), "{}").unwrap();

    assert!(values.log_level.is_none());
    assert!(values.modbus.unit_id.is_none());
    assert!(values.report.registers.is_none());
  }

  #[test]
  fn rejects_unknown_extension() {
    assert!(matches!(
      parse_str(Some("ini"), ""),
      Err(ParseError::InvalidExtension)
    ));
    assert!(matches!(
      parse_str(None, ""),
      Err(ParseError::MissingExtension)
    ));
  }

  #[tokio::test]
  async fn missing_explicit_file_is_an_error() {
    let result = parse_async(Some("/nonexistent/solaredge/config.yaml")).await;

    assert!(matches!(result, Err(ParseError::Read(_))));
  }
}
