#[derive(Debug, Clone)]
pub(crate) struct Modbus {
  pub(crate) host: String,
  pub(crate) port: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Values {
  pub(crate) modbus: Modbus,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ParseError {
  #[error("Failed reading env var")]
  EnvVarRead(#[from] std::env::VarError),
}

pub(crate) fn parse() -> Result<Values, ParseError> {
  let _ = dotenv::dotenv();

  let values = Values {
    modbus: Modbus {
      host: std::env::var("SOLAREDGE_MODBUS_HOST")?,
      port: std::env::var("SOLAREDGE_MODBUS_PORT").ok(),
    },
  };

  Ok(values)
}
