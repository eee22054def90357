use crate::service::modbus::{
  Origin, PollOutcome, ReadResult, RegisterMap, RegisterValue,
};
use crate::*;

pub(crate) struct Process {
  config: config::Values,
  services: service::Container,
}

impl Process {
  pub(crate) fn new(
    config: config::Values,
    services: service::Container,
  ) -> Self {
    let unknown =
      unknown_registers(services.modbus().map(), &config.report.registers);
    if !unknown.is_empty() {
      tracing::warn!(
        "Reported registers {:?} are not in the register map",
        unknown
      );
    }

    Self { config, services }
  }
}

impl super::Process for Process {}

#[async_trait::async_trait]
impl super::Recurring for Process {
  #[tracing::instrument(skip(self))]
  async fn execute(&self) -> anyhow::Result<()> {
    let outcome = self.services.modbus().poll().await?;

    for line in report(&outcome, &self.config.report.registers) {
      tracing::info!("{}", line);
    }
    tracing::debug!("{}", outcome.serialize());

    if outcome.failures() > 0 {
      tracing::warn!(
        "Failed reading {} of {} registers in {}ms",
        outcome.failures(),
        outcome.len(),
        (outcome.finished() - outcome.started()).num_milliseconds()
      );
    }

    Ok(())
  }
}

fn unknown_registers<'a>(
  map: &RegisterMap,
  registers: &'a [String],
) -> Vec<&'a str> {
  registers
    .iter()
    .map(String::as_str)
    .filter(|register| !map.iter().any(|spec| spec.name == *register))
    .collect()
}

/// One `name - description: value` line per configured register and block,
/// in register map order.
fn report(outcome: &PollOutcome, registers: &[String]) -> Vec<String> {
  outcome
    .results()
    .iter()
    .filter(|result| {
      registers
        .iter()
        .any(|register| register.as_str() == result.spec.name)
    })
    .map(|result| format_line(outcome, result))
    .collect()
}

fn format_line(outcome: &PollOutcome, result: &ReadResult) -> String {
  let name = match result.spec.origin {
    Origin::Base => result.spec.name.to_owned(),
    origin => format!("{}/{}", origin, result.spec.name),
  };

  let value = match (outcome.scaled(result), result.value(), result.error()) {
    (Some(scaled), _, _) => scaled.normalize().to_string(),
    (None, Some(RegisterValue::String(value)), _) => {
      value.trim_end_matches('\0').to_owned()
    }
    (None, Some(value), _) => value.to_string(),
    (None, None, Some(error)) => format!("<{}>", error.describe()),
    (None, None, None) => "<missing>".to_owned(),
  };

  format!("{} - {}: {}", name, result.spec.description, value)
}

#[cfg(test)]
mod tests {
  use crate::service::modbus::codec::mock::MockCodec;
  use crate::service::modbus::poll::poll;
  use crate::service::modbus::*;

  use super::*;

  fn spec(
    address: u16,
    quantity: u16,
    name: &'static str,
    kind: RegisterKind,
    scale: Option<&'static str>,
  ) -> RegisterSpec {
    RegisterSpec {
      address,
      quantity,
      name,
      kind,
      description: name,
      scale,
      origin: Origin::Base,
    }
  }

  #[tokio::test]
  async fn reports_scaled_values_and_failures() {
    let map = RegisterMap::new([
      spec(40005, 2, "C_Manufacturer", string(4), None),
      spec(40084, 1, "I_AC_Power", RegisterKind::S16, Some("I_AC_Power_SF")),
      spec(40085, 1, "I_AC_Power_SF", RegisterKind::S16, None),
      spec(40087, 1, "I_AC_Frequency", RegisterKind::U16, None),
    ]);
    let mut codec = MockCodec::with_words(83, [12345, 0xFFFE]);
    codec.set_bytes(4, b"SE\0\0");
    codec.failing.insert(86);

    let outcome = poll(&map, &codec, PollOptions::default())
      .await
      .unwrap();
    let lines = report(
      &outcome,
      &[
        "C_Manufacturer".to_owned(),
        "I_AC_Power".to_owned(),
        "I_AC_Frequency".to_owned(),
      ],
    );

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "C_Manufacturer - C_Manufacturer: SE");
    assert_eq!(lines[1], "I_AC_Power - I_AC_Power: 123.45");
    assert!(lines[2].starts_with("I_AC_Frequency - I_AC_Frequency: <"));
  }

  #[tokio::test]
  async fn prefixes_meter_registers() {
    let mut meter = spec(40123, 1, "M_AC_Current", RegisterKind::S16, None);
    meter.origin = Origin::Meter {
      index: 0,
      offset: 40122,
    };
    let map = RegisterMap::new([meter]);
    let codec = MockCodec::with_words(122, [7]);

    let outcome = poll(&map, &codec, PollOptions::default()).await.unwrap();
    let lines = report(&outcome, &["M_AC_Current".to_owned()]);

    assert_eq!(lines, vec!["meter1/M_AC_Current - M_AC_Current: 7"]);
  }

  #[test]
  fn flags_registers_missing_from_the_map() {
    let map = RegisterMap::new([
      spec(40084, 1, "I_AC_Power", RegisterKind::S16, None),
      spec(40085, 1, "I_AC_Power_SF", RegisterKind::S16, None),
    ]);
    let registers = [
      "I_AC_Power".to_owned(),
      "I_AC_Powr".to_owned(),
      "M_AC_Current".to_owned(),
    ];

    assert_eq!(
      unknown_registers(&map, &registers),
      vec!["I_AC_Powr", "M_AC_Current"]
    );
  }

  #[test]
  fn default_report_is_in_the_default_map() {
    let map = RegisterMapBuilder::default().build(0, &[]).unwrap();
    let values = config::tests::values("127.0.0.1", 502);

    assert!(unknown_registers(&map, &values.report.registers).is_empty());
  }
}
