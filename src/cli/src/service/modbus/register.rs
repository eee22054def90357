use std::fmt::Debug;
use std::fmt::Display;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio_modbus::{Address, Quantity};

use super::span::*;

pub(crate) trait RegisterStorage {
  fn quantity(&self) -> Quantity;
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub(crate) struct StringRegisterKind {
  /// Length in bytes.
  pub(crate) length: u16,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub(crate) enum RegisterKind {
  U16,
  S16,
  U32,
  S32,
  Acc32,
  String(StringRegisterKind),
}

impl RegisterKind {
  /// Canonical width of the encoded value in bytes.
  pub(crate) fn width(&self) -> usize {
    match self {
      RegisterKind::U16 | RegisterKind::S16 => 2,
      RegisterKind::U32 | RegisterKind::S32 | RegisterKind::Acc32 => 4,
      RegisterKind::String(StringRegisterKind { length }) => *length as usize,
    }
  }
}

impl RegisterStorage for RegisterKind {
  fn quantity(&self) -> Quantity {
    match self {
      RegisterKind::U16 => 1,
      RegisterKind::S16 => 1,
      RegisterKind::U32 => 2,
      RegisterKind::S32 => 2,
      RegisterKind::Acc32 => 2,
      RegisterKind::String(StringRegisterKind { length }) => length / 2,
    }
  }
}

impl Display for RegisterKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RegisterKind::U16 => f.write_str("uint16"),
      RegisterKind::S16 => f.write_str("int16"),
      RegisterKind::U32 => f.write_str("uint32"),
      RegisterKind::S32 => f.write_str("int32"),
      RegisterKind::Acc32 => f.write_str("acc32"),
      RegisterKind::String(StringRegisterKind { length }) => {
        write!(f, "String({length})")
      }
    }
  }
}

impl Serialize for RegisterKind {
  fn serialize<S: serde::Serializer>(
    &self,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Where a register instance came from once the map is assembled.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "lowercase")]
pub(crate) enum Origin {
  Base,
  Meter { index: usize, offset: Address },
}

impl Display for Origin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Origin::Base => f.write_str("base"),
      Origin::Meter { index, .. } => write!(f, "meter{}", index + 1),
    }
  }
}

/// Static description of a register. Meter template addresses are relative
/// to the meter offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegisterTemplate {
  pub(crate) address: Address,
  pub(crate) quantity: Quantity,
  pub(crate) name: &'static str,
  pub(crate) kind: RegisterKind,
  pub(crate) description: &'static str,
  pub(crate) scale: Option<&'static str>,
}

impl RegisterTemplate {
  pub(crate) const fn new(
    address: Address,
    quantity: Quantity,
    name: &'static str,
    kind: RegisterKind,
    description: &'static str,
  ) -> Self {
    Self {
      address,
      quantity,
      name,
      kind,
      description,
      scale: None,
    }
  }

  pub(crate) const fn scaled(mut self, scale: &'static str) -> Self {
    self.scale = Some(scale);
    self
  }
}

pub(crate) const fn string(length: u16) -> RegisterKind {
  RegisterKind::String(StringRegisterKind { length })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RegisterSpec {
  pub(crate) address: Address,
  pub(crate) quantity: Quantity,
  pub(crate) name: &'static str,
  pub(crate) kind: RegisterKind,
  pub(crate) description: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) scale: Option<&'static str>,
  pub(crate) origin: Origin,
}

impl RegisterSpec {
  pub(crate) fn instantiate(
    template: &RegisterTemplate,
    address: Address,
    origin: Origin,
  ) -> Self {
    Self {
      address,
      quantity: template.quantity,
      name: template.name,
      kind: template.kind,
      description: template.description,
      scale: template.scale,
      origin,
    }
  }
}

impl Span for RegisterSpec {
  fn address(&self) -> Address {
    self.address
  }

  fn quantity(&self) -> Quantity {
    self.quantity
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegisterValue {
  U16(u16),
  S16(i16),
  U32(u32),
  S32(i32),
  Acc32(u32),
  String(String),
}

impl RegisterValue {
  pub(crate) fn to_decimal(&self) -> Option<Decimal> {
    match self {
      RegisterValue::U16(value) => Some(Decimal::from(*value)),
      RegisterValue::S16(value) => Some(Decimal::from(*value)),
      RegisterValue::U32(value) => Some(Decimal::from(*value)),
      RegisterValue::S32(value) => Some(Decimal::from(*value)),
      RegisterValue::Acc32(value) => Some(Decimal::from(*value)),
      RegisterValue::String(_) => None,
    }
  }

  /// Reads the value as a SunSpec scale factor exponent.
  pub(crate) fn to_exponent(&self) -> Option<i16> {
    match self {
      RegisterValue::S16(value) => Some(*value),
      // NOTE: some devices declare scale factors as uint16
      RegisterValue::U16(value) => Some(*value as i16),
      _ => None,
    }
  }

  pub(crate) fn serialize(&self) -> serde_json::Value {
    match self {
      RegisterValue::U16(value) => serde_json::json!(value),
      RegisterValue::S16(value) => serde_json::json!(value),
      RegisterValue::U32(value) => serde_json::json!(value),
      RegisterValue::S32(value) => serde_json::json!(value),
      RegisterValue::Acc32(value) => serde_json::json!(value),
      RegisterValue::String(value) => serde_json::json!(value),
    }
  }
}

impl Display for RegisterValue {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> Result<(), std::fmt::Error> {
    match self {
      RegisterValue::U16(value) => std::fmt::Display::fmt(value, f),
      RegisterValue::S16(value) => std::fmt::Display::fmt(value, f),
      RegisterValue::U32(value) => std::fmt::Display::fmt(value, f),
      RegisterValue::S32(value) => std::fmt::Display::fmt(value, f),
      RegisterValue::Acc32(value) => std::fmt::Display::fmt(value, f),
      RegisterValue::String(value) => std::fmt::Debug::fmt(value, f),
    }
  }
}

struct Hex<'a>(&'a [u8]);

impl std::fmt::Display for Hex<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("0x")?;
    for byte in self.0 {
      write!(f, "{:02X}", byte)?;
    }
    Ok(())
  }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
  Hex(bytes).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_quantity_matches_width() {
    let kinds = [
      RegisterKind::U16,
      RegisterKind::S16,
      RegisterKind::U32,
      RegisterKind::S32,
      RegisterKind::Acc32,
      string(32),
      string(16),
    ];

    for kind in kinds {
      assert_eq!(kind.quantity() as usize * 2, kind.width(), "{kind}");
    }
  }

  #[test]
  fn kind_displays_sunspec_type_names() {
    assert_eq!(RegisterKind::Acc32.to_string(), "acc32");
    assert_eq!(RegisterKind::S16.to_string(), "int16");
    assert_eq!(string(32).to_string(), "String(32)");
  }

  #[test]
  fn unsigned_scale_factor_is_reinterpreted_as_signed() {
    assert_eq!(RegisterValue::U16(0xFFFE).to_exponent(), Some(-2));
    assert_eq!(RegisterValue::S16(-1).to_exponent(), Some(-1));
    assert_eq!(RegisterValue::U32(1).to_exponent(), None);
  }

  #[test]
  fn origin_names_meters_from_one() {
    assert_eq!(Origin::Base.to_string(), "base");
    assert_eq!(
      Origin::Meter {
        index: 1,
        offset: 40296
      }
      .to_string(),
      "meter2"
    );
  }

  #[test]
  fn raw_bytes_print_as_hex() {
    assert_eq!(hex(&[0x00, 0x0A, 0xFF]), "0x000AFF");
  }
}
