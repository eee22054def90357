use std::sync::Arc;

use itertools::Itertools;
use tokio_modbus::Address;

use super::register::*;
use super::span::*;
use super::template;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ConfigurationError {
  #[error("Requested {requested} meters but only {available} offsets are configured")]
  InsufficientOffsets { requested: usize, available: usize },

  #[error("Register {first} overlaps register {second}")]
  Overlap { first: String, second: String },

  #[error("Register {name} spans {quantity} words but {kind} needs {expected}")]
  WidthMismatch {
    name: String,
    kind: RegisterKind,
    quantity: u16,
    expected: u16,
  },

  #[error("Register {name} at {address} is outside the register space")]
  AddressOutOfRange { name: String, address: u32 },
}

/// Ordered, immutable list of registers polled in one cycle.
#[derive(Debug, Clone, Default)]
pub(crate) struct RegisterMap {
  specs: Vec<Arc<RegisterSpec>>,
}

impl RegisterMap {
  pub(crate) fn new<TIntoIterator: IntoIterator<Item = RegisterSpec>>(
    specs: TIntoIterator,
  ) -> Self {
    Self {
      specs: specs.into_iter().map(Arc::new).collect(),
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.specs.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.specs.is_empty()
  }

  pub(crate) fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<RegisterSpec>> {
    self.specs.iter()
  }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RegisterMapBuilder {
  base: &'static [RegisterTemplate],
  meter: &'static [RegisterTemplate],
}

impl Default for RegisterMapBuilder {
  fn default() -> Self {
    Self::new(template::BASE, template::METER)
  }
}

impl RegisterMapBuilder {
  pub(crate) fn new(
    base: &'static [RegisterTemplate],
    meter: &'static [RegisterTemplate],
  ) -> Self {
    Self { base, meter }
  }

  /// Base block followed by `meter_count` meter blocks placed at the first
  /// `meter_count` offsets.
  #[tracing::instrument(skip(self))]
  pub(crate) fn build(
    &self,
    meter_count: usize,
    meter_offsets: &[Address],
  ) -> Result<RegisterMap, ConfigurationError> {
    if meter_count > meter_offsets.len() {
      return Err(ConfigurationError::InsufficientOffsets {
        requested: meter_count,
        available: meter_offsets.len(),
      });
    }

    let mut specs =
      Vec::with_capacity(self.base.len() + meter_count * self.meter.len());
    for template in self.base {
      specs.push(Self::instantiate(template, 0, Origin::Base)?);
    }
    for (index, offset) in meter_offsets.iter().take(meter_count).enumerate() {
      let origin = Origin::Meter {
        index,
        offset: *offset,
      };
      for template in self.meter {
        specs.push(Self::instantiate(template, *offset, origin)?);
      }
    }

    Self::check_overlaps(&specs)?;

    tracing::debug!(
      "Built register map with {} registers and {} meters",
      specs.len(),
      meter_count
    );

    Ok(RegisterMap::new(specs))
  }

  fn instantiate(
    template: &RegisterTemplate,
    offset: Address,
    origin: Origin,
  ) -> Result<RegisterSpec, ConfigurationError> {
    let expected = template.kind.quantity();
    let even = match template.kind {
      RegisterKind::String(StringRegisterKind { length }) => {
        length >= 2 && length % 2 == 0
      }
      _ => true,
    };
    if !even || template.quantity != expected {
      return Err(ConfigurationError::WidthMismatch {
        name: template.name.to_owned(),
        kind: template.kind,
        quantity: template.quantity,
        expected,
      });
    }

    let address = offset as u32 + template.address as u32;
    let end = address + template.quantity as u32;
    if address < ADDRESS_BASE as u32 || end > Address::MAX as u32 + 1 {
      return Err(ConfigurationError::AddressOutOfRange {
        name: template.name.to_owned(),
        address,
      });
    }

    Ok(RegisterSpec::instantiate(
      template,
      address as Address,
      origin,
    ))
  }

  fn check_overlaps(specs: &[RegisterSpec]) -> Result<(), ConfigurationError> {
    let sorted = specs
      .iter()
      .sorted_by_key(|spec| (spec.address, spec.quantity))
      .collect::<Vec<_>>();

    match sorted
      .iter()
      .tuple_windows()
      .find(|(first, second)| first.overlaps(*second))
    {
      Some((first, second)) => Err(ConfigurationError::Overlap {
        first: describe(first),
        second: describe(second),
      }),
      None => Ok(()),
    }
  }
}

fn describe(spec: &RegisterSpec) -> String {
  format!("{}/{}@{}", spec.origin, spec.name, spec.address)
}

#[cfg(test)]
mod tests {
  use super::super::template::{BASE, METER, METER_OFFSETS};
  use super::*;

  #[test]
  fn no_meters_is_the_base_template() {
    let map = RegisterMapBuilder::default()
      .build(0, &METER_OFFSETS)
      .unwrap();

    assert_eq!(map.len(), BASE.len());
    for (spec, template) in map.iter().zip(BASE) {
      assert_eq!(spec.address, template.address);
      assert_eq!(spec.quantity, template.quantity);
      assert_eq!(spec.name, template.name);
      assert_eq!(spec.kind, template.kind);
      assert_eq!(spec.origin, Origin::Base);
    }
  }

  #[test]
  fn no_meters_needs_no_offsets() {
    let map = RegisterMapBuilder::default().build(0, &[]).unwrap();

    assert_eq!(map.len(), BASE.len());
  }

  #[test]
  fn meters_are_shifted_copies_of_the_template() {
    let offsets = [40122, 40296];

    let map = RegisterMapBuilder::default().build(2, &offsets).unwrap();

    assert_eq!(map.len(), BASE.len() + 2 * METER.len());
    let meters = map.iter().skip(BASE.len()).collect::<Vec<_>>();
    for (index, offset) in offsets.iter().enumerate() {
      let instance = &meters[index * METER.len()..(index + 1) * METER.len()];
      for (spec, template) in instance.iter().zip(METER) {
        assert_eq!(spec.address, template.address + offset);
        assert_eq!(spec.name, template.name);
        assert_eq!(spec.kind, template.kind);
        assert_eq!(
          spec.origin,
          Origin::Meter {
            index,
            offset: *offset
          }
        );
      }
    }
  }

  #[test]
  fn only_the_first_offsets_are_used() {
    let map = RegisterMapBuilder::default()
      .build(1, &METER_OFFSETS)
      .unwrap();

    assert_eq!(map.len(), BASE.len() + METER.len());
  }

  #[test]
  fn missing_offsets_are_rejected() {
    let result = RegisterMapBuilder::default().build(3, &[40122, 40296]);

    assert_eq!(
      result.unwrap_err(),
      ConfigurationError::InsufficientOffsets {
        requested: 3,
        available: 2
      }
    );
  }

  #[test]
  fn overlapping_meters_are_rejected() {
    let result = RegisterMapBuilder::default().build(2, &[40122, 40200]);

    assert!(matches!(
      result,
      Err(ConfigurationError::Overlap { .. })
    ));
  }

  #[test]
  fn duplicate_offsets_are_rejected() {
    let result = RegisterMapBuilder::default().build(2, &[40296, 40296]);

    assert!(matches!(
      result,
      Err(ConfigurationError::Overlap { .. })
    ));
  }

  #[test]
  fn meter_inside_base_block_is_rejected() {
    let result = RegisterMapBuilder::default().build(1, &[40100]);

    assert!(matches!(
      result,
      Err(ConfigurationError::Overlap { .. })
    ));
  }

  #[test]
  fn meter_past_register_space_is_rejected() {
    let result = RegisterMapBuilder::default().build(1, &[65500]);

    assert!(matches!(
      result,
      Err(ConfigurationError::AddressOutOfRange { .. })
    ));
  }

  static WRONG_WIDTH: &[RegisterTemplate] = &[RegisterTemplate::new(
    40001,
    1,
    "C_SunSpec_ID",
    RegisterKind::U32,
    "",
  )];

  static ODD_STRING: &[RegisterTemplate] =
    &[RegisterTemplate::new(40005, 1, "C_Manufacturer", string(3), "")];

  static BELOW_BASE: &[RegisterTemplate] = &[RegisterTemplate::new(
    40000,
    1,
    "C_DeviceAddress",
    RegisterKind::U16,
    "",
  )];

  #[test]
  fn width_must_match_kind() {
    for base in [WRONG_WIDTH, ODD_STRING] {
      let result = RegisterMapBuilder::new(base, METER).build(0, &[]);

      assert!(matches!(
        result,
        Err(ConfigurationError::WidthMismatch { .. })
      ));
    }
  }

  #[test]
  fn register_below_base_is_rejected() {
    let result = RegisterMapBuilder::new(BELOW_BASE, METER).build(0, &[]);

    assert!(matches!(
      result,
      Err(ConfigurationError::AddressOutOfRange { address: 40000, .. })
    ));
  }
}
