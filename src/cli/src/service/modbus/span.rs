use std::fmt::Debug;

use tokio_modbus::{Address, Quantity};

// NOTE: register numbers as printed in the SunSpec map - word 0 on the wire
pub(crate) const ADDRESS_BASE: Address = 40001;

pub(crate) trait Span {
  fn address(&self) -> Address;

  fn quantity(&self) -> Quantity;

  /// One past the last register of the span.
  fn end(&self) -> u32 {
    self.address() as u32 + self.quantity() as u32
  }

  fn overlaps<TOther: Span>(&self, other: &TOther) -> bool {
    (self.address() as u32) < other.end()
      && (other.address() as u32) < self.end()
  }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub(crate) struct SimpleSpan {
  pub(crate) address: u16,
  pub(crate) quantity: u16,
}

impl SimpleSpan {
  /// Zero-based word span for a register span numbered from
  /// [`ADDRESS_BASE`].
  pub(crate) fn from_register<TSpan: Span>(span: &TSpan) -> Option<Self> {
    let address = span.address().checked_sub(ADDRESS_BASE)?;
    if span.quantity() == 0 {
      return None;
    }

    Some(Self {
      address,
      quantity: span.quantity(),
    })
  }

  /// Inclusive word range as taken by [`super::codec::Codec::read_words`].
  pub(crate) fn from_inclusive(start: Address, end: Address) -> Option<Self> {
    let quantity = end.checked_sub(start)?.checked_add(1)?;
    Some(Self {
      address: start,
      quantity,
    })
  }

  pub(crate) fn last(&self) -> Address {
    self.address + (self.quantity - 1)
  }
}

impl Span for SimpleSpan {
  fn address(&self) -> Address {
    self.address
  }

  fn quantity(&self) -> Quantity {
    self.quantity
  }
}

impl<TSpan: Span> Span for &TSpan {
  fn address(&self) -> Address {
    (*self).address()
  }

  fn quantity(&self) -> Quantity {
    (*self).quantity()
  }
}
