use super::register::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DecodeError {
  #[error("Expected {expected} bytes for {kind} but got {actual}")]
  LengthMismatch {
    kind: RegisterKind,
    expected: usize,
    actual: usize,
  },
}

macro_rules! decode_numeric {
  ($variant: ident, $type: ty, $kind: ident, $bytes: ident) => {{
    let array = <[u8; std::mem::size_of::<$type>()]>::try_from($bytes)
      .map_err(|_| DecodeError::LengthMismatch {
        kind: $kind,
        expected: std::mem::size_of::<$type>(),
        actual: $bytes.len(),
      })?;
    RegisterValue::$variant(<$type>::from_be_bytes(array))
  }};
}

/// Decodes the exact byte span of one register.
pub(crate) fn decode(
  kind: RegisterKind,
  bytes: &[u8],
) -> Result<RegisterValue, DecodeError> {
  let value = match kind {
    RegisterKind::U16 => decode_numeric!(U16, u16, kind, bytes),
    RegisterKind::S16 => decode_numeric!(S16, i16, kind, bytes),
    RegisterKind::U32 => decode_numeric!(U32, u32, kind, bytes),
    RegisterKind::S32 => decode_numeric!(S32, i32, kind, bytes),
    RegisterKind::Acc32 => decode_numeric!(Acc32, u32, kind, bytes),
    RegisterKind::String(_) => {
      if bytes.len() != kind.width() {
        return Err(DecodeError::LengthMismatch {
          kind,
          expected: kind.width(),
          actual: bytes.len(),
        });
      }

      // NOTE: padding stays as received
      RegisterValue::String(String::from_utf8_lossy(bytes).into_owned())
    }
  };

  Ok(value)
}

/// Flattens register words into their on-wire big-endian byte order.
pub(crate) fn encode_word_bytes<TIntoIterator>(data: TIntoIterator) -> Vec<u8>
where
  TIntoIterator: IntoIterator<Item = u16>,
{
  data
    .into_iter()
    .flat_map(|value| value.to_be_bytes())
    .collect()
}
