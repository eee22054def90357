use std::error::Error;
use std::sync::Arc;

use super::codec::*;
use super::encoding::*;
use super::register::*;
use super::span::*;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ReadError {
  #[error("Transport failure")]
  Transport(#[from] TransportError),

  #[error("Decoding failure")]
  Decode(#[from] DecodeError),
}

impl ReadError {
  /// Error message including every source in the chain.
  pub(crate) fn describe(&self) -> String {
    let mut message = self.to_string();
    let mut source = self.source();
    while let Some(error) = source {
      message.push_str(": ");
      message.push_str(error.to_string().as_str());
      source = error.source();
    }
    message
  }
}

/// Outcome of reading one register in one poll cycle.
#[derive(Debug)]
pub(crate) struct ReadResult {
  pub(crate) spec: Arc<RegisterSpec>,
  pub(crate) raw: Response,
  pub(crate) value: Result<RegisterValue, ReadError>,
  pub(crate) timestamp: chrono::DateTime<chrono::Utc>,
}

impl ReadResult {
  pub(crate) fn value(&self) -> Option<&RegisterValue> {
    self.value.as_ref().ok()
  }

  pub(crate) fn error(&self) -> Option<&ReadError> {
    self.value.as_ref().err()
  }

  pub(crate) fn serialize(&self) -> serde_json::Value {
    serde_json::json!({
      "name": self.spec.name,
      "address": self.spec.address,
      "quantity": self.spec.quantity,
      "kind": self.spec.kind,
      "description": self.spec.description,
      "origin": self.spec.origin,
      "raw": hex(&self.raw),
      "value": self.value().map(RegisterValue::serialize),
      "error": self.error().map(ReadError::describe),
      "timestamp": self.timestamp,
    })
  }
}

/// Issues one read for `spec` and decodes the returned bytes.
///
/// Never fails as a whole: transport and decoding errors end up in the
/// returned [`ReadResult`].
#[tracing::instrument(skip_all, fields(name = spec.name, address = spec.address, origin = %spec.origin))]
pub(crate) async fn read_register<TCodec: Codec + ?Sized>(
  codec: &TCodec,
  unit: UnitId,
  spec: Arc<RegisterSpec>,
) -> ReadResult {
  let (raw, value) = match read_raw(codec, unit, spec.as_ref()).await {
    Ok(raw) => {
      let value = decode(spec.kind, &raw).map_err(ReadError::from);
      (raw, value)
    }
    Err((raw, error)) => (raw, Err(ReadError::from(error))),
  };

  match &value {
    Ok(value) => tracing::trace!("Read {}", value),
    Err(error) => tracing::debug!("Failed reading {}", error.describe()),
  };

  ReadResult {
    spec,
    raw,
    value,
    timestamp: chrono::Utc::now(),
  }
}

async fn read_raw<TCodec: Codec + ?Sized>(
  codec: &TCodec,
  unit: UnitId,
  spec: &RegisterSpec,
) -> Result<Response, (Response, TransportError)> {
  let words = match SimpleSpan::from_register(spec) {
    Some(words) => words,
    None => {
      return Err((
        Vec::new(),
        TransportError::Range {
          start: spec.address,
          end: spec.address,
        },
      ))
    }
  };

  let raw = codec
    .read_words(unit, words.address, words.last())
    .await
    .map_err(|error| (Vec::new(), error))?;

  let expected = words.quantity as usize * 2;
  if raw.len() != expected {
    let actual = raw.len();
    return Err((raw, TransportError::ResponseLength { expected, actual }));
  }

  Ok(raw)
}
