use tokio_modbus::Address;

pub(crate) type UnitId = u8;

pub(crate) const DEFAULT_UNIT: UnitId = 1;

pub(crate) type Response = Vec<u8>;

#[derive(Debug, thiserror::Error)]
pub(crate) enum TransportError {
  #[error("Failed to connect")]
  Connect(#[source] std::io::Error),

  #[error("Wrong unit number {0}")]
  Unit(UnitId),

  #[error("Failed reading")]
  Io(#[source] std::io::Error),

  #[error("Read timed out")]
  Timeout(#[source] std::io::Error),

  #[error("Channel was disconnected before the request could be finished")]
  Disconnected(#[source] anyhow::Error),

  #[error("Invalid word range {start}..={end}")]
  Range { start: Address, end: Address },

  #[error("Expected {expected} bytes but transport returned {actual}")]
  ResponseLength { expected: usize, actual: usize },
}

/// Reads raw words from a single device.
///
/// Implementations are shared between concurrent reads so they must be
/// callable through a shared reference and do their own request correlation.
#[async_trait::async_trait]
pub(crate) trait Codec: Send + Sync {
  /// Reads the words `start..=end` (zero-based) and returns them as
  /// big-endian bytes, two per word.
  async fn read_words(
    &self,
    unit: UnitId,
    start: Address,
    end: Address,
  ) -> Result<Response, TransportError>;
}

#[async_trait::async_trait]
impl<TCodec: Codec + ?Sized> Codec for std::sync::Arc<TCodec> {
  async fn read_words(
    &self,
    unit: UnitId,
    start: Address,
    end: Address,
  ) -> Result<Response, TransportError> {
    self.as_ref().read_words(unit, start, end).await
  }
}
