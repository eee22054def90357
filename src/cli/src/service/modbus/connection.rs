use futures_time::future::FutureExt;
use tokio::net::TcpStream;
use tokio_modbus::{
  client::Context,
  prelude::{Reader, SlaveContext},
  Slave,
};

use super::codec::{TransportError, UnitId};
use super::span::SimpleSpan;

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub(crate) struct Destination {
  pub(crate) host: String,
  pub(crate) port: u16,
}

impl std::fmt::Display for Destination {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.host, self.port)
  }
}

pub(crate) type Response = Vec<u16>;

#[derive(Debug)]
pub(crate) struct Connection {
  destination: Destination,
  ctx: Context,
}

impl Connection {
  pub(crate) async fn connect(
    destination: Destination,
    timeout: chrono::Duration,
  ) -> Result<Self, TransportError> {
    let stream =
      TcpStream::connect((destination.host.as_str(), destination.port))
        .timeout(timeout_from_chrono(timeout))
        .await
        .map_err(TransportError::Timeout)?
        .map_err(TransportError::Connect)?;

    let ctx = tokio_modbus::prelude::tcp::attach(stream);
    Ok(Self { destination, ctx })
  }

  pub(crate) fn destination(&self) -> &Destination {
    &self.destination
  }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Params {
  timeout: futures_time::time::Duration,
  backoff: tokio::time::Duration,
  retries: usize,
}

impl Params {
  pub(crate) fn new(
    timeout: chrono::Duration,
    backoff: chrono::Duration,
    retries: usize,
  ) -> Self {
    Self {
      timeout: timeout_from_chrono(timeout),
      backoff: backoff_from_chrono(backoff),
      retries: retries.max(1),
    }
  }

  pub(crate) fn timeout(self) -> chrono::Duration {
    timeout_to_chrono(self.timeout)
  }
}

impl Connection {
  /// Reads with up to `params.retries` attempts and returns the last error
  /// when every attempt failed.
  pub(crate) async fn parameterized_read(
    &mut self,
    unit: UnitId,
    span: SimpleSpan,
    params: Params,
  ) -> Result<Response, TransportError> {
    if Slave(unit) < Slave::min_device() || Slave(unit) > Slave::max_device() {
      return Err(TransportError::Unit(unit));
    }
    self.ctx.set_slave(Slave(unit));

    let mut retried = 0;
    loop {
      match self.simple_read_impl(span, params.timeout).await {
        Ok(response) => return Ok(response),
        Err(error) => {
          retried += 1;
          if retried >= params.retries || is_broken(&error) {
            return Err(error);
          }

          tracing::trace!(
            "Retrying {:?} after attempt {} failed {}",
            span,
            retried,
            error
          );
          tokio::time::sleep(params.backoff).await;
        }
      }
    }
  }

  async fn simple_read_impl(
    &mut self,
    span: SimpleSpan,
    timeout: futures_time::time::Duration,
  ) -> Result<Response, TransportError> {
    let response = self
      .ctx
      .read_holding_registers(span.address, span.quantity)
      .timeout(timeout)
      .await
      .map_err(TransportError::Timeout)?
      .map_err(TransportError::Io)?;

    Ok(response)
  }
}

/// Whether the connection has to be reestablished after `error`.
pub(crate) fn is_broken(error: &TransportError) -> bool {
  match error {
    TransportError::Io(error) => !matches!(
      error.kind(),
      std::io::ErrorKind::InvalidData | std::io::ErrorKind::Other
    ),
    TransportError::Connect(_) | TransportError::Timeout(_) => true,
    _ => false,
  }
}

fn timeout_to_chrono(
  timeout: futures_time::time::Duration,
) -> chrono::Duration {
  chrono::Duration::milliseconds(timeout.as_millis() as i64)
}

fn timeout_from_chrono(
  timeout: chrono::Duration,
) -> futures_time::time::Duration {
  futures_time::time::Duration::from_millis(
    timeout.num_milliseconds().max(0) as u64,
  )
}

fn backoff_from_chrono(backoff: chrono::Duration) -> tokio::time::Duration {
  tokio::time::Duration::from_millis(backoff.num_milliseconds().max(0) as u64)
}
