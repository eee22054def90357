use std::sync::Arc;

use futures_time::future::FutureExt;
use tokio::sync::Mutex;
use tokio_modbus::Address;

use super::codec::{Codec, TransportError, UnitId};
use super::connection::*;
use super::encoding::encode_word_bytes;
use super::span::SimpleSpan;

/// Owns the single connection to the inverter and serializes requests from
/// every concurrent reader onto it.
#[derive(Debug, Clone)]
pub(crate) struct Worker {
  sender: RequestSender,
  handle: Arc<Mutex<Option<TaskHandle>>>,
  termination_timeout: futures_time::time::Duration,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum TerminateError {
  #[error("Channel was disconnected before the request could be finished")]
  ChannelDisconnected(anyhow::Error),

  #[error("Termination timed out")]
  Timeout(anyhow::Error),

  #[error("Failed joining inner handle")]
  Join(anyhow::Error),
}

impl Worker {
  pub(crate) fn new(
    destination: Destination,
    params: Params,
    termination_timeout: chrono::Duration,
  ) -> Self {
    let (sender, receiver) = flume::unbounded();
    let task = Task::new(destination, params, receiver);
    let handle = tokio::spawn(task.execute());
    Self {
      sender,
      handle: Arc::new(Mutex::new(Some(handle))),
      termination_timeout: futures_time::time::Duration::from_millis(
        termination_timeout.num_milliseconds().max(0) as u64,
      ),
    }
  }

  pub(crate) async fn send(
    &self,
    unit: UnitId,
    span: SimpleSpan,
  ) -> Result<Response, TransportError> {
    let (sender, receiver) = flume::bounded(1);
    if let Err(error) = self
      .sender
      .send_async(TaskRequest::Carrier(Carrier { unit, span, sender }))
      .await
    {
      return Err(TransportError::Disconnected(error.into()));
    };

    match receiver.recv_async().await {
      Ok(response) => response,
      Err(error) => Err(TransportError::Disconnected(error.into())),
    }
  }

  pub(crate) async fn terminate(&self) -> Result<(), TerminateError> {
    let result = self.sender.send_async(TaskRequest::Terminate).await;

    let handle = {
      let mut handle = self.handle.clone().lock_owned().await;
      (*handle).take()
    };
    if let Some(handle) = handle {
      let abort_handle = handle.abort_handle();
      match handle.timeout(self.termination_timeout).await {
        Ok(Ok(_)) => {}
        Err(error) => {
          abort_handle.abort();
          return Err(TerminateError::Timeout(error.into()));
        }
        Ok(Err(error)) => {
          abort_handle.abort();
          return Err(TerminateError::Join(error.into()));
        }
      };
    }

    result.map_err(|error| TerminateError::ChannelDisconnected(error.into()))
  }
}

#[async_trait::async_trait]
impl Codec for Worker {
  async fn read_words(
    &self,
    unit: UnitId,
    start: Address,
    end: Address,
  ) -> Result<super::codec::Response, TransportError> {
    let span = SimpleSpan::from_inclusive(start, end)
      .ok_or(TransportError::Range { start, end })?;
    let words = self.send(unit, span).await?;
    Ok(encode_word_bytes(words))
  }
}

type TaskHandle = tokio::task::JoinHandle<()>;

#[derive(Clone, Debug)]
struct Carrier {
  unit: UnitId,
  span: SimpleSpan,
  sender: ResponseSender,
}

#[derive(Clone, Debug)]
enum TaskRequest {
  Carrier(Carrier),
  Terminate,
}

type RequestSender = flume::Sender<TaskRequest>;
type RequestReceiver = flume::Receiver<TaskRequest>;
type ResponseSender = flume::Sender<Result<Response, TransportError>>;

#[derive(Debug)]
struct Task {
  destination: Destination,
  connection: Option<Connection>,
  receiver: RequestReceiver,
  params: Params,
}

impl Task {
  fn new(
    destination: Destination,
    params: Params,
    receiver: RequestReceiver,
  ) -> Self {
    Self {
      destination,
      connection: None,
      receiver,
      params,
    }
  }

  async fn execute(mut self) {
    loop {
      let carrier = match self.receiver.recv_async().await {
        Ok(TaskRequest::Carrier(carrier)) => carrier,
        Ok(TaskRequest::Terminate) => {
          tracing::trace!("Terminating {}", self.destination);
          return;
        }
        Err(flume::RecvError::Disconnected) => return,
      };

      // NOTE: the caller gave up on this request so nobody needs the result
      if carrier.sender.is_disconnected() {
        tracing::trace!("Skipping abandoned read of {:?}", carrier.span);
        continue;
      }

      let response = self.read(carrier.unit, carrier.span).await;
      if let Err(error) = carrier.sender.try_send(response) {
        tracing::trace!(
          "Failed sending response to {:?} {}",
          carrier.span,
          error
        );
      }
    }
  }

  #[tracing::instrument(skip(self), fields(destination = %self.destination))]
  async fn read(
    &mut self,
    unit: UnitId,
    span: SimpleSpan,
  ) -> Result<Response, TransportError> {
    let mut connection = match self.connection.take() {
      Some(connection) => connection,
      None => {
        let connection =
          Connection::connect(self.destination.clone(), self.params.timeout())
            .await?;
        tracing::debug!("Connected to {}", connection.destination());
        connection
      }
    };

    let result = connection.parameterized_read(unit, span, self.params).await;
    match &result {
      Err(error) if is_broken(error) => {
        tracing::debug!("Dropping connection after {}", error);
      }
      _ => self.connection = Some(connection),
    }

    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unreachable_worker() -> Worker {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    Worker::new(
      Destination {
        host: "127.0.0.1".to_owned(),
        port,
      },
      Params::new(
        chrono::Duration::seconds(1),
        chrono::Duration::zero(),
        1,
      ),
      chrono::Duration::seconds(1),
    )
  }

  #[tokio::test]
  async fn inverted_range_is_rejected_before_sending() {
    let worker = unreachable_worker();

    let result = worker.read_words(1, 10, 9).await;

    assert!(matches!(
      result,
      Err(TransportError::Range { start: 10, end: 9 })
    ));
    worker.terminate().await.unwrap();
  }

  #[tokio::test]
  async fn unreachable_device_is_a_connect_error() {
    let worker = unreachable_worker();

    let result = worker.read_words(1, 0, 1).await;

    assert!(matches!(result, Err(TransportError::Connect(_))));
    worker.terminate().await.unwrap();
  }

  #[tokio::test]
  async fn terminated_worker_reports_disconnect() {
    let worker = unreachable_worker();
    worker.terminate().await.unwrap();

    let result = worker.read_words(1, 0, 1).await;

    assert!(matches!(result, Err(TransportError::Disconnected(_))));
  }
}
