use std::num::NonZeroUsize;

use futures::StreamExt;
use rust_decimal::Decimal;
use tokio_modbus::Address;

use super::codec::*;
use super::map::*;
use super::reader::*;
use super::register::*;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollOptions {
  /// Reads in flight at once. Unbounded when absent.
  pub(crate) max_concurrency: Option<NonZeroUsize>,
  /// Abort on the first transport failure.
  pub(crate) fail_fast: bool,
  pub(crate) unit: UnitId,
}

impl Default for PollOptions {
  fn default() -> Self {
    Self {
      max_concurrency: None,
      fail_fast: false,
      unit: DEFAULT_UNIT,
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PollError {
  #[error("Poll aborted after reading {name} ({origin}) at {address} failed")]
  Aborted {
    name: &'static str,
    address: Address,
    origin: Origin,
    #[source]
    source: TransportError,
  },
}

/// Every register of one poll cycle in register map order.
#[derive(Debug)]
pub(crate) struct PollOutcome {
  results: Vec<ReadResult>,
  failures: usize,
  started: chrono::DateTime<chrono::Utc>,
  finished: chrono::DateTime<chrono::Utc>,
}

impl PollOutcome {
  fn new(
    results: Vec<ReadResult>,
    started: chrono::DateTime<chrono::Utc>,
  ) -> Self {
    let failures = results
      .iter()
      .filter(|result| result.error().is_some())
      .count();
    Self {
      results,
      failures,
      started,
      finished: chrono::Utc::now(),
    }
  }

  pub(crate) fn results(&self) -> &[ReadResult] {
    &self.results
  }

  pub(crate) fn len(&self) -> usize {
    self.results.len()
  }

  pub(crate) fn failures(&self) -> usize {
    self.failures
  }

  pub(crate) fn started(&self) -> chrono::DateTime<chrono::Utc> {
    self.started
  }

  pub(crate) fn finished(&self) -> chrono::DateTime<chrono::Utc> {
    self.finished
  }

  pub(crate) fn get(&self, name: &str, origin: Origin) -> Option<&ReadResult> {
    self
      .results
      .iter()
      .find(|result| result.spec.origin == origin && result.spec.name == name)
  }

  /// Decoded value multiplied by its SunSpec scale factor.
  pub(crate) fn scaled(&self, result: &ReadResult) -> Option<Decimal> {
    let value = result.value()?.to_decimal()?;
    let scale = match result.spec.scale {
      Some(scale) => scale,
      None => return Some(value),
    };
    let exponent = self
      .get(scale, result.spec.origin)?
      .value()?
      .to_exponent()?;

    scale_decimal(value, exponent)
  }

  pub(crate) fn serialize(&self) -> serde_json::Value {
    serde_json::json!({
      "started": self.started,
      "finished": self.finished,
      "failures": self.failures,
      "registers": self
        .results
        .iter()
        .map(ReadResult::serialize)
        .collect::<Vec<_>>(),
    })
  }
}

// NOTE: Decimal supports at most 28 fractional digits
const MAX_EXPONENT: u32 = 28;

fn scale_decimal(value: Decimal, exponent: i16) -> Option<Decimal> {
  let magnitude = exponent.unsigned_abs() as u32;
  if magnitude > MAX_EXPONENT {
    return None;
  }

  if exponent < 0 {
    return value.checked_mul(Decimal::new(1, magnitude));
  }

  let mut factor = Decimal::ONE;
  for _ in 0..magnitude {
    factor = factor.checked_mul(Decimal::TEN)?;
  }
  value.checked_mul(factor)
}

/// Reads every register of `map` once.
///
/// Reads run concurrently over the shared `codec`. Individual failures are
/// kept in their results unless `options.fail_fast` is set, in which case the
/// first transport failure aborts the poll and outstanding reads are dropped.
#[tracing::instrument(skip(map, codec), fields(registers = map.len()))]
pub(crate) async fn poll<TCodec: Codec + ?Sized>(
  map: &RegisterMap,
  codec: &TCodec,
  options: PollOptions,
) -> Result<PollOutcome, PollError> {
  let started = chrono::Utc::now();
  let limit = options
    .max_concurrency
    .map_or(map.len(), NonZeroUsize::get)
    .max(1);

  let mut slots = map.iter().map(|_| None).collect::<Vec<Option<ReadResult>>>();
  let mut reads = futures::stream::iter(map.iter().cloned().enumerate())
    .map(move |(index, spec)| async move {
      (index, read_register(codec, options.unit, spec).await)
    })
    .buffer_unordered(limit);

  while let Some((index, result)) = reads.next().await {
    let result = match result {
      ReadResult {
        spec,
        value: Err(ReadError::Transport(source)),
        ..
      } if options.fail_fast => {
        tracing::debug!("Aborting poll after {} failed", spec.name);

        return Err(PollError::Aborted {
          name: spec.name,
          address: spec.address,
          origin: spec.origin,
          source,
        });
      }
      result => result,
    };

    if let Some(slot) = slots.get_mut(index) {
      *slot = Some(result);
    }
  }

  let outcome =
    PollOutcome::new(slots.into_iter().flatten().collect(), started);

  if map.is_empty() {
    tracing::debug!("Polled an empty register map");
  } else {
    tracing::debug!(
      "Polled {} registers with {} failures",
      outcome.len(),
      outcome.failures()
    );
  }

  Ok(outcome)
}
