pub(crate) mod codec;
pub(crate) mod connection;
pub(crate) mod encoding;
pub(crate) mod map;
pub(crate) mod poll;
pub(crate) mod reader;
pub(crate) mod register;
pub(crate) mod service;
pub(crate) mod span;
pub(crate) mod template;
pub(crate) mod worker;

pub(crate) use codec::{Codec, TransportError, UnitId, DEFAULT_UNIT};
pub(crate) use map::*;
pub(crate) use poll::{PollError, PollOptions, PollOutcome};
pub(crate) use reader::*;
pub(crate) use register::*;
pub(crate) use service::*;
