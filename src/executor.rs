//! The boundary to the transport that actually talks to the store.

use crate::command::{Command, RequestDescriptor};
use crate::internal_macros::future_send;
use crate::proto::{MessageCode, RpbErrorResp};
use crate::tracing_shim::{debug, debug_span, warn, Instrument as _};
use crate::{Error, Result};
use prost::Message as _;

/// A reply as received from the store: its message code and body, without framing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// The code framing the reply.
    pub code: u8,
    /// The reply body. Empty when the reply carried only a code.
    pub payload: Vec<u8>,
}

impl RawResponse {
    /// A reply with the given code and body.
    #[inline]
    pub fn new(code: impl Into<u8>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into(),
            payload: payload.into(),
        }
    }
}

/// Sends requests to the store.
///
/// Connections, framing, node selection, retries, and enforcing timeouts are all the executor's
/// concern. Commands only describe the request and decode the reply.
pub trait Executor {
    /// A failure to deliver the request or receive the reply.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send the request and wait for the store's reply.
    fn execute(&self, request: RequestDescriptor) -> future_send!(Result<RawResponse, Self::Error>);
}

/// Run a command once: construct its request, execute it, and decode the reply into the command.
///
/// A transport failure, an error reply from the store, or a reply with an unexpected code is
/// returned without decoding anything. Nothing is retried.
pub async fn execute<E, C>(executor: &E, command: &mut C) -> Result<()>
where
    E: Executor,
    C: Command,
{
    run(executor, command)
        .instrument(debug_span!("execute", command = C::NAME))
        .await
}

async fn run<E, C>(executor: &E, command: &mut C) -> Result<()>
where
    E: Executor,
    C: Command,
{
    let request = command.request_descriptor()?;
    debug!(len = request.payload.len(), "sending request");
    let response = executor
        .execute(request)
        .await
        .map_err(|err| Error::Transport(Box::new(err)))?;

    if response.code == MessageCode::ErrorResp.as_u8() {
        let error = RpbErrorResp::decode(response.payload.as_slice()).map_err(|source| {
            Error::Decode {
                command: C::NAME,
                message: "RpbErrorResp",
                source,
            }
        })?;
        let message = String::from_utf8_lossy(&error.errmsg).into_owned();
        warn!(code = error.errcode, %message, "store returned an error");
        return Err(Error::Store {
            code: error.errcode,
            message,
        });
    }

    if C::EXPECTED_RESPONSE_CODE != response.code {
        warn!(code = response.code, "unexpected response code");
        return Err(Error::UnexpectedResponse {
            command: C::NAME,
            expected: C::EXPECTED_RESPONSE_CODE.as_u8(),
            actual: response.code,
        });
    }

    debug!(len = response.payload.len(), "decoding reply");
    command.decode_payload(&response.payload)
}
