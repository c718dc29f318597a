//! The lifecycle every operation follows: build, construct the request, decode the reply.

use crate::proto::MessageCode;
use crate::tracing_shim::trace;
use crate::{Error, Result};
use prost::Message;

/// A request ready to hand to an [`Executor`](crate::Executor).
///
/// Together with the command's [`response_message`](Command::response_message) factory, this is
/// everything an executor needs to send the request and recognize its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// The name of the command that built the request, for diagnostics.
    pub command: &'static str,
    /// The code framing the request.
    pub request_code: MessageCode,
    /// The serialized request message.
    pub payload: Vec<u8>,
    /// The code framing a successful reply.
    pub expected_response_code: MessageCode,
}

/// A single operation against the store.
///
/// A command is created by its builder with validated options. [`construct_request`] is pure and
/// may be called any number of times. [`decode_response`] is called at most once, by a single
/// caller, after the executor has received the expected reply. When the executor fails instead,
/// the command is never decoded and [`response`] stays `None`.
///
/// Commands hold no locks and share nothing, so distinct commands may be used from different
/// threads freely.
///
/// [`construct_request`]: Command::construct_request
/// [`decode_response`]: Command::decode_response
/// [`response`]: Command::response
pub trait Command: Sized {
    /// A stable name for diagnostics.
    const NAME: &'static str;
    /// The code framing the request.
    const REQUEST_CODE: MessageCode;
    /// The code framing a successful reply.
    const EXPECTED_RESPONSE_CODE: MessageCode;

    /// The request message.
    type Request: Message;
    /// The reply message.
    type ResponseMessage: Message + Default;
    /// The decoded, typed result.
    type Response;

    /// A stable name for diagnostics.
    #[inline]
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Map the options to a request message.
    fn construct_request(&self) -> Result<Self::Request>;

    /// Decode the reply into [`Self::Response`].
    ///
    /// `None` means the reply had no body at all.
    fn decode_response(&mut self, message: Option<Self::ResponseMessage>) -> Result<()>;

    /// The decoded response, once [`decode_response`](Command::decode_response) has succeeded.
    fn response(&self) -> Option<&Self::Response>;

    /// Take the decoded response.
    fn into_response(self) -> Option<Self::Response>;

    /// An empty reply message, to be filled by the decoder.
    #[inline]
    fn response_message() -> Self::ResponseMessage {
        Self::ResponseMessage::default()
    }

    /// Construct and serialize the request.
    fn request_descriptor(&self) -> Result<RequestDescriptor> {
        let payload = self.construct_request()?.encode_to_vec();
        trace!(command = Self::NAME, len = payload.len(), "constructed request");
        Ok(RequestDescriptor {
            command: Self::NAME,
            request_code: Self::REQUEST_CODE,
            payload,
            expected_response_code: Self::EXPECTED_RESPONSE_CODE,
        })
    }

    /// Deserialize a reply body and decode it.
    ///
    /// An empty body is passed on as `None`.
    fn decode_payload(&mut self, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return self.decode_response(None);
        }

        let mut message = Self::response_message();
        message.merge(payload).map_err(|source| Error::Decode {
            command: Self::NAME,
            message: std::any::type_name::<Self::ResponseMessage>(),
            source,
        })?;
        self.decode_response(Some(message))
    }
}
