#![allow(dead_code)]

use kvdt::proto::{MessageCode, RpbErrorResp};
use kvdt::{Executor, RawResponse, RequestDescriptor};
use prost::Message as _;
use std::future::Future;
use std::sync::Mutex;

/// The transport failure a [`MockExecutor`] can be told to produce.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("connection reset")]
pub(crate) struct ConnectionReset;

/// An executor that answers every request with the same canned reply and remembers what it sent.
#[derive(Debug)]
pub(crate) struct MockExecutor {
    reply: Result<RawResponse, ConnectionReset>,
    sent: Mutex<Vec<RequestDescriptor>>,
}

impl MockExecutor {
    pub(crate) fn replying(code: MessageCode, message: &impl prost::Message) -> Self {
        Self::raw(RawResponse::new(code, message.encode_to_vec()))
    }

    /// A reply that carries only a code.
    pub(crate) fn empty(code: MessageCode) -> Self {
        Self::raw(RawResponse::new(code, Vec::new()))
    }

    pub(crate) fn store_error(code: u32, message: &str) -> Self {
        let error = RpbErrorResp {
            errmsg: message.as_bytes().to_vec(),
            errcode: code,
        };
        Self::raw(RawResponse::new(MessageCode::ErrorResp, error.encode_to_vec()))
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: Err(ConnectionReset),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn raw(reply: RawResponse) -> Self {
        Self {
            reply: Ok(reply),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every request sent so far.
    pub(crate) fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap().clone()
    }

    /// Decode the only request sent so far.
    pub(crate) fn sent_message<M: prost::Message + Default>(&self) -> M {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one request");
        M::decode(sent[0].payload.as_slice()).unwrap()
    }
}

impl Executor for MockExecutor {
    type Error = ConnectionReset;

    fn execute(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<RawResponse, ConnectionReset>> + Send {
        self.sent.lock().unwrap().push(request);
        let reply = self.reply.clone();
        async move { reply }
    }
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
