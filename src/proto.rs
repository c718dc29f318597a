//! Protocol-buffer messages exchanged with the store, and the codes that frame them.

#[allow(
    missing_docs,
    unreachable_pub,
    unused_qualifications,
    clippy::all,
    clippy::nursery,
    clippy::missing_docs_in_private_items
)]
mod riak {
    include!(concat!(env!("OUT_DIR"), "/riak.rs"));
}

pub use self::riak::*;

/// The one-byte code that precedes every message on the wire.
///
/// Each command sends exactly one request code and expects exactly one response code. A reply of
/// [`MessageCode::ErrorResp`] may arrive in place of any expected response.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageCode {
    #[allow(missing_docs)]
    ErrorResp = 0,
    #[allow(missing_docs)]
    GetReq = 9,
    #[allow(missing_docs)]
    GetResp = 10,
    #[allow(missing_docs)]
    PutReq = 11,
    #[allow(missing_docs)]
    PutResp = 12,
    #[allow(missing_docs)]
    DelReq = 13,
    #[allow(missing_docs)]
    DelResp = 14,
    #[allow(missing_docs)]
    DtFetchReq = 80,
    #[allow(missing_docs)]
    DtFetchResp = 81,
    #[allow(missing_docs)]
    DtUpdateReq = 82,
    #[allow(missing_docs)]
    DtUpdateResp = 83,
}

impl MessageCode {
    /// The code as sent on the wire.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<MessageCode> for u8 {
    #[inline]
    fn from(code: MessageCode) -> Self {
        code.as_u8()
    }
}

impl PartialEq<u8> for MessageCode {
    #[inline]
    fn eq(&self, other: &u8) -> bool {
        self.as_u8() == *other
    }
}
