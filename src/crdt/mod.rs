//! Conflict-free replicated data types: counters, sets, and maps.
//!
//! Each data type has a fetch command and an update command. Fetches require a key. Updates do
//! not: with an empty key, the store generates one and returns it as the response's
//! `generated_key`.

mod counter;
mod map;
mod map_operation;
mod set;

pub use self::counter::{
    FetchCounter, FetchCounterBuilder, FetchCounterResponse, UpdateCounter, UpdateCounterBuilder,
    UpdateCounterOptions, UpdateCounterResponse,
};
pub use self::map::{
    FetchMap, FetchMapBuilder, FetchMapResponse, Map, UpdateMap, UpdateMapBuilder,
    UpdateMapOptions, UpdateMapResponse,
};
pub use self::map_operation::{FieldUpdate, MapField, MapFieldKind, MapOperation, SetOperation};
pub use self::set::{
    FetchSet, FetchSetBuilder, FetchSetResponse, UpdateSet, UpdateSetBuilder, UpdateSetOptions,
    UpdateSetResponse,
};

use crate::options::{opaque, quorum, require_bucket, require_key, timeout_millis, token, utf8};
use crate::proto::dt_fetch_resp::DataType;
use crate::proto::{DtFetchReq, DtFetchResp, DtOp, DtUpdateReq, DtValue};
use crate::tracing_shim::debug;
use crate::{Error, Location, Result, ValidationError};
use std::time::Duration;

/// Options shared by every data type fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// The data type to fetch. The key is required.
    pub location: Location,
    /// Read quorum. Zero leaves it to the bucket's default.
    pub r: u32,
    /// Primary read quorum. Zero leaves it to the bucket's default.
    pub pr: u32,
    /// Whether to return early once a quorum of replicas has answered "not found".
    pub basic_quorum: bool,
    /// Whether a replica's "not found" counts toward the read quorum.
    pub not_found_ok: bool,
    /// Whether fallback replicas may take part in the read.
    pub sloppy_quorum: bool,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
}

/// Options for [`FetchCounter`].
pub type FetchCounterOptions = FetchOptions;
/// Options for [`FetchSet`].
pub type FetchSetOptions = FetchOptions;
/// Options for [`FetchMap`].
pub type FetchMapOptions = FetchOptions;

impl FetchOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        require_bucket(&self.location)?;
        require_key(&self.location)
    }

    fn to_request(&self) -> DtFetchReq {
        DtFetchReq {
            bucket: self.location.bucket.as_bytes().to_vec(),
            key: self.location.key.as_bytes().to_vec(),
            r#type: self.location.bucket_type.as_bytes().to_vec(),
            r: quorum(self.r),
            pr: quorum(self.pr),
            basic_quorum: Some(self.basic_quorum),
            notfound_ok: Some(self.not_found_ok),
            timeout: timeout_millis(self.timeout),
            sloppy_quorum: Some(self.sloppy_quorum),
            n_val: quorum(self.n_val),
            include_context: None,
        }
    }
}

/// Write tunables shared by every data type update.
#[derive(Debug, Clone, Copy)]
struct WriteQuorum {
    w: u32,
    pw: u32,
    dw: u32,
    n_val: u32,
    return_body: bool,
    sloppy_quorum: bool,
    timeout: Duration,
}

/// An update request. With an empty key, the store generates one.
fn update_request(
    location: &Location,
    context: &[u8],
    op: DtOp,
    write: WriteQuorum,
) -> DtUpdateReq {
    DtUpdateReq {
        bucket: location.bucket.as_bytes().to_vec(),
        key: opaque(location.key.as_bytes()),
        r#type: location.bucket_type.as_bytes().to_vec(),
        context: opaque(context),
        op,
        w: quorum(write.w),
        dw: quorum(write.dw),
        pw: quorum(write.pw),
        return_body: Some(write.return_body),
        timeout: timeout_millis(write.timeout),
        sloppy_quorum: Some(write.sloppy_quorum),
        n_val: quorum(write.n_val),
        include_context: None,
    }
}

/// The data type whose section of a fetched value is populated, if any is.
fn populated_type(value: &DtValue) -> Option<DataType> {
    if value.counter_value.is_some() {
        Some(DataType::Counter)
    } else if !value.set_value.is_empty() {
        Some(DataType::Set)
    } else if !value.map_value.is_empty() {
        Some(DataType::Map)
    } else {
        None
    }
}

/// Reject a fetched value that holds a different data type than the command's.
fn check_data_type(command: &'static str, expected: DataType, value: &DtValue) -> Result<()> {
    match populated_type(value) {
        Some(actual) if actual != expected => Err(Error::DataTypeMismatch {
            command,
            expected: expected.as_str_name(),
            actual: actual.as_str_name().to_owned(),
        }),
        _ => Ok(()),
    }
}

/// The causal context and value of a fetch reply. A reply without a value, or without a body at
/// all, means the data type was not found.
///
/// The reply's declared `type` is not consulted: when it is absent on the wire it decodes as
/// `COUNTER`. Only the populated section of the value is checked against `expected`.
fn fetched(
    command: &'static str,
    expected: DataType,
    message: Option<DtFetchResp>,
) -> Result<(Vec<u8>, Option<DtValue>)> {
    let Some(message) = message else {
        return Ok((Vec::new(), None));
    };
    if let Some(value) = &message.value {
        check_data_type(command, expected, value)?;
    }
    Ok((token(message.context), message.value))
}

/// The key in an update reply, which the store only sends when it generated one.
fn generated_key(command: &'static str, key: Option<Vec<u8>>) -> Result<String> {
    let key = utf8(command, "generated key", token(key))?;
    if !key.is_empty() {
        debug!(command, key = %key, "store generated a key");
    }
    Ok(key)
}

/// Setters for the builder of a command whose options are [`FetchOptions`].
macro_rules! fetch_setters {
    ($builder:ident) => {
        $crate::internal_macros::location_setters!($builder);
        $crate::internal_macros::option_setters!($builder {
            /// Set the read quorum.
            fn with_r(r: u32);
            /// Set the primary read quorum.
            fn with_pr(pr: u32);
            /// Return early once a quorum of replicas has answered "not found".
            fn with_basic_quorum(basic_quorum: bool);
            /// Count a replica's "not found" toward the read quorum.
            fn with_not_found_ok(not_found_ok: bool);
            /// Allow fallback replicas to take part in the read.
            fn with_sloppy_quorum(sloppy_quorum: bool);
            /// Set the number of replicas.
            fn with_n_val(n_val: u32);
            /// Set the server-side timeout.
            fn with_timeout(timeout: ::std::time::Duration);
        });
    };
}

/// Setters for the write tunables every update command's options carry.
macro_rules! update_setters {
    ($builder:ident) => {
        $crate::internal_macros::location_setters!($builder);
        $crate::internal_macros::option_setters!($builder {
            /// Set the write quorum.
            fn with_w(w: u32);
            /// Set the primary write quorum.
            fn with_pw(pw: u32);
            /// Set the durable write quorum.
            fn with_dw(dw: u32);
            /// Set the number of replicas.
            fn with_n_val(n_val: u32);
            /// Return the value after the update.
            fn with_return_body(return_body: bool);
            /// Allow fallback replicas to take part in the write.
            fn with_sloppy_quorum(sloppy_quorum: bool);
            /// Set the server-side timeout.
            fn with_timeout(timeout: ::std::time::Duration);
        });
    };
}

/// The [`WriteQuorum`] of an update command's options.
macro_rules! write_quorum {
    ($options:expr) => {
        $crate::crdt::WriteQuorum {
            w: $options.w,
            pw: $options.pw,
            dw: $options.dw,
            n_val: $options.n_val,
            return_body: $options.return_body,
            sloppy_quorum: $options.sloppy_quorum,
            timeout: $options.timeout,
        }
    };
}

use {fetch_setters, update_setters, write_quorum};
