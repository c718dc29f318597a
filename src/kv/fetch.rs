use super::Object;
use crate::command::Command;
use crate::internal_macros::{location_setters, option_setters};
use crate::options::{
    non_empty, opaque, quorum, require_bucket, require_key, require_options, timeout_millis, token,
};
use crate::proto::{MessageCode, RpbGetReq, RpbGetResp};
use crate::tracing_shim::debug;
use crate::{Location, Result, ValidationError};
use std::time::Duration;

/// Options for [`FetchValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchValueOptions {
    /// The object to fetch. The key is required.
    pub location: Location,
    /// Read quorum. Zero leaves it to the bucket's default.
    pub r: u32,
    /// Primary read quorum. Zero leaves it to the bucket's default.
    pub pr: u32,
    /// Whether to return early once a quorum of replicas has answered "not found".
    pub basic_quorum: bool,
    /// Whether a replica's "not found" counts toward the read quorum.
    pub not_found_ok: bool,
    /// Only return the value if its vclock differs from this one.
    pub if_not_modified: Vec<u8>,
    /// Return metadata only, without the value.
    pub head_only: bool,
    /// Return the vclock of a deleted value.
    pub return_deleted_vclock: bool,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
    /// Whether fallback replicas may take part in the read.
    pub sloppy_quorum: bool,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
}

/// The outcome of [`FetchValue`].
///
/// Exactly one of `is_not_found` or a non-empty `values` holds. A key that was deleted yields a
/// single tombstone object rather than "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchValueResponse {
    /// The key has never held a value.
    pub is_not_found: bool,
    /// The value has not changed since the vclock given in `if_not_modified`.
    pub is_unchanged: bool,
    /// The causal version token of the values.
    pub vclock: Vec<u8>,
    /// The value, or each of its siblings.
    pub values: Vec<Object>,
}

/// Fetch a plain value.
#[derive(Debug, Clone)]
pub struct FetchValue {
    options: FetchValueOptions,
    response: Option<FetchValueResponse>,
}

impl FetchValue {
    /// Validate the options and create the command.
    pub fn new(options: Option<FetchValueOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        require_bucket(&options.location)?;
        require_key(&options.location)?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &FetchValueOptions {
        &self.options
    }
}

impl Command for FetchValue {
    const NAME: &'static str = "FetchValue";
    const REQUEST_CODE: MessageCode = MessageCode::GetReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::GetResp;

    type Request = RpbGetReq;
    type ResponseMessage = RpbGetResp;
    type Response = FetchValueResponse;

    fn construct_request(&self) -> Result<RpbGetReq> {
        let options = &self.options;
        Ok(RpbGetReq {
            r#type: non_empty(&options.location.bucket_type),
            bucket: options.location.bucket.as_bytes().to_vec(),
            key: options.location.key.as_bytes().to_vec(),
            r: quorum(options.r),
            pr: quorum(options.pr),
            basic_quorum: Some(options.basic_quorum),
            notfound_ok: Some(options.not_found_ok),
            if_modified: opaque(&options.if_not_modified),
            head: Some(options.head_only),
            deletedvclock: Some(options.return_deleted_vclock),
            timeout: timeout_millis(options.timeout),
            sloppy_quorum: Some(options.sloppy_quorum),
            n_val: quorum(options.n_val),
        })
    }

    fn decode_response(&mut self, message: Option<RpbGetResp>) -> Result<()> {
        let Some(message) = message else {
            debug!(command = Self::NAME, key = %self.options.location.key, "not found");
            self.response = Some(FetchValueResponse {
                is_not_found: true,
                ..FetchValueResponse::default()
            });
            return Ok(());
        };

        let vclock = token(message.vclock);
        let location = &self.options.location;
        let values = if message.unchanged == Some(true) {
            debug!(command = Self::NAME, key = %location.key, "unchanged");
            Vec::new()
        } else if message.content.is_empty() {
            debug!(command = Self::NAME, key = %location.key, "tombstone");
            vec![Object::tombstone(location.clone(), vclock.clone())]
        } else {
            message
                .content
                .into_iter()
                .map(|content| {
                    Object::from_content(Self::NAME, content, location.clone(), vclock.clone())
                })
                .collect::<Result<_>>()?
        };

        self.response = Some(FetchValueResponse {
            is_not_found: false,
            is_unchanged: message.unchanged.unwrap_or(false),
            vclock,
            values,
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&FetchValueResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<FetchValueResponse> {
        self.response
    }
}

/// Builds a [`FetchValue`].
#[must_use]
#[derive(Debug, Clone)]
pub struct FetchValueBuilder {
    options: FetchValueOptions,
}

impl FetchValueBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self {
            options: FetchValueOptions::default(),
        }
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<FetchValue, ValidationError> {
        FetchValue::new(Some(self.options.clone()))
    }
}

impl Default for FetchValueBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

location_setters!(FetchValueBuilder);
option_setters!(FetchValueBuilder {
    /// Set the read quorum.
    fn with_r(r: u32);
    /// Set the primary read quorum.
    fn with_pr(pr: u32);
    /// Return early once a quorum of replicas has answered "not found".
    fn with_basic_quorum(basic_quorum: bool);
    /// Count a replica's "not found" toward the read quorum.
    fn with_not_found_ok(not_found_ok: bool);
    /// Only return the value if its vclock differs from this one.
    fn with_if_not_modified(if_not_modified: Vec<u8>);
    /// Return metadata only.
    fn with_head_only(head_only: bool);
    /// Return the vclock of a deleted value.
    fn with_return_deleted_vclock(return_deleted_vclock: bool);
    /// Set the server-side timeout.
    fn with_timeout(timeout: Duration);
    /// Allow fallback replicas to take part in the read.
    fn with_sloppy_quorum(sloppy_quorum: bool);
    /// Set the number of replicas.
    fn with_n_val(n_val: u32);
});
