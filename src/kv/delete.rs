use crate::command::Command;
use crate::internal_macros::{location_setters, option_setters};
use crate::options::{
    non_empty, opaque, quorum, require_bucket, require_key, require_options, timeout_millis,
};
use crate::proto::{MessageCode, RpbDelReq};
use crate::{Location, Result, ValidationError};
use std::time::Duration;

/// Options for [`DeleteValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteValueOptions {
    /// The object to delete. The key is required.
    pub location: Location,
    /// The vclock of the value being deleted, from a prior fetch.
    pub vclock: Vec<u8>,
    /// Quorum for both the read and the write. Zero leaves it to the bucket's default.
    pub rw: u32,
    /// Read quorum. Zero leaves it to the bucket's default.
    pub r: u32,
    /// Write quorum. Zero leaves it to the bucket's default.
    pub w: u32,
    /// Primary read quorum. Zero leaves it to the bucket's default.
    pub pr: u32,
    /// Primary write quorum. Zero leaves it to the bucket's default.
    pub pw: u32,
    /// Durable write quorum. Zero leaves it to the bucket's default.
    pub dw: u32,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
    /// Whether fallback replicas may take part in the delete.
    pub sloppy_quorum: bool,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
}

/// Delete a plain value, leaving a tombstone.
///
/// The reply has no body. The response is `true` once the store acknowledged the delete.
#[derive(Debug, Clone)]
pub struct DeleteValue {
    options: DeleteValueOptions,
    response: Option<bool>,
}

impl DeleteValue {
    /// Validate the options and create the command.
    pub fn new(options: Option<DeleteValueOptions>) -> Result<Self, ValidationError> {
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
    pub const fn options(&self) -> &DeleteValueOptions {
        &self.options
    }
}

impl Command for DeleteValue {
    const NAME: &'static str = "DeleteValue";
    const REQUEST_CODE: MessageCode = MessageCode::DelReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DelResp;

    type Request = RpbDelReq;
    type ResponseMessage = ();
    type Response = bool;

    fn construct_request(&self) -> Result<RpbDelReq> {
        let options = &self.options;
        Ok(RpbDelReq {
            r#type: non_empty(&options.location.bucket_type),
            bucket: options.location.bucket.as_bytes().to_vec(),
            key: options.location.key.as_bytes().to_vec(),
            rw: quorum(options.rw),
            vclock: opaque(&options.vclock),
            r: quorum(options.r),
            w: quorum(options.w),
            pr: quorum(options.pr),
            pw: quorum(options.pw),
            dw: quorum(options.dw),
            timeout: timeout_millis(options.timeout),
            sloppy_quorum: Some(options.sloppy_quorum),
            n_val: quorum(options.n_val),
        })
    }

    #[inline]
    fn decode_response(&mut self, _: Option<()>) -> Result<()> {
        self.response = Some(true);
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&bool> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<bool> {
        self.response
    }
}

/// Builds a [`DeleteValue`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct DeleteValueBuilder {
    options: DeleteValueOptions,
}

impl DeleteValueBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<DeleteValue, ValidationError> {
        DeleteValue::new(Some(self.options.clone()))
    }
}

location_setters!(DeleteValueBuilder);
option_setters!(DeleteValueBuilder {
    /// Set the vclock of the value being deleted.
    fn with_vclock(vclock: Vec<u8>);
    /// Set the combined read/write quorum.
    fn with_rw(rw: u32);
    /// Set the read quorum.
    fn with_r(r: u32);
    /// Set the write quorum.
    fn with_w(w: u32);
    /// Set the primary read quorum.
    fn with_pr(pr: u32);
    /// Set the primary write quorum.
    fn with_pw(pw: u32);
    /// Set the durable write quorum.
    fn with_dw(dw: u32);
    /// Set the number of replicas.
    fn with_n_val(n_val: u32);
    /// Allow fallback replicas to take part in the delete.
    fn with_sloppy_quorum(sloppy_quorum: bool);
    /// Set the server-side timeout.
    fn with_timeout(timeout: Duration);
});
