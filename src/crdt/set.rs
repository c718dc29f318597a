use super::{
    fetch_setters, fetched, generated_key, update_request, update_setters, write_quorum,
    FetchSetOptions, SetOperation,
};
use crate::command::Command;
use crate::internal_macros::option_setters;
use crate::options::{require_bucket, require_options, token};
use crate::proto::dt_fetch_resp::DataType;
use crate::proto::{DtFetchReq, DtFetchResp, DtOp, DtUpdateReq, DtUpdateResp, MessageCode};
use crate::tracing_shim::debug;
use crate::{Location, Result, ValidationError};
use std::time::Duration;

/// The outcome of [`FetchSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSetResponse {
    /// The set does not exist.
    pub is_not_found: bool,
    /// The causal context to send with a later update that removes members.
    pub context: Vec<u8>,
    /// The members, as the store returned them.
    pub set_value: Vec<Vec<u8>>,
}

/// Fetch a set.
#[derive(Debug, Clone)]
pub struct FetchSet {
    options: FetchSetOptions,
    response: Option<FetchSetResponse>,
}

impl FetchSet {
    /// Validate the options and create the command.
    pub fn new(options: Option<FetchSetOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        options.validate()?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &FetchSetOptions {
        &self.options
    }
}

impl Command for FetchSet {
    const NAME: &'static str = "FetchSet";
    const REQUEST_CODE: MessageCode = MessageCode::DtFetchReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DtFetchResp;

    type Request = DtFetchReq;
    type ResponseMessage = DtFetchResp;
    type Response = FetchSetResponse;

    #[inline]
    fn construct_request(&self) -> Result<DtFetchReq> {
        Ok(self.options.to_request())
    }

    fn decode_response(&mut self, message: Option<DtFetchResp>) -> Result<()> {
        let (context, value) = fetched(Self::NAME, DataType::Set, message)?;
        if value.is_none() {
            debug!(command = Self::NAME, key = %self.options.location.key, "not found");
        }
        self.response = Some(FetchSetResponse {
            is_not_found: value.is_none(),
            context,
            set_value: value.map(|value| value.set_value).unwrap_or_default(),
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&FetchSetResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<FetchSetResponse> {
        self.response
    }
}

/// Builds a [`FetchSet`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct FetchSetBuilder {
    options: FetchSetOptions,
}

impl FetchSetBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<FetchSet, ValidationError> {
        FetchSet::new(Some(self.options.clone()))
    }
}

fetch_setters!(FetchSetBuilder);

/// Options for [`UpdateSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSetOptions {
    /// The set to update. With an empty key, the store generates one.
    pub location: Location,
    /// The causal context from an earlier fetch. Required by the store to remove members.
    pub context: Vec<u8>,
    /// Members to add.
    pub additions: Vec<Vec<u8>>,
    /// Members to remove.
    pub removals: Vec<Vec<u8>>,
    /// Write quorum. Zero leaves it to the bucket's default.
    pub w: u32,
    /// Primary write quorum. Zero leaves it to the bucket's default.
    pub pw: u32,
    /// Durable write quorum. Zero leaves it to the bucket's default.
    pub dw: u32,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
    /// Return the set's members after the update.
    pub return_body: bool,
    /// Whether fallback replicas may take part in the write.
    pub sloppy_quorum: bool,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
}

/// The outcome of [`UpdateSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSetResponse {
    /// The key the store generated, if the request had none.
    pub generated_key: String,
    /// The causal context after the update.
    pub context: Vec<u8>,
    /// The members after the update, if they were requested.
    pub set_value: Vec<Vec<u8>>,
}

/// Add members to and remove members from a set.
#[derive(Debug, Clone)]
pub struct UpdateSet {
    options: UpdateSetOptions,
    response: Option<UpdateSetResponse>,
}

impl UpdateSet {
    /// Validate the options and create the command.
    pub fn new(options: Option<UpdateSetOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        require_bucket(&options.location)?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &UpdateSetOptions {
        &self.options
    }
}

impl Command for UpdateSet {
    const NAME: &'static str = "UpdateSet";
    const REQUEST_CODE: MessageCode = MessageCode::DtUpdateReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DtUpdateResp;

    type Request = DtUpdateReq;
    type ResponseMessage = DtUpdateResp;
    type Response = UpdateSetResponse;

    fn construct_request(&self) -> Result<DtUpdateReq> {
        let options = &self.options;
        let set_op = SetOperation {
            additions: options.additions.clone(),
            removals: options.removals.clone(),
        };
        let op = DtOp {
            set_op: Some(set_op.encode()),
            ..DtOp::default()
        };
        Ok(update_request(
            &options.location,
            &options.context,
            op,
            write_quorum!(options),
        ))
    }

    fn decode_response(&mut self, message: Option<DtUpdateResp>) -> Result<()> {
        let message = message.unwrap_or_default();
        self.response = Some(UpdateSetResponse {
            generated_key: generated_key(Self::NAME, message.key)?,
            context: token(message.context),
            set_value: message.set_value,
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&UpdateSetResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<UpdateSetResponse> {
        self.response
    }
}

/// Builds an [`UpdateSet`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct UpdateSetBuilder {
    options: UpdateSetOptions,
}

impl UpdateSetBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add members. Calls accumulate.
    #[inline]
    pub fn with_additions<I>(mut self, additions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        self.options.additions.extend(additions.into_iter().map(Into::into));
        self
    }

    /// Remove members. Calls accumulate.
    #[inline]
    pub fn with_removals<I>(mut self, removals: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        self.options.removals.extend(removals.into_iter().map(Into::into));
        self
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<UpdateSet, ValidationError> {
        UpdateSet::new(Some(self.options.clone()))
    }
}

update_setters!(UpdateSetBuilder);
option_setters!(UpdateSetBuilder {
    /// Set the causal context from an earlier fetch.
    fn with_context(context: Vec<u8>);
});
