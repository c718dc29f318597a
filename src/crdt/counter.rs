use super::{
    fetch_setters, fetched, generated_key, update_request, update_setters, write_quorum,
    FetchCounterOptions,
};
use crate::command::Command;
use crate::internal_macros::option_setters;
use crate::options::require_bucket;
use crate::options::require_options;
use crate::proto::dt_fetch_resp::DataType;
use crate::proto::{CounterOp, DtFetchReq, DtFetchResp, DtOp, DtUpdateReq, DtUpdateResp, MessageCode};
use crate::tracing_shim::debug;
use crate::{Location, Result, ValidationError};
use std::time::Duration;

/// The outcome of [`FetchCounter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCounterResponse {
    /// The counter does not exist. The value is zero.
    pub is_not_found: bool,
    #[allow(missing_docs)]
    pub counter_value: i64,
}

/// Fetch a counter.
#[derive(Debug, Clone)]
pub struct FetchCounter {
    options: FetchCounterOptions,
    response: Option<FetchCounterResponse>,
}

impl FetchCounter {
    /// Validate the options and create the command.
    pub fn new(options: Option<FetchCounterOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        options.validate()?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &FetchCounterOptions {
        &self.options
    }
}

impl Command for FetchCounter {
    const NAME: &'static str = "FetchCounter";
    const REQUEST_CODE: MessageCode = MessageCode::DtFetchReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DtFetchResp;

    type Request = DtFetchReq;
    type ResponseMessage = DtFetchResp;
    type Response = FetchCounterResponse;

    #[inline]
    fn construct_request(&self) -> Result<DtFetchReq> {
        Ok(self.options.to_request())
    }

    fn decode_response(&mut self, message: Option<DtFetchResp>) -> Result<()> {
        let (_, value) = fetched(Self::NAME, DataType::Counter, message)?;
        if value.is_none() {
            debug!(command = Self::NAME, key = %self.options.location.key, "not found");
        }
        self.response = Some(FetchCounterResponse {
            is_not_found: value.is_none(),
            counter_value: value.and_then(|value| value.counter_value).unwrap_or_default(),
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&FetchCounterResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<FetchCounterResponse> {
        self.response
    }
}

/// Builds a [`FetchCounter`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct FetchCounterBuilder {
    options: FetchCounterOptions,
}

impl FetchCounterBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<FetchCounter, ValidationError> {
        FetchCounter::new(Some(self.options.clone()))
    }
}

fetch_setters!(FetchCounterBuilder);

/// Options for [`UpdateCounter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCounterOptions {
    /// The counter to update. With an empty key, the store generates one.
    pub location: Location,
    /// The amount to add. May be negative.
    pub increment: i64,
    /// Write quorum. Zero leaves it to the bucket's default.
    pub w: u32,
    /// Primary write quorum. Zero leaves it to the bucket's default.
    pub pw: u32,
    /// Durable write quorum. Zero leaves it to the bucket's default.
    pub dw: u32,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
    /// Return the counter's value after the update.
    pub return_body: bool,
    /// Whether fallback replicas may take part in the write.
    pub sloppy_quorum: bool,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
}

/// The outcome of [`UpdateCounter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCounterResponse {
    /// The key the store generated, if the request had none.
    pub generated_key: String,
    /// The value after the update, if it was requested.
    pub counter_value: i64,
}

/// Increment (or decrement) a counter.
#[derive(Debug, Clone)]
pub struct UpdateCounter {
    options: UpdateCounterOptions,
    response: Option<UpdateCounterResponse>,
}

impl UpdateCounter {
    /// Validate the options and create the command.
    pub fn new(options: Option<UpdateCounterOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        require_bucket(&options.location)?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &UpdateCounterOptions {
        &self.options
    }
}

impl Command for UpdateCounter {
    const NAME: &'static str = "UpdateCounter";
    const REQUEST_CODE: MessageCode = MessageCode::DtUpdateReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DtUpdateResp;

    type Request = DtUpdateReq;
    type ResponseMessage = DtUpdateResp;
    type Response = UpdateCounterResponse;

    fn construct_request(&self) -> Result<DtUpdateReq> {
        let op = DtOp {
            counter_op: Some(CounterOp {
                increment: Some(self.options.increment),
            }),
            ..DtOp::default()
        };
        Ok(update_request(
            &self.options.location,
            &[],
            op,
            write_quorum!(self.options),
        ))
    }

    fn decode_response(&mut self, message: Option<DtUpdateResp>) -> Result<()> {
        let message = message.unwrap_or_default();
        self.response = Some(UpdateCounterResponse {
            generated_key: generated_key(Self::NAME, message.key)?,
            counter_value: message.counter_value.unwrap_or_default(),
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&UpdateCounterResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<UpdateCounterResponse> {
        self.response
    }
}

/// Builds an [`UpdateCounter`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct UpdateCounterBuilder {
    options: UpdateCounterOptions,
}

impl UpdateCounterBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<UpdateCounter, ValidationError> {
        UpdateCounter::new(Some(self.options.clone()))
    }
}

update_setters!(UpdateCounterBuilder);
option_setters!(UpdateCounterBuilder {
    /// Set the amount to add. May be negative.
    fn with_increment(increment: i64);
});
