use super::Object;
use crate::command::Command;
use crate::internal_macros::{location_setters, option_setters};
use crate::options::{
    non_empty, opaque, quorum, require_bucket, require_options, timeout_millis, token, utf8,
};
use crate::proto::{MessageCode, RpbPutReq, RpbPutResp};
use crate::tracing_shim::debug;
use crate::{Location, Result, ValidationError};
use std::time::Duration;

/// Options for [`StoreValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreValueOptions {
    /// Where to store the object. With an empty key, the store generates one.
    pub location: Location,
    /// The value and metadata to store.
    pub object: Object,
    /// The vclock of the value being replaced. When empty, the object's own vclock is used.
    pub vclock: Vec<u8>,
    /// Write quorum. Zero leaves it to the bucket's default.
    pub w: u32,
    /// Primary write quorum. Zero leaves it to the bucket's default.
    pub pw: u32,
    /// Durable write quorum. Zero leaves it to the bucket's default.
    pub dw: u32,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
    /// Return the stored value and its siblings.
    pub return_body: bool,
    /// Return the stored metadata without the value.
    pub return_head: bool,
    /// Only store if the current vclock matches `vclock`.
    pub if_not_modified: bool,
    /// Only store if the key does not exist yet.
    pub if_none_match: bool,
    /// Whether fallback replicas may take part in the write.
    pub sloppy_quorum: bool,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
}

/// The outcome of [`StoreValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreValueResponse {
    /// The key the store generated, if the request had none.
    pub generated_key: String,
    /// The new causal version token, if the body or head was returned.
    pub vclock: Vec<u8>,
    /// The stored value and its siblings, if the body or head was returned.
    pub values: Vec<Object>,
}

/// Store a plain value.
#[derive(Debug, Clone)]
pub struct StoreValue {
    options: StoreValueOptions,
    response: Option<StoreValueResponse>,
}

impl StoreValue {
    /// Validate the options and create the command.
    pub fn new(options: Option<StoreValueOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        require_bucket(&options.location)?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &StoreValueOptions {
        &self.options
    }
}

impl Command for StoreValue {
    const NAME: &'static str = "StoreValue";
    const REQUEST_CODE: MessageCode = MessageCode::PutReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::PutResp;

    type Request = RpbPutReq;
    type ResponseMessage = RpbPutResp;
    type Response = StoreValueResponse;

    fn construct_request(&self) -> Result<RpbPutReq> {
        let options = &self.options;
        let vclock = if options.vclock.is_empty() {
            &options.object.vclock
        } else {
            &options.vclock
        };

        Ok(RpbPutReq {
            r#type: non_empty(&options.location.bucket_type),
            bucket: options.location.bucket.as_bytes().to_vec(),
            key: non_empty(&options.location.key),
            vclock: opaque(vclock),
            content: options.object.to_content(),
            w: quorum(options.w),
            dw: quorum(options.dw),
            return_body: Some(options.return_body),
            pw: quorum(options.pw),
            if_not_modified: Some(options.if_not_modified),
            if_none_match: Some(options.if_none_match),
            return_head: Some(options.return_head),
            timeout: timeout_millis(options.timeout),
            asis: None,
            sloppy_quorum: Some(options.sloppy_quorum),
            n_val: quorum(options.n_val),
        })
    }

    fn decode_response(&mut self, message: Option<RpbPutResp>) -> Result<()> {
        let message = message.unwrap_or_default();

        let generated_key = utf8(Self::NAME, "key", token(message.key))?;
        let mut location = self.options.location.clone();
        if !generated_key.is_empty() {
            debug!(command = Self::NAME, key = %generated_key, "store generated a key");
            location.key.clone_from(&generated_key);
        }

        let vclock = token(message.vclock);
        let values = message
            .content
            .into_iter()
            .map(|content| {
                Object::from_content(Self::NAME, content, location.clone(), vclock.clone())
            })
            .collect::<Result<_>>()?;

        self.response = Some(StoreValueResponse {
            generated_key,
            vclock,
            values,
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&StoreValueResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<StoreValueResponse> {
        self.response
    }
}

/// Builds a [`StoreValue`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct StoreValueBuilder {
    options: StoreValueOptions,
}

impl StoreValueBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<StoreValue, ValidationError> {
        StoreValue::new(Some(self.options.clone()))
    }
}

location_setters!(StoreValueBuilder);
option_setters!(StoreValueBuilder {
    /// Set the value and metadata to store.
    fn with_object(object: Object);
    /// Set the vclock of the value being replaced.
    fn with_vclock(vclock: Vec<u8>);
    /// Set the write quorum.
    fn with_w(w: u32);
    /// Set the primary write quorum.
    fn with_pw(pw: u32);
    /// Set the durable write quorum.
    fn with_dw(dw: u32);
    /// Set the number of replicas.
    fn with_n_val(n_val: u32);
    /// Return the stored value and its siblings.
    fn with_return_body(return_body: bool);
    /// Return the stored metadata without the value.
    fn with_return_head(return_head: bool);
    /// Only store if the current vclock matches.
    fn with_if_not_modified(if_not_modified: bool);
    /// Only store if the key does not exist yet.
    fn with_if_none_match(if_none_match: bool);
    /// Allow fallback replicas to take part in the write.
    fn with_sloppy_quorum(sloppy_quorum: bool);
    /// Set the server-side timeout.
    fn with_timeout(timeout: Duration);
});

#[cfg(test)]
mod test {
    use super::*;
    use crate::proto::RpbContent;

    #[test]
    fn test_construct_request() -> Result<()> {
        let command = StoreValueBuilder::new()
            .with_bucket_type("bucket_type")
            .with_bucket("bucket")
            .with_key("key")
            .with_object(Object::new("value").with_content_type("text/plain"))
            .with_vclock(b"vclock".to_vec())
            .with_w(3)
            .with_pw(1)
            .with_dw(2)
            .with_n_val(5)
            .with_return_body(true)
            .with_if_none_match(true)
            .with_timeout(Duration::from_millis(1_500))
            .build()?;
        let request = command.construct_request()?;

        assert_eq!(request.r#type.as_deref(), Some(&b"bucket_type"[..]));
        assert_eq!(request.bucket, b"bucket");
        assert_eq!(request.key.as_deref(), Some(&b"key"[..]));
        assert_eq!(request.vclock.as_deref(), Some(&b"vclock"[..]));
        assert_eq!(request.w, Some(3));
        assert_eq!(request.pw, Some(1));
        assert_eq!(request.dw, Some(2));
        assert_eq!(request.n_val, Some(5));
        assert_eq!(request.return_body, Some(true));
        assert_eq!(request.if_none_match, Some(true));
        assert_eq!(request.timeout, Some(1_500));

        let content = request.content;
        assert_eq!(content.value, b"value");
        assert_eq!(content.content_type.as_deref(), Some(&b"text/plain"[..]));
        Ok(())
    }

    #[test]
    fn test_key_is_not_required() -> Result<()> {
        assert_eq!(
            StoreValueBuilder::new().build().err(),
            Some(ValidationError::BucketRequired)
        );

        let command = StoreValueBuilder::new().with_bucket("bucket").build()?;
        assert_eq!(command.construct_request()?.key, None);
        Ok(())
    }

    #[test]
    fn test_decode_empty_reply() -> Result<()> {
        let mut command = StoreValueBuilder::new().with_bucket("bucket").build()?;
        command.decode_response(None)?;
        assert_eq!(command.response(), Some(&StoreValueResponse::default()));
        Ok(())
    }

    #[test]
    fn test_decode_generated_key() -> Result<()> {
        let mut command = StoreValueBuilder::new()
            .with_bucket("bucket")
            .with_return_body(true)
            .build()?;
        command.decode_response(Some(RpbPutResp {
            content: vec![RpbContent {
                value: b"value".to_vec(),
                ..RpbContent::default()
            }],
            vclock: Some(b"vclock".to_vec()),
            key: Some(b"generated_key".to_vec()),
        }))?;

        let response = command.response().expect("decoded");
        assert_eq!(response.generated_key, "generated_key");
        assert_eq!(response.vclock, b"vclock");
        assert_eq!(response.values[0].location.key, "generated_key");
        assert_eq!(response.values[0].vclock, b"vclock");
        Ok(())
    }
}
