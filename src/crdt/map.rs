use super::{
    fetch_setters, fetched, generated_key, update_request, update_setters, write_quorum,
    FetchMapOptions, MapOperation,
};
use crate::command::Command;
use crate::internal_macros::option_setters;
use crate::options::{require_bucket, require_options, token, utf8};
use crate::proto::dt_fetch_resp::DataType;
use crate::proto::map_field::MapFieldType;
use crate::proto::{
    DtFetchReq, DtFetchResp, DtOp, DtUpdateReq, DtUpdateResp, MapEntry, MessageCode,
};
use crate::tracing_shim::debug;
use crate::{Error, Location, Result, ValidationError};
use std::collections::BTreeMap;
use std::time::Duration;

/// The value of a map, with one collection per field kind.
///
/// Fields are identified by name and kind, so the same name may appear in several collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    #[allow(missing_docs)]
    pub counters: BTreeMap<String, i64>,
    #[allow(missing_docs)]
    pub sets: BTreeMap<String, Vec<Vec<u8>>>,
    #[allow(missing_docs)]
    pub registers: BTreeMap<String, Vec<u8>>,
    #[allow(missing_docs)]
    pub flags: BTreeMap<String, bool>,
    #[allow(missing_docs)]
    pub maps: BTreeMap<String, Map>,
}

impl Map {
    /// Whether the map has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
            && self.sets.is_empty()
            && self.registers.is_empty()
            && self.flags.is_empty()
            && self.maps.is_empty()
    }

    fn from_entries(command: &'static str, entries: Vec<MapEntry>) -> Result<Self> {
        let mut map = Self::default();
        for entry in entries {
            let field = entry.field;
            let name = utf8(command, "map field name", field.name)?;
            let kind = MapFieldType::try_from(field.r#type).map_err(|_| Error::DataTypeMismatch {
                command,
                expected: "map field type",
                actual: format!("unknown ({})", field.r#type),
            })?;

            match kind {
                MapFieldType::Counter => {
                    *map.counters.entry(name).or_default() = entry.counter_value.unwrap_or(0);
                }
                MapFieldType::Set => *map.sets.entry(name).or_default() = entry.set_value,
                MapFieldType::Register => {
                    *map.registers.entry(name).or_default() = token(entry.register_value);
                }
                MapFieldType::Flag => {
                    *map.flags.entry(name).or_default() = entry.flag_value.unwrap_or(false);
                }
                MapFieldType::Map => {
                    *map.maps.entry(name).or_default() =
                        Self::from_entries(command, entry.map_value)?;
                }
            }
        }
        Ok(map)
    }
}

/// The outcome of [`FetchMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchMapResponse {
    /// The map does not exist.
    pub is_not_found: bool,
    /// The causal context to send with a later update that removes fields.
    pub context: Vec<u8>,
    #[allow(missing_docs)]
    pub map: Map,
}

/// Fetch a map.
#[derive(Debug, Clone)]
pub struct FetchMap {
    options: FetchMapOptions,
    response: Option<FetchMapResponse>,
}

impl FetchMap {
    /// Validate the options and create the command.
    pub fn new(options: Option<FetchMapOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        options.validate()?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &FetchMapOptions {
        &self.options
    }
}

impl Command for FetchMap {
    const NAME: &'static str = "FetchMap";
    const REQUEST_CODE: MessageCode = MessageCode::DtFetchReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DtFetchResp;

    type Request = DtFetchReq;
    type ResponseMessage = DtFetchResp;
    type Response = FetchMapResponse;

    #[inline]
    fn construct_request(&self) -> Result<DtFetchReq> {
        Ok(self.options.to_request())
    }

    fn decode_response(&mut self, message: Option<DtFetchResp>) -> Result<()> {
        let (context, value) = fetched(Self::NAME, DataType::Map, message)?;
        if value.is_none() {
            debug!(command = Self::NAME, key = %self.options.location.key, "not found");
        }
        let response = match value {
            Some(value) => FetchMapResponse {
                is_not_found: false,
                context,
                map: Map::from_entries(Self::NAME, value.map_value)?,
            },
            None => FetchMapResponse {
                is_not_found: true,
                context,
                map: Map::default(),
            },
        };
        self.response = Some(response);
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&FetchMapResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<FetchMapResponse> {
        self.response
    }
}

/// Builds a [`FetchMap`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct FetchMapBuilder {
    options: FetchMapOptions,
}

impl FetchMapBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<FetchMap, ValidationError> {
        FetchMap::new(Some(self.options.clone()))
    }
}

fetch_setters!(FetchMapBuilder);

/// Options for [`UpdateMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMapOptions {
    /// The map to update. With an empty key, the store generates one.
    pub location: Location,
    /// The causal context from an earlier fetch. Required by the store to remove fields.
    pub context: Vec<u8>,
    /// The removals and updates to apply.
    pub map_operation: MapOperation,
    /// Write quorum. Zero leaves it to the bucket's default.
    pub w: u32,
    /// Primary write quorum. Zero leaves it to the bucket's default.
    pub pw: u32,
    /// Durable write quorum. Zero leaves it to the bucket's default.
    pub dw: u32,
    /// Number of replicas. Zero leaves it to the bucket's default.
    pub n_val: u32,
    /// Return the map after the update.
    pub return_body: bool,
    /// Whether fallback replicas may take part in the write.
    pub sloppy_quorum: bool,
    /// Server-side timeout. Zero leaves it to the store's default.
    pub timeout: Duration,
}

/// The outcome of [`UpdateMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMapResponse {
    /// The key the store generated, if the request had none.
    pub generated_key: String,
    /// The causal context after the update.
    pub context: Vec<u8>,
    /// The map after the update, if it was requested.
    pub map: Map,
}

/// Apply a [`MapOperation`] to a map.
#[derive(Debug, Clone)]
pub struct UpdateMap {
    options: UpdateMapOptions,
    response: Option<UpdateMapResponse>,
}

impl UpdateMap {
    /// Validate the options and create the command.
    pub fn new(options: Option<UpdateMapOptions>) -> Result<Self, ValidationError> {
        let options = require_options(options)?;
        require_bucket(&options.location)?;
        Ok(Self {
            options,
            response: None,
        })
    }

    /// The options the command was built with.
    #[inline]
    pub const fn options(&self) -> &UpdateMapOptions {
        &self.options
    }
}

impl Command for UpdateMap {
    const NAME: &'static str = "UpdateMap";
    const REQUEST_CODE: MessageCode = MessageCode::DtUpdateReq;
    const EXPECTED_RESPONSE_CODE: MessageCode = MessageCode::DtUpdateResp;

    type Request = DtUpdateReq;
    type ResponseMessage = DtUpdateResp;
    type Response = UpdateMapResponse;

    fn construct_request(&self) -> Result<DtUpdateReq> {
        let options = &self.options;
        let op = DtOp {
            map_op: Some(options.map_operation.encode()),
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
        self.response = Some(UpdateMapResponse {
            generated_key: generated_key(Self::NAME, message.key)?,
            context: token(message.context),
            map: Map::from_entries(Self::NAME, message.map_value)?,
        });
        Ok(())
    }

    #[inline]
    fn response(&self) -> Option<&UpdateMapResponse> {
        self.response.as_ref()
    }

    #[inline]
    fn into_response(self) -> Option<UpdateMapResponse> {
        self.response
    }
}

/// Builds an [`UpdateMap`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct UpdateMapBuilder {
    options: UpdateMapOptions,
}

impl UpdateMapBuilder {
    /// A builder for the default bucket type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and create the command. The builder can be reused afterwards.
    #[inline]
    pub fn build(&self) -> Result<UpdateMap, ValidationError> {
        UpdateMap::new(Some(self.options.clone()))
    }
}

update_setters!(UpdateMapBuilder);
option_setters!(UpdateMapBuilder {
    /// Set the causal context from an earlier fetch.
    fn with_context(context: Vec<u8>);
    /// Set the removals and updates to apply.
    fn with_map_operation(map_operation: MapOperation);
});

#[cfg(test)]
mod test {
    use super::*;
    use crate::proto::map_update::FlagOp;
    use crate::proto::{self, DtValue, MapOp, MapUpdate};

    fn field(name: &str, kind: MapFieldType) -> proto::MapField {
        proto::MapField {
            name: name.as_bytes().to_vec(),
            r#type: kind as i32,
        }
    }

    fn fill(operation: &mut MapOperation) {
        operation
            .increment_counter("counter_1", 50)
            .remove_counter("counter_2")
            .add_to_set("set_1", "set_value_1")
            .remove_from_set("set_2", "set_value_2")
            .remove_set("set_3")
            .set_register("register_1", "register_value_1")
            .remove_register("register_2")
            .set_flag("flag_1", true)
            .remove_flag("flag_2")
            .remove_map("map_3");
    }

    fn assert_removes(removes: &[proto::MapField]) {
        assert_eq!(
            removes,
            [
                field("counter_2", MapFieldType::Counter),
                field("set_3", MapFieldType::Set),
                field("register_2", MapFieldType::Register),
                field("flag_2", MapFieldType::Flag),
                field("map_3", MapFieldType::Map),
            ]
        );
    }

    /// Checks the fan-out of [`fill`] and returns the nested map update, if any.
    fn assert_updates(updates: &[MapUpdate]) -> Option<&MapOp> {
        let mut nested = None;
        for update in updates {
            let field = &update.field;
            match (field.name.as_slice(), field.r#type()) {
                (b"counter_1", MapFieldType::Counter) => {
                    assert_eq!(update.counter_op.as_ref().and_then(|op| op.increment), Some(50));
                }
                (b"set_1", MapFieldType::Set) => {
                    let set_op = update.set_op.as_ref().expect("set op");
                    assert_eq!(set_op.adds, [b"set_value_1".to_vec()]);
                    assert!(set_op.removes.is_empty());
                }
                (b"set_2", MapFieldType::Set) => {
                    let set_op = update.set_op.as_ref().expect("set op");
                    assert!(set_op.adds.is_empty());
                    assert_eq!(set_op.removes, [b"set_value_2".to_vec()]);
                }
                (b"register_1", MapFieldType::Register) => {
                    assert_eq!(update.register_op.as_deref(), Some(&b"register_value_1"[..]));
                }
                (b"flag_1", MapFieldType::Flag) => assert_eq!(update.flag_op(), FlagOp::Enable),
                (b"map_2", MapFieldType::Map) => {
                    nested = update.map_op.as_ref();
                }
                (name, kind) => {
                    panic!("unexpected update {} {kind:?}", String::from_utf8_lossy(name))
                }
            }
        }
        nested
    }

    #[test]
    fn test_update_construct_request() -> Result<()> {
        let mut operation = MapOperation::new();
        fill(&mut operation);
        fill(operation.map("map_2"));

        let command = UpdateMapBuilder::new()
            .with_bucket_type("maps")
            .with_bucket("bucket")
            .with_key("key")
            .with_context(b"context".to_vec())
            .with_map_operation(operation)
            .with_w(3)
            .with_pw(1)
            .with_dw(2)
            .with_return_body(true)
            .with_timeout(Duration::from_secs(20))
            .build()?;
        let request = command.construct_request()?;

        assert_eq!(request.r#type, b"maps");
        assert_eq!(request.bucket, b"bucket");
        assert_eq!(request.key.as_deref(), Some(&b"key"[..]));
        assert_eq!(request.context.as_deref(), Some(&b"context"[..]));
        assert_eq!(request.timeout, Some(20_000));
        assert_eq!((request.w, request.pw, request.dw), (Some(3), Some(1), Some(2)));

        let map_op = request.op.map_op.expect("map op");
        assert_removes(&map_op.removes);
        assert_eq!(map_op.updates.len(), 6);

        let nested = assert_updates(&map_op.updates).expect("nested map update");
        assert_removes(&nested.removes);
        assert_eq!(nested.updates.len(), 5);
        assert!(assert_updates(&nested.updates).is_none());
        Ok(())
    }

    fn entry(name: &str, kind: MapFieldType) -> MapEntry {
        MapEntry {
            field: field(name, kind),
            ..MapEntry::default()
        }
    }

    fn entries() -> Vec<MapEntry> {
        vec![
            MapEntry {
                counter_value: Some(7),
                ..entry("counter_1", MapFieldType::Counter)
            },
            MapEntry {
                set_value: vec![b"v1".to_vec(), b"v2".to_vec()],
                ..entry("set_1", MapFieldType::Set)
            },
            MapEntry {
                register_value: Some(b"value".to_vec()),
                ..entry("register_1", MapFieldType::Register)
            },
            MapEntry {
                flag_value: Some(true),
                ..entry("flag_1", MapFieldType::Flag)
            },
            MapEntry {
                map_value: vec![MapEntry {
                    counter_value: Some(-1),
                    ..entry("counter_1", MapFieldType::Counter)
                }],
                ..entry("map_1", MapFieldType::Map)
            },
        ]
    }

    fn expected_map() -> Map {
        let inner = Map {
            counters: BTreeMap::from([("counter_1".to_owned(), -1)]),
            ..Map::default()
        };
        Map {
            counters: BTreeMap::from([("counter_1".to_owned(), 7)]),
            sets: BTreeMap::from([("set_1".to_owned(), vec![b"v1".to_vec(), b"v2".to_vec()])]),
            registers: BTreeMap::from([("register_1".to_owned(), b"value".to_vec())]),
            flags: BTreeMap::from([("flag_1".to_owned(), true)]),
            maps: BTreeMap::from([("map_1".to_owned(), inner)]),
        }
    }

    #[test]
    fn test_update_decode_response() -> Result<()> {
        let mut command = UpdateMapBuilder::new()
            .with_bucket_type("maps")
            .with_bucket("bucket")
            .with_key("key")
            .build()?;
        command.decode_response(Some(DtUpdateResp {
            key: Some(b"generated_key".to_vec()),
            context: Some(b"ctx".to_vec()),
            map_value: entries(),
            ..DtUpdateResp::default()
        }))?;

        let response = command.into_response().expect("decoded");
        assert_eq!(response.generated_key, "generated_key");
        assert_eq!(response.context, b"ctx");
        assert_eq!(response.map, expected_map());
        Ok(())
    }

    #[test]
    fn test_fetch_construct_request() -> Result<()> {
        let request = FetchMapBuilder::new()
            .with_bucket_type("maps")
            .with_bucket("bucket")
            .with_key("key")
            .with_r(3)
            .with_pr(1)
            .with_not_found_ok(true)
            .with_basic_quorum(true)
            .with_sloppy_quorum(true)
            .with_n_val(3)
            .with_timeout(Duration::from_secs(20))
            .build()?
            .construct_request()?;

        assert_eq!(request.r#type, b"maps");
        assert_eq!(request.bucket, b"bucket");
        assert_eq!(request.key, b"key");
        assert_eq!(request.r, Some(3));
        assert_eq!(request.pr, Some(1));
        assert_eq!(request.notfound_ok, Some(true));
        assert_eq!(request.basic_quorum, Some(true));
        assert_eq!(request.sloppy_quorum, Some(true));
        assert_eq!(request.n_val, Some(3));
        assert_eq!(request.timeout, Some(20_000));
        Ok(())
    }

    #[test]
    fn test_fetch_decode_response() -> Result<()> {
        let mut command = FetchMapBuilder::new()
            .with_bucket_type("maps")
            .with_bucket("bucket")
            .with_key("key")
            .build()?;
        command.decode_response(Some(DtFetchResp {
            context: Some(b"ctx".to_vec()),
            r#type: DataType::Map as i32,
            value: Some(DtValue {
                map_value: entries(),
                ..DtValue::default()
            }),
        }))?;

        let response = command.response().expect("decoded");
        assert!(!response.is_not_found);
        assert_eq!(response.context, b"ctx");
        assert_eq!(response.map, expected_map());
        Ok(())
    }

    #[test]
    fn test_fetch_decode_not_found() -> Result<()> {
        let mut command = FetchMapBuilder::new()
            .with_bucket("bucket")
            .with_key("key")
            .build()?;
        command.decode_response(Some(DtFetchResp {
            r#type: DataType::Map as i32,
            ..DtFetchResp::default()
        }))?;

        let response = command.response().expect("decoded");
        assert!(response.is_not_found);
        assert!(response.map.is_empty());
        Ok(())
    }

    #[test]
    fn test_fetch_decode_untyped_not_found() -> Result<()> {
        let mut command = FetchMapBuilder::new()
            .with_bucket("bucket")
            .with_key("key")
            .build()?;
        command.decode_response(Some(DtFetchResp::default()))?;

        let response = command.response().expect("decoded");
        assert!(response.is_not_found);
        assert!(response.map.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let mut unknown = entry("field", MapFieldType::Flag);
        unknown.field.r#type = 42;
        let result = Map::from_entries("Test", vec![unknown]);
        assert!(matches!(
            result,
            Err(Error::DataTypeMismatch {
                expected: "map field type",
                ..
            })
        ));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            UpdateMapBuilder::new().build().err(),
            Some(ValidationError::BucketRequired)
        );
        assert!(UpdateMapBuilder::new().with_bucket("bucket_name").build().is_ok());
        assert_eq!(
            FetchMapBuilder::new().with_bucket("bucket_name").build().err(),
            Some(ValidationError::KeyRequired)
        );
    }
}
