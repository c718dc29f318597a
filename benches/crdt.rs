use crate::criterion_config;
use criterion::measurement::Measurement;
use criterion::{criterion_group, BatchSize, Criterion};
use kvdt::crdt::{FetchMapBuilder, MapOperation, UpdateMapBuilder};
use kvdt::proto::dt_fetch_resp::DataType;
use kvdt::proto::map_field::MapFieldType;
use kvdt::proto::{DtFetchResp, DtValue, MapEntry, MapField};
use kvdt::Command as _;
use prost::Message as _;

fn map_operation(fields: usize, depth: usize) -> MapOperation {
    let mut operation = MapOperation::new();
    for i in 0..fields {
        operation
            .increment_counter(&format!("counter_{i}"), 1)
            .add_to_set(&format!("set_{i}"), "value")
            .set_register(&format!("register_{i}"), "value")
            .set_flag(&format!("flag_{i}"), true);
    }
    if depth > 0 {
        *operation.map("nested") = map_operation(fields, depth - 1);
    }
    operation
}

fn map_entries(fields: usize, depth: usize) -> Vec<MapEntry> {
    let entry = |name: String, kind: MapFieldType| MapEntry {
        field: MapField {
            name: name.into_bytes(),
            r#type: kind as i32,
        },
        ..MapEntry::default()
    };
    let mut entries = Vec::with_capacity(fields * 2 + 1);
    for i in 0..fields {
        entries.push(MapEntry {
            counter_value: Some(i as i64),
            ..entry(format!("counter_{i}"), MapFieldType::Counter)
        });
        entries.push(MapEntry {
            set_value: vec![b"a".to_vec(), b"b".to_vec()],
            ..entry(format!("set_{i}"), MapFieldType::Set)
        });
    }
    if depth > 0 {
        entries.push(MapEntry {
            map_value: map_entries(fields, depth - 1),
            ..entry("nested".to_owned(), MapFieldType::Map)
        });
    }
    entries
}

fn update_map_request(c: &mut Criterion<impl Measurement>) {
    let command = UpdateMapBuilder::new()
        .with_bucket_type("maps")
        .with_bucket("bucket")
        .with_key("key")
        .with_map_operation(map_operation(25, 3))
        .build()
        .unwrap();

    c.bench_function("crdt_update_map_request", |b| {
        b.iter(|| command.request_descriptor().unwrap());
    });
}

fn fetch_map_decode(c: &mut Criterion<impl Measurement>) {
    let command = FetchMapBuilder::new()
        .with_bucket_type("maps")
        .with_bucket("bucket")
        .with_key("key")
        .build()
        .unwrap();
    let payload = DtFetchResp {
        context: Some(b"context".to_vec()),
        r#type: DataType::Map as i32,
        value: Some(DtValue {
            map_value: map_entries(25, 3),
            ..DtValue::default()
        }),
    }
    .encode_to_vec();

    c.bench_function("crdt_fetch_map_decode", |b| {
        b.iter_batched(
            || command.clone(),
            |mut command| command.decode_payload(&payload).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    name = crdt;
    config = criterion_config();
    targets = update_map_request, fetch_map_decode
);
