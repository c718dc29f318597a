use crate::{create_runtime, criterion_config, CannedReply};
use criterion::measurement::Measurement;
use criterion::{criterion_group, BatchSize, Criterion};
use kvdt::kv::{FetchValueBuilder, Object, StoreValueBuilder};
use kvdt::proto::{MessageCode, RpbContent, RpbGetResp};
use kvdt::{execute, Command as _, RawResponse};
use prost::Message as _;
use rand::distributions::{Alphanumeric, DistString};

fn siblings(count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    RpbGetResp {
        content: (0..count)
            .map(|_| RpbContent {
                value: Alphanumeric.sample_string(&mut rng, 64).into_bytes(),
                content_type: Some(b"text/plain".to_vec()),
                ..RpbContent::default()
            })
            .collect(),
        vclock: Some(Alphanumeric.sample_string(&mut rng, 32).into_bytes()),
        unchanged: None,
    }
    .encode_to_vec()
}

fn store_request(c: &mut Criterion<impl Measurement>) {
    let mut rng = rand::thread_rng();

    c.bench_function("kv_store_request", |b| {
        b.iter_batched(
            || {
                StoreValueBuilder::new()
                    .with_bucket("bucket")
                    .with_key(Alphanumeric.sample_string(&mut rng, 20))
                    .with_object(Object::new(Alphanumeric.sample_string(&mut rng, 20)))
                    .build()
                    .unwrap()
            },
            |command| command.request_descriptor().unwrap(),
            BatchSize::SmallInput,
        );
    });
}

fn fetch_decode(c: &mut Criterion<impl Measurement>) {
    let command = FetchValueBuilder::new()
        .with_bucket("bucket")
        .with_key("key")
        .build()
        .unwrap();

    for count in [1, 10] {
        let payload = siblings(count);
        c.bench_function(&format!("kv_fetch_decode_{count}_siblings"), |b| {
            b.iter_batched(
                || command.clone(),
                |mut command| command.decode_payload(&payload).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
}

fn fetch_execute(c: &mut Criterion<impl Measurement>) {
    let runtime = create_runtime();
    let executor = CannedReply(RawResponse::new(MessageCode::GetResp, siblings(3)));
    let builder = FetchValueBuilder::new().with_bucket("bucket").with_key("key");

    c.bench_function("kv_fetch_execute", |b| {
        b.to_async(&runtime).iter_batched(
            || builder.build().unwrap(),
            |mut command| {
                let executor = executor.clone();
                async move { execute(&executor, &mut command).await.unwrap() }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    name = kv;
    config = criterion_config();
    targets = store_request, fetch_decode, fetch_execute
);
