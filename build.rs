fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the vendored compiler so that building does not depend on a system `protoc`.
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    tonic_build::configure()
        .build_server(false)
        .build_client(false)
        .compile_protos(
            &[
                "proto/riak.proto",
                "proto/riak_kv.proto",
                "proto/riak_dt.proto",
            ],
            &["proto"],
        )
        .unwrap_or_else(|e| panic!("Failed to compile protos {:?}", e));
    Ok(())
}
