/// Builds the gRPC client and server code for the `person.proto` definition
/// using `tonic-prost-build`.
///
/// This code generation step processes the Protocol Buffer definitions located
/// in the `proto` directory and emits Rust modules with gRPC bindings into the
/// crate's `OUT_DIR`, along with an encoded file descriptor set used by the
/// server's reflection service.
///
/// # Files and Paths
///
/// - Proto file: `proto/person.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/person_descriptor.bin`
///
/// # Output
///
/// Generated code will be accessible in Rust via:
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("person");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("Missing OUT_DIR environment variable"));
    let descriptor_path = out_dir.join("person_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/person.proto");

    tonic_prost_build::configure()
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["proto/person.proto"], &["proto"])
}
