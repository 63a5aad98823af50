#![doc = include_str!("../README.md")]

mod common;
pub use common::*;

/// gRPC service and message definitions generated from `proto/person.proto`.
///
/// ## Service
///
/// - `PersonService` - unary CRUD calls over the `Person` entity.
///
/// The `person` field of [`proto::PersonResponse`] is generated as
/// `Option<proto::Person>`: `None` is how "not found" travels over the wire.
pub mod proto {
    tonic::include_proto!("person");

    /// Encoded descriptor set, registered with the reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("person_descriptor");
}
