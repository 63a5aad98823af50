//! Server-side components of the person gRPC service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI and environment configuration.
//! - [`store`] - SQLite-backed `person` table and its operations.
//! - [`service`] - gRPC service implementation.
//! - [`telemetry`] - Logging and optional OpenTelemetry export.
//!
//! [`serve_with_incoming`] wires the service, health and reflection endpoints
//! into a tonic server; it is shared by the binary and the integration tests.

pub mod config;
pub mod service;
pub mod store;
pub mod telemetry;

use core::future::Future;
use futures::Stream;
use person_tonic_core::proto::{FILE_DESCRIPTOR_SET, person_service_server::PersonServiceServer};
use service::handler::PersonHandler;
use tokio::io::{AsyncRead, AsyncWrite};
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Serves `PersonService`, gRPC health and reflection on `incoming` until
/// `signal` resolves, then shuts down gracefully.
///
/// Shutdown order: health flips to `NOT_SERVING` and the handler refuses new
/// requests, tonic drains in-flight calls, and finally the store pool is
/// closed.
pub async fn serve_with_incoming<I, IO, IE, F>(
    service: PersonHandler,
    incoming: I,
    signal: F,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
    F: Future<Output = ()>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<PersonServiceServer<PersonHandler>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let shutdown = {
        let service = service.clone();
        async move {
            signal.await;
            info!("Shutdown signal received, terminating gracefully...");

            // 1. Publish the status
            health_reporter
                .set_not_serving::<PersonServiceServer<PersonHandler>>()
                .await;

            // 2. Refuse new work; tonic drains what is in flight
            service.refuse_new_requests();
        }
    };

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_person_service(service.clone()))
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await?;

    // 3. Release the database
    service.shutdown().await;

    info!("Service shut down successfully");
    Ok(())
}

fn build_person_service(service: PersonHandler) -> PersonServiceServer<PersonHandler> {
    PersonServiceServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}
