use core::{fmt, hint::black_box};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::stream::{FuturesUnordered, StreamExt};
use person_tonic_core::proto::{
    CreatePersonRequest, DeletePersonRequest, GetAllPeopleRequest, PersonByIdRequest,
    person_service_client::PersonServiceClient,
};
use person_tonic_server::server::{
    config::{StoreConfig, ValidationMode},
    serve_with_incoming,
    service::handler::PersonHandler,
    store::PersonStore,
};
use std::time::Instant;
use tokio::{net::TcpListener, runtime::Builder, sync::oneshot};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{
    codec::CompressionEncoding,
    transport::{Channel, Uri},
};

#[derive(Clone, Copy, Debug)]
enum Compression {
    None,
    Deflate,
    Gzip,
    Zstd,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Deflate => write!(f, "deflate"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

impl From<Compression> for Option<CompressionEncoding> {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => None,
            Compression::Deflate => Some(CompressionEncoding::Deflate),
            Compression::Gzip => Some(CompressionEncoding::Gzip),
            Compression::Zstd => Some(CompressionEncoding::Zstd),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct GrpcBenchParams {
    concurrency: usize,
    compression: Compression,
}

fn store_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let store = rt
        .block_on(PersonStore::open(&StoreConfig::in_memory()))
        .expect("open store");

    let store = &store;

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("find_by_id", |b| {
        b.to_async(&rt)
            .iter(|| async move { black_box(store.find_by_id(3).await.unwrap()) });
    });

    group.bench_function("list_all", |b| {
        b.to_async(&rt)
            .iter(|| async move { black_box(store.list_all().await.unwrap()) });
    });

    group.bench_function("create_delete", |b| {
        b.to_async(&rt).iter(|| async move {
            let person = store.create("Bench").await.unwrap();
            black_box(store.delete(person.id).await.unwrap())
        });
    });

    group.finish();
}

fn grpc_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();

    // Serve in-process on an ephemeral port.
    let (uri, stop) = rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let store = PersonStore::open(&StoreConfig::in_memory())
            .await
            .expect("open store");
        let service = PersonHandler::new(store, ValidationMode::Lenient);
        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(serve_with_incoming(
            service,
            TcpListenerStream::new(listener),
            async move {
                let _ = stopped.await;
            },
        ));
        let uri = Uri::try_from(format!("http://{addr}")).expect("Invalid URI");
        (uri, stop)
    });

    let concurrency_cases = [1, 4, 16, 64];
    let compression_cases = [
        Compression::None,
        Compression::Zstd,
        Compression::Gzip,
        Compression::Deflate,
    ];

    // Generate cartesian product of all param combinations
    let mut cases = Vec::new();
    for &concurrency in &concurrency_cases {
        for &compression in &compression_cases {
            cases.push(GrpcBenchParams {
                concurrency,
                compression,
            });
        }
    }

    for params in &cases {
        let mut group = c.benchmark_group("grpc/crud_cycle");
        group.throughput(Throughput::Elements(params.concurrency as u64));

        group.bench_function(
            format!("conc/{}/comp/{}", params.concurrency, params.compression),
            |b| {
                b.to_async(&rt).iter_custom(|iters| {
                    let uri = uri.clone();
                    async move {
                        let channel = Channel::builder(uri)
                            .connect()
                            .await
                            .expect("Failed to connect to server");

                        let start = Instant::now();

                        for _ in 0..iters {
                            run_grpc_crud_bench(&channel, params).await;
                        }

                        start.elapsed()
                    }
                });
            },
        );

        group.finish();
    }

    let _ = stop.send(());
}

/// One create, read, list and delete per concurrent client.
async fn run_grpc_crud_bench(channel: &Channel, params: &GrpcBenchParams) {
    let mut tasks = FuturesUnordered::new();

    for _ in 0..params.concurrency {
        let channel = channel.clone();
        let compression = params.compression;

        tasks.push(tokio::spawn(async move {
            let mut client = PersonServiceClient::new(channel);
            if let Some(encoding) = compression.into() {
                client = client.accept_compressed(encoding).send_compressed(encoding)
            }

            let person = client
                .create_person(CreatePersonRequest {
                    name: "Bench".to_string(),
                })
                .await
                .expect("create failed")
                .into_inner()
                .person
                .expect("created person");

            let found = client
                .find_by_id(PersonByIdRequest { id: person.id })
                .await
                .expect("find failed")
                .into_inner();
            black_box(found);

            let all = client
                .get_all(GetAllPeopleRequest {})
                .await
                .expect("list failed")
                .into_inner();
            black_box(all);

            let deleted = client
                .delete_person(DeletePersonRequest { id: person.id })
                .await
                .expect("delete failed")
                .into_inner();
            assert!(deleted.success);
        }));
    }

    // Wait for all tasks to complete
    while let Some(res) = tasks.next().await {
        res.unwrap();
    }
}

criterion_group!(benches, store_bench, grpc_bench);
criterion_main!(benches);
