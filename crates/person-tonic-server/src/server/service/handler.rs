//! gRPC service implementation for the `Person` entity.
//!
//! This module defines [`PersonHandler`], the concrete implementation of the
//! [`PersonService`] gRPC service defined in `proto/person.proto`. Every RPC is
//! unary, stateless, and maps onto exactly one store operation.
//!
//! ## Responsibilities
//!
//! - Validate names on `CreatePerson` and `UpdatePerson` according to the
//!   configured [`ValidationMode`].
//! - Translate absence into unset `person` fields, empty lists and `false`
//!   flags, which are successful responses.
//! - Surface storage failures as `INTERNAL` and requests arriving during
//!   shutdown as `UNAVAILABLE`.
//! - Record per-RPC telemetry.

use crate::server::{
    config::ValidationMode,
    store::PersonStore,
    telemetry::{
        increment_people_created, increment_people_deleted, increment_request_errors,
        increment_requests, record_request_duration,
    },
};
use core::future::Future;
use person_tonic_core::{
    Error, validate_name,
    proto::{
        CreatePersonRequest, DeletePersonRequest, DeletePersonResponse, GetAllPeopleRequest,
        PeopleResponse, PersonByIdRequest, PersonByNameRequest, PersonResponse,
        UpdatePersonRequest, person_service_server::PersonService,
    },
};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::{info, warn};

/// gRPC front end of the person store.
///
/// Clones share the same store and shutdown state.
#[derive(Clone, Debug)]
pub struct PersonHandler {
    store: PersonStore,
    validation: ValidationMode,
    shutdown_token: CancellationToken,
}

impl PersonHandler {
    pub fn new(store: PersonStore, validation: ValidationMode) -> Self {
        Self {
            store,
            validation,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Makes every later request fail with `UNAVAILABLE`.
    pub fn refuse_new_requests(&self) {
        if !self.shutdown_token.is_cancelled() {
            info!("Refusing new requests");
            self.shutdown_token.cancel();
        }
    }

    /// Refuses new requests and closes the store. Requests already holding a
    /// connection run to completion before the pool closes.
    pub async fn shutdown(&self) {
        self.refuse_new_requests();
        self.store.close().await;
        info!("Store closed");
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Runs one RPC body with the shutdown check and telemetry around it, and
    /// converts its outcome into a tonic response.
    async fn observe<T, F>(&self, rpc: &'static str, body: F) -> Result<Response<T>, Status>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let start = Instant::now();
        increment_requests(rpc);

        let result = if self.is_shutting_down() {
            Err(Error::ServiceShutdown)
        } else {
            body.await
        };

        record_request_duration(rpc, start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(message) => Ok(Response::new(message)),
            Err(err) => {
                increment_request_errors(rpc);
                warn!(rpc = rpc, "Request failed: {err}");
                Err(err.into())
            }
        }
    }

    /// Answer for a blank name: an empty response in lenient mode, the
    /// validation error in strict mode.
    fn reject_blank_name(&self, err: Error) -> Result<PersonResponse, Error> {
        match self.validation {
            ValidationMode::Lenient => Ok(PersonResponse { person: None }),
            ValidationMode::Strict => Err(err),
        }
    }
}

#[tonic::async_trait]
impl PersonService for PersonHandler {
    #[tracing::instrument(skip_all, fields(rpc = "CreatePerson"))]
    async fn create_person(
        &self,
        req: Request<CreatePersonRequest>,
    ) -> Result<Response<PersonResponse>, Status> {
        let CreatePersonRequest { name } = req.into_inner();
        info!("Received createPerson request for name: {name:?}");

        self.observe("create_person", async {
            if let Err(err) = validate_name(&name) {
                warn!("Cannot create person with empty name");
                return self.reject_blank_name(err);
            }

            let person = self.store.create(&name).await?;
            info!("Created person with ID: {}", person.id);
            increment_people_created();
            Ok(PersonResponse::from(Some(person)))
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(rpc = "FindById", id = req.get_ref().id))]
    async fn find_by_id(
        &self,
        req: Request<PersonByIdRequest>,
    ) -> Result<Response<PersonResponse>, Status> {
        let id = req.into_inner().id;
        info!("Received findById request for id: {id}");

        self.observe("find_by_id", async {
            let person = self.store.find_by_id(id).await?;
            Ok(PersonResponse::from(person))
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(rpc = "FindByName"))]
    async fn find_by_name(
        &self,
        req: Request<PersonByNameRequest>,
    ) -> Result<Response<PeopleResponse>, Status> {
        let PersonByNameRequest { name } = req.into_inner();
        info!("Received findByName request for name: {name:?}");

        self.observe("find_by_name", async {
            let people = self.store.find_by_name(&name).await?;
            Ok(PeopleResponse::from(people))
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(rpc = "GetAll"))]
    async fn get_all(
        &self,
        _req: Request<GetAllPeopleRequest>,
    ) -> Result<Response<PeopleResponse>, Status> {
        info!("Received getAll request");

        self.observe("get_all", async {
            let people = self.store.list_all().await?;
            Ok(PeopleResponse::from(people))
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(rpc = "UpdatePerson", id = req.get_ref().id))]
    async fn update_person(
        &self,
        req: Request<UpdatePersonRequest>,
    ) -> Result<Response<PersonResponse>, Status> {
        let UpdatePersonRequest { id, name } = req.into_inner();
        info!("Received updatePerson request for id: {id}, new name: {name:?}");

        self.observe("update_person", async {
            if let Err(err) = validate_name(&name) {
                warn!("Cannot update person with empty name");
                return self.reject_blank_name(err);
            }

            let person = self.store.update(id, &name).await?;
            match &person {
                Some(_) => info!("Updated person with ID: {id}"),
                None => warn!("Person with ID {id} not found for update"),
            }
            Ok(PersonResponse::from(person))
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(rpc = "DeletePerson", id = req.get_ref().id))]
    async fn delete_person(
        &self,
        req: Request<DeletePersonRequest>,
    ) -> Result<Response<DeletePersonResponse>, Status> {
        let id = req.into_inner().id;
        info!("Received deletePerson request for id: {id}");

        self.observe("delete_person", async {
            let success = self.store.delete(id).await?;
            if success {
                info!("Deleted person with ID: {id}");
                increment_people_deleted();
            } else {
                warn!("Person with ID {id} not found for deletion");
            }
            Ok(DeletePersonResponse { success })
        })
        .await
    }
}
