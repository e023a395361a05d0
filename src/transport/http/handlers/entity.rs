//! Generic resource handlers, mounted once per entity family.
//!
//! | Method | Path                 | Success            |
//! |--------|----------------------|--------------------|
//! | POST   | /api/{plural}        | 201 + Location     |
//! | PUT    | /api/{plural}/{id}   | 200 + entity       |
//! | PATCH  | /api/{plural}/{id}   | 200 + merged       |
//! | GET    | /api/{plural}        | 200 + array/stream |
//! | GET    | /api/{plural}/{id}   | 200 / 404          |
//! | DELETE | /api/{plural}/{id}   | 204                |
//!
//! The existence checks before PUT and PATCH are separate reads, not a
//! conditional write: a concurrent delete between check and write is not
//! detected.

use crate::app::EntityService;
use crate::domain::Entity;
use crate::errors::Error;
use crate::storage::EntityRepository;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{
    check_path_id, decode, decode_entity, read_json, wants_stream,
};
use crate::transport::http::types::{AppState, ListParams, NDJSON, TOTAL_COUNT_HEADER};
use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{StreamExt, TryStreamExt};
use serde_json::Value as JsonValue;

fn service<E: Entity>(state: &AppState) -> EntityService<E> {
    EntityService::from_store(state.store.clone())
}

fn store_error<E: Entity>(state: &AppState) -> impl Fn(Error) -> ApiError + '_ {
    move |e| ApiError::from_store(&state.alerts, E::DESCRIPTOR, e)
}

pub async fn create<E: Entity>(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Response, ApiError> {
    let descriptor = E::DESCRIPTOR;
    let payload = read_json(&state.alerts, descriptor, body)?;
    tracing::debug!(entity = descriptor.entity_name, %payload, "REST request to save");

    let entity: E = decode_entity(&state.alerts, payload)?;
    if entity.id().is_some() {
        return Err(state.alerts.bad_request(
            descriptor,
            format!("A new {} cannot already have an ID", descriptor.entity_name),
            "idexists",
        ));
    }

    let saved = service::<E>(&state)
        .save(entity)
        .await
        .map_err(store_error::<E>(&state))?;
    let id = saved
        .id()
        .ok_or_else(|| ApiError::Internal("store returned an entity without id".to_string()))?
        .to_string();

    let mut headers = state.alerts.created(descriptor, &id);
    if let Ok(location) = HeaderValue::from_str(&descriptor.item_url(&id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(saved)).into_response())
}

pub async fn update<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Response, ApiError> {
    let descriptor = E::DESCRIPTOR;
    let payload = read_json(&state.alerts, descriptor, body)?;
    tracing::debug!(entity = descriptor.entity_name, %id, %payload, "REST request to update");

    let entity: E = decode_entity(&state.alerts, payload)?;
    check_path_id(&state.alerts, descriptor, &id, entity.id())?;

    let exists = EntityRepository::<E>::new(state.store.clone())
        .exists_by_id(&id)
        .await
        .map_err(store_error::<E>(&state))?;
    if !exists {
        return Err(state.alerts.bad_request(descriptor, "Entity not found", "idnotfound"));
    }

    let updated = service::<E>(&state)
        .update(entity)
        .await
        .map_err(store_error::<E>(&state))?;
    let headers = state.alerts.updated(descriptor, &id);
    Ok((StatusCode::OK, headers, Json(updated)).into_response())
}

pub async fn partial_update<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Response, ApiError> {
    let descriptor = E::DESCRIPTOR;
    let payload = read_json(&state.alerts, descriptor, body)?;
    tracing::debug!(entity = descriptor.entity_name, %id, %payload, "REST request to partial update");

    let patch: E::Patch = decode(&state.alerts, descriptor, payload)?;
    check_path_id(&state.alerts, descriptor, &id, E::patch_id(&patch))?;

    let exists = EntityRepository::<E>::new(state.store.clone())
        .exists_by_id(&id)
        .await
        .map_err(store_error::<E>(&state))?;
    if !exists {
        return Err(state.alerts.bad_request(descriptor, "Entity not found", "idnotfound"));
    }

    // The record can still vanish between the check above and the merge.
    let merged = service::<E>(&state)
        .partial_update(patch)
        .await
        .map_err(store_error::<E>(&state))?
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", descriptor.entity_name, id)))?;
    let headers = state.alerts.updated(descriptor, &id);
    Ok((StatusCode::OK, headers, Json(merged)).into_response())
}

/// Buffered JSON array, or one JSON document per line when the client
/// accepts `application/x-ndjson`.
pub async fn list<E: Entity>(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let descriptor = E::DESCRIPTOR;
    let streamed = wants_stream(&headers);
    tracing::debug!(entity = descriptor.entity_name, streamed, sort = ?params.sort, "REST request to get all");

    let svc = service::<E>(&state);
    let entities = svc
        .find_all(params.sort.as_deref())
        .await
        .map_err(store_error::<E>(&state))?;

    if streamed {
        let entity_name = descriptor.entity_name;
        let lines = entities
            .map(|item| -> Result<Bytes, Error> {
                let mut line = serde_json::to_vec(&item?)
                    .map_err(|e| Error::serialization(e, "encoding stream record"))?;
                line.push(b'\n');
                Ok(Bytes::from(line))
            })
            .inspect_err(move |e| {
                tracing::warn!(entity = entity_name, error = %e, "stream aborted");
            });
        return Ok((
            StatusCode::OK,
            [(CONTENT_TYPE, NDJSON)],
            Body::from_stream(lines),
        )
            .into_response());
    }

    let all: Vec<E> = entities
        .try_collect()
        .await
        .map_err(store_error::<E>(&state))?;
    // Counted in a separate read: a concurrent write can make the header
    // disagree with the array length.
    let total = svc.count_all().await.map_err(store_error::<E>(&state))?;
    Ok((
        StatusCode::OK,
        [(TOTAL_COUNT_HEADER, total.to_string())],
        Json(all),
    )
        .into_response())
}

pub async fn get_one<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let descriptor = E::DESCRIPTOR;
    tracing::debug!(entity = descriptor.entity_name, %id, "REST request to get");

    service::<E>(&state)
        .find_one(&id)
        .await
        .map_err(store_error::<E>(&state))?
        .map(|entity| Json(entity).into_response())
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", descriptor.entity_name, id)))
}

pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let descriptor = E::DESCRIPTOR;
    tracing::debug!(entity = descriptor.entity_name, %id, "REST request to delete");

    service::<E>(&state)
        .delete(&id)
        .await
        .map_err(store_error::<E>(&state))?;
    let headers = state.alerts.deleted(descriptor, &id);
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}
