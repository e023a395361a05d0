use crate::domain::entity::{Account, CronSchedule, Entity, EntityDescriptor, TrafficRecord};
use crate::domain::EntityRegistry;
use crate::transport::http::handlers::{entity, health};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::routing::get;
use axum::Router;
use utoipa::openapi::path::{
    OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathItemType,
};
use utoipa::openapi::{ContentBuilder, Ref, Required, ResponseBuilder};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::healthcheck_handler),
    components(schemas(ApiResponse, CronSchedule, TrafficRecord, Account))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .merge(entity_routes::<CronSchedule>())
        .merge(entity_routes::<TrafficRecord>())
        .merge(entity_routes::<Account>())
        .with_state(app_state)
}

/// The CRUD surface of one entity family. Update verbs are only routed on
/// the item path, so PUT/PATCH on the collection path answer 405.
pub fn entity_routes<E: Entity>() -> Router<AppState> {
    let descriptor = E::DESCRIPTOR;
    Router::new()
        .route(
            &descriptor.collection_url(),
            get(entity::list::<E>).post(entity::create::<E>),
        )
        .route(
            &format!("{}/:id", descriptor.collection_url()),
            get(entity::get_one::<E>)
                .put(entity::update::<E>)
                .patch(entity::partial_update::<E>)
                .delete(entity::delete::<E>),
        )
}

/// [`ApiDoc`] plus the CRUD paths of every registered entity family.
pub fn api_doc(registry: &EntityRegistry) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    for descriptor in registry.descriptors() {
        let (collection, item) = entity_path_items(descriptor);
        doc.paths.paths.insert(descriptor.collection_url(), collection);
        doc.paths
            .paths
            .insert(format!("{}/{{id}}", descriptor.collection_url()), item);
    }
    doc
}

fn entity_path_items(d: &EntityDescriptor) -> (PathItem, PathItem) {
    let op = |verb: &str, summary: String| {
        OperationBuilder::new()
            .operation_id(Some(format!("{}_{}", verb, d.collection)))
            .tag(d.entity_name)
            .summary(Some(summary))
    };
    let entity_body = |description: &str| {
        ResponseBuilder::new()
            .description(description)
            .content(
                "application/json",
                ContentBuilder::new()
                    .schema(Ref::from_schema_name(d.schema_name))
                    .build(),
            )
            .build()
    };
    let described = |description: &str| ResponseBuilder::new().description(description).build();
    let id_param = || {
        ParameterBuilder::new()
            .name("id")
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .build()
    };

    let mut collection = PathItem::new(
        PathItemType::Get,
        op("list", format!("List all {} (JSON array or x-ndjson stream)", d.entity_name))
            .response("200", described("All records; accepts ?sort=field,asc|desc")),
    );
    collection.operations.insert(
        PathItemType::Post,
        op("create", format!("Create a {}", d.entity_name))
            .response("201", entity_body("Created"))
            .response("400", described("Id present or required field missing"))
            .build(),
    );

    let mut item = PathItem::new(
        PathItemType::Get,
        op("get", format!("Get one {}", d.entity_name))
            .parameter(id_param())
            .response("200", entity_body("Found"))
            .response("404", described("Not found")),
    );
    item.operations.insert(
        PathItemType::Put,
        op("update", format!("Replace a {}", d.entity_name))
            .parameter(id_param())
            .response("200", entity_body("Updated"))
            .response("400", described("Missing or mismatched id, or record absent"))
            .build(),
    );
    item.operations.insert(
        PathItemType::Patch,
        op("partial_update", format!("Merge-patch a {}", d.entity_name))
            .parameter(id_param())
            .response("200", entity_body("Merged"))
            .response("400", described("Missing or mismatched id, or record absent"))
            .response("404", described("Record vanished before the merge"))
            .build(),
    );
    item.operations.insert(
        PathItemType::Delete,
        op("delete", format!("Delete a {}", d.entity_name))
            .parameter(id_param())
            .response("204", described("Deleted (also when absent)"))
            .build(),
    );

    (collection, item)
}
