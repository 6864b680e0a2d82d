use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router, middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use redis_connection::{CacheBackend, config::RedisDbConfig, connect_redis_db};
use sql_connection::{PostgresDbConfig, SqlConnect, connect_postgres_db};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::auth::AuthState;

mod auth;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing connection pools...");

    let db_config = PostgresDbConfig::from_env();
    let pool = connect_postgres_db(&db_config).await?;
    let db = SqlConnect::new(pool);
    info!("PostgreSQL connection pool initialized");

    let redis_config = RedisDbConfig::from_env();
    let redis_pool = connect_redis_db(&redis_config).await?;
    let cache = Arc::new(CacheBackend::redis(redis_pool));
    info!("Redis connection pool and cache backend initialized");

    let identity_services =
        identity_http::IdentityServices::new(db.clone(), cache.clone());
    let category_services =
        category_http::CategoryServices::new(db.clone(), cache.clone());
    let property_services =
        property_http::PropertyServices::new(db.clone(), cache.clone());
    let advertisement_services =
        advertisement_http::AdvertisementServices::new(
            db.clone(),
            cache.clone(),
        );
    let media_services = media_http::MediaServices::new(db.clone());
    let auth_state = AuthState::new(db.clone());

    // Reads and registration stay open; every other handler extracts the
    // AuthPrincipal attached by the authentication layer and rejects with
    // 401 when it is absent
    let api_routes = Router::new()
        .route("/identities", post(identity_http::create_identity))
        .route("/identities", get(identity_http::list_identities))
        .route("/identities/{id}", get(identity_http::get_identity))
        .route("/identities/{id}", put(identity_http::update_identity))
        .route("/identities/{id}", delete(identity_http::delete_identity))
        .route(
            "/identities/{id}/password",
            put(identity_http::change_password),
        )
        .route(
            "/identities/{id}/status",
            put(identity_http::change_status),
        )
        .route(
            "/identities/{id}/image",
            post(identity_http::upload_identity_image),
        )
        .route(
            "/identities/{id}/image",
            delete(identity_http::remove_identity_image),
        )
        .with_state(identity_services)
        .route("/categories", get(category_http::list_categories))
        .route("/categories", post(category_http::create_category))
        .route("/categories/{id}", get(category_http::get_category))
        .route("/categories/{id}", put(category_http::update_category))
        .route("/categories/{id}", delete(category_http::delete_category))
        .with_state(category_services)
        .route("/properties", get(property_http::list_properties))
        .route("/properties", post(property_http::create_property))
        .route("/properties/{id}", get(property_http::get_property))
        .route("/properties/{id}", put(property_http::update_property))
        .route("/properties/{id}", delete(property_http::delete_property))
        .route(
            "/properties/{id}/images",
            post(property_http::upload_property_images),
        )
        .route(
            "/properties/{id}/images",
            delete(property_http::remove_property_images),
        )
        .route(
            "/properties/{id}/images/{image_id}/preview",
            put(property_http::set_property_image_preview),
        )
        .route(
            "/properties/{id}/documents",
            post(property_http::upload_property_documents),
        )
        .route(
            "/properties/{id}/documents",
            delete(property_http::remove_property_documents),
        )
        .with_state(property_services)
        .route(
            "/advertisements",
            get(advertisement_http::list_advertisements),
        )
        .route(
            "/advertisements",
            post(advertisement_http::create_advertisement),
        )
        .route(
            "/advertisements/rent",
            put(advertisement_http::rent_property),
        )
        .route(
            "/advertisements/{id}",
            get(advertisement_http::get_advertisement),
        )
        .route(
            "/advertisements/{id}",
            put(advertisement_http::update_advertisement),
        )
        .route(
            "/advertisements/{id}",
            delete(advertisement_http::delete_advertisement),
        )
        .with_state(advertisement_services)
        .route("/images/{id}", get(media_http::get_image))
        .route("/documents/{id}", get(media_http::get_document))
        .with_state(media_services)
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth::authenticate,
        ));

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .with_state(db.clone());

    let app = Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/docs"))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(9000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Arenda rental server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        identity_http::create_identity,
        identity_http::list_identities,
        identity_http::get_identity,
        identity_http::update_identity,
        identity_http::delete_identity,
        identity_http::change_password,
        identity_http::change_status,
        identity_http::upload_identity_image,
        identity_http::remove_identity_image,
        category_http::create_category,
        category_http::list_categories,
        category_http::get_category,
        category_http::update_category,
        category_http::delete_category,
        property_http::create_property,
        property_http::list_properties,
        property_http::get_property,
        property_http::update_property,
        property_http::delete_property,
        property_http::upload_property_images,
        property_http::remove_property_images,
        property_http::set_property_image_preview,
        property_http::upload_property_documents,
        property_http::remove_property_documents,
        advertisement_http::create_advertisement,
        advertisement_http::list_advertisements,
        advertisement_http::get_advertisement,
        advertisement_http::update_advertisement,
        advertisement_http::delete_advertisement,
        advertisement_http::rent_property,
        media_http::get_image,
        media_http::get_document
    ),
    components(
        schemas(
            identity_commands::CreateIdentityCommand,
            identity_commands::UpdateIdentityCommand,
            identity_commands::ChangePasswordCommand,
            identity_commands::ChangeStatusCommand,
            identity_responses::IdentityShortResponse,
            identity_cache_keys::IdentityFullResponse,
            category_commands::CreateCategoryCommand,
            category_commands::UpdateCategoryCommand,
            category_responses::CategoryShortResponse,
            category_cache_keys::CategoryFullResponse,
            property_commands::CreatePropertyCommand,
            property_commands::UpdatePropertyCommand,
            property_commands::RemovePropertyImagesCommand,
            property_commands::RemovePropertyDocumentsCommand,
            property_responses::PropertyShortResponse,
            property_responses::PropertyWithCategoryResponse,
            property_cache_keys::PropertyFullResponse,
            advertisement_commands::CreateAdvertisementCommand,
            advertisement_commands::UpdateAdvertisementCommand,
            advertisement_commands::RentPropertyCommand,
            advertisement_responses::AdvertisementShortResponse,
            advertisement_cache_keys::AdvertisementFullResponse,
            media_responses::ImageResponse,
            media_responses::DocumentResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "identities", description = "Identity management endpoints"),
        (name = "categories", description = "Category management endpoints"),
        (name = "properties", description = "Property management endpoints"),
        (name = "advertisements", description = "Advertisement and rental endpoints"),
        (name = "media", description = "Image and document retrieval")
    ),
    info(
        title = "Arenda API",
        description = "Property rental and listing platform",
        version = "1.0.0"
    )
)]
struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check successful with connection pool status", body = String)
    ),
    tag = "health"
)]
async fn health_check(
    axum::extract::State(db): axum::extract::State<SqlConnect>,
) -> impl IntoResponse {
    let (available, size) = db.get_pool_status();
    format!("OK - Pool: {available}/{size} available")
}
