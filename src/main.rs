use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    ServiceExt,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voluntariamente::{
    auth::password::PasswordHasher, create_router, db::Database, normalize_paths, AppConfig,
    AppError, AppState,
};

fn cors_layer(origins: &[String]) -> Result<CorsLayer, AppError> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin '{origin}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request()))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voluntariamente=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Voluntariamente API");

    let config = AppConfig::from_env()?;
    let password_hasher = PasswordHasher::new(config.bcrypt_cost);

    let app_state = match &config.database {
        Some(database_config) => {
            let database = Database::connect(database_config).await?;
            database.migrate().await?;
            AppState::postgres(&database, config.token.clone(), password_hasher)
        }
        None => AppState::in_memory(config.token.clone(), password_hasher),
    };

    let app = normalize_paths(
        create_router(app_state)
            .layer(cors_layer(&config.cors_origins)?)
            .layer(TraceLayer::new_for_http()),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}
