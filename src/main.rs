use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use portfolio_content::{
    background_task::start_maintenance_task,
    content_store::ContentStore,
    email::email_sender_from_config,
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AdminGuard,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tokio::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    let content = match ContentStore::connect(&config).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Content store unavailable: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(
        &config,
        content.clone(),
        email_sender_from_config(&config),
    ));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server_config = config.clone();
    let server_state = app_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .wrap(AdminGuard)
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .wrap(build_cors(&server_config))
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .disable_signals()
    .bind(server_addr)?
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        server_handle.stop(true).await;
    });

    let maintenance = tokio::spawn(start_maintenance_task(
        content,
        app_state.contact_handler.limiter().clone(),
        Duration::from_secs(config.orphan_sweep_interval_secs),
        Duration::from_secs(config.orphan_grace_secs),
    ));

    let result = server.await;

    maintenance.abort();
    tracing::info!("Server stopped");
    result
}
