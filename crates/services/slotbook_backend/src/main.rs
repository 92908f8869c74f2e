// File: services/slotbook_backend/src/main.rs
use slotbook_common::clock::system_clock;
use slotbook_common::logging;
use slotbook_config::load_config;
use slotbook_gcal::routes::gcal_routes;
use std::error::Error;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = load_config()?;

    let level = logging::parse_level(config.logging.level.as_deref());
    // Keeps the file writer flushing until shutdown.
    let _log_guard = match config.logging.directory.as_deref() {
        Some(directory) => Some(logging::init_with_file(level, Path::new(directory))),
        None => {
            logging::init_with_level(level);
            None
        }
    };

    let gcal_router = logging::log_result(
        gcal_routes(&config, system_clock()).await,
        "Google Calendar client ready",
        "Google Calendar setup failed",
    )?;

    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut app = gcal_router;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use slotbook_gcal::doc::GcalApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(info(
            title = "Slotbook API",
            version = "0.1.0",
            description = "Appointment booking on Google Calendar",
            license(name = "MIT", url = "https://opensource.org/licenses/MIT")
        ))]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(GcalApiDoc::openapi());
        info!("Adding Swagger UI at /docs");

        let swagger_ui = SwaggerUi::new("/docs").url("/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
