use actix_web::{web, App, HttpServer};
use workout_api::config::AppConfig;
use workout_api::request_span::RequestSpan;
use workout_api::routes;
use workout_api::state::AppState;
use workout_api::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let state = match AppState::in_memory(&config.auth) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    tracing::info!(host = %config.host, port = config.port, "listening");

    HttpServer::new(move || {
        App::new()
            .wrap(RequestSpan)
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
