use actix_web::{get, web, HttpResponse, Responder};
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::auth::validator;
use crate::{user_handlers, workout_handlers};

/// Simple health check
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Registers every route. Expects `web::Data<AppState>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(
            web::scope("/auth")
                .service(user_handlers::register)
                .service(user_handlers::login),
        )
        .service(
            web::scope("/workouts")
                .wrap(HttpAuthentication::with_fn(validator))
                .service(workout_handlers::list_workouts)
                .service(workout_handlers::create_workout)
                .service(workout_handlers::get_workout)
                .service(workout_handlers::delete_workout),
        );
}
