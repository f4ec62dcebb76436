use actix_web::{delete, get, post, web, HttpResponse};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{MessageResponse, NewWorkout};
use crate::state::AppState;

const NOT_FOUND: &str = "Workout not found";

#[get("/")]
pub async fn list_workouts(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let workouts = state.workouts.list_for_owner(user.id()).await?;
    Ok(HttpResponse::Ok().json(workouts))
}

#[get("/{workout_id}")]
pub async fn get_workout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    match state.workouts.find_for_owner(user.id(), path.into_inner()).await? {
        Some(workout) => Ok(HttpResponse::Ok().json(workout)),
        None => Err(ApiError::NotFound(NOT_FOUND)),
    }
}

#[post("/")]
pub async fn create_workout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<NewWorkout>,
) -> Result<HttpResponse, ApiError> {
    let workout = state.workouts.create(user.id(), body.into_inner()).await?;
    tracing::info!(workout_id = workout.id, identity_id = user.id(), "workout created");
    Ok(HttpResponse::Created().json(workout))
}

#[delete("/{workout_id}")]
pub async fn delete_workout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let workout_id = path.into_inner();
    if !state.workouts.delete_for_owner(user.id(), workout_id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    tracing::info!(workout_id, identity_id = user.id(), "workout deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Workout deleted")))
}
