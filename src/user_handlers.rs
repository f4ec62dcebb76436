use actix_web::{post, web, HttpResponse};

use crate::error::ApiError;
use crate::models::{LoginForm, MessageResponse, RegisterRequest, TokenResponse};
use crate::state::AppState;

#[post("/")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    state
        .authenticator
        .register(state.users.as_ref(), &body.username, &body.password)
        .await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("User created")))
}

#[post("/token")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .authenticator
        .authenticate(state.users.as_ref(), &form.username, &form.password)
        .await?;
    let token = state.tokens.issue_token(&user.username, user.id)?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}
