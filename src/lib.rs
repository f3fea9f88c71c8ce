pub mod app_state;
pub mod configuration;
pub mod data_models;
pub mod errors;
pub mod mail;
mod routes;
pub mod session;
pub mod templates;
pub mod validation;

use crate::app_state::AppState;
use crate::configuration::Settings;
use crate::errors::Error;
use crate::mail::MailSender;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use routes::CONTACT_KEY;

pub fn create_app<M: MailSender>(
    settings: &Settings,
    mailer: M,
) -> Result<(Router, AppState<M>), Error> {
    settings.check_if_valid()?;
    let app_state = AppState::init(mailer, &settings.session);
    let app = Router::new()
        .route("/health_check", get(routes::health_check))
        .route(
            "/contact",
            get(routes::show_form).post(routes::submit_for_confirmation),
        )
        .route("/send", post(routes::send::<M>))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state.clone());
    Ok((app, app_state))
}
