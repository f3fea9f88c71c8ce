use crate::app_state::AppState;
use crate::data_models::ContactRecord;
use crate::errors::AppErrors;
use crate::mail::MailSender;
use crate::session::{Flash, FormFlash, Session};
use crate::templates::{ConfirmTemplate, ContactTemplate, HtmlTemplate, ThanksTemplate};
use crate::validation::validate;
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

/// Session key holding the contact between confirmation and sending.
pub const CONTACT_KEY: &str = "requestContact";

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /contact: the input form, refilled from a rejected submission if one was flashed.
pub async fn show_form(mut flash: Flash) -> impl IntoResponse {
    let template = match flash.take() {
        Some(FormFlash { record, violations }) => ContactTemplate { record, violations },
        None => ContactTemplate::default(),
    };
    (flash, HtmlTemplate(template))
}

/// POST /contact: validates the input and parks it in the session for confirmation.
pub async fn submit_for_confirmation(
    mut session: Session,
    mut flash: Flash,
    Form(record): Form<ContactRecord>,
) -> Result<Response, AppErrors> {
    info!(?record, "contact submitted");

    let violations = validate(&record);
    if !violations.is_empty() {
        warn!(?record, %violations, "contact failed validation");
        flash.set(FormFlash { record, violations });
        return Ok((
            StatusCode::FOUND,
            flash,
            [(header::LOCATION, "/contact")],
        )
            .into_response());
    }

    session.insert(CONTACT_KEY, &record)?;
    Ok((session, HtmlTemplate(ConfirmTemplate { record })).into_response())
}

/// POST /send: sends the confirmed contact once.
pub async fn send<M: MailSender>(
    State(state): State<AppState<M>>,
    mut session: Session,
) -> Response {
    match confirm_and_send(state.mailer.as_ref(), &mut session).await {
        Ok(record) => (session, HtmlTemplate(ThanksTemplate { record })).into_response(),
        Err(err) => (session, err).into_response(),
    }
}

async fn confirm_and_send<M: MailSender>(
    mailer: &M,
    session: &mut Session,
) -> Result<ContactRecord, AppErrors> {
    if !session.exists() {
        warn!("no contact session found");
        session.invalidate();
        return Err(AppErrors::Forbidden);
    }

    // The session is gone before anything else happens, so a replayed
    // request can never reach the mailer.
    let record = session
        .invalidate()
        .and_then(|mut data| data.remove(CONTACT_KEY))
        .and_then(|value| serde_json::from_value::<ContactRecord>(value).ok());
    let Some(record) = record else {
        warn!("session holds no contact");
        return Err(AppErrors::Forbidden);
    };

    let violations = validate(&record);
    if !violations.is_empty() {
        warn!(?record, %violations, "session contact failed validation, possibly tampered");
        return Err(AppErrors::Forbidden);
    }

    info!(?record, "sending contact mail");
    if let Err(err) = mailer.send(record.clone()).await {
        error!(?record, error = %err, "failed to send contact mail");
        return Err(err.into());
    }
    info!(mail = %record.mail, "contact mail sent");
    Ok(record)
}
