use crate::data_models::ContactRecord;
use crate::validation::Violations;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

#[derive(Default, Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub record: ContactRecord,
    pub violations: Violations,
}

#[derive(Default, Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub record: ContactRecord,
}

#[derive(Default, Template)]
#[template(path = "thanks.html")]
pub struct ThanksTemplate {
    pub record: ContactRecord,
}

pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template. Error: {err}"),
                )
                    .into_response()
            }
        }
    }
}
