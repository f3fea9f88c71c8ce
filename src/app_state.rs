use crate::configuration::SessionSettings;
use crate::mail::MailSender;
use crate::session::{FlashStore, SessionStore};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Debug)]
pub struct AppState<M> {
    pub mailer: Arc<M>,
    pub sessions: SessionStore,
    pub flashes: FlashStore,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            mailer: self.mailer.clone(),
            sessions: self.sessions.clone(),
            flashes: self.flashes.clone(),
        }
    }
}

impl<M: MailSender> AppState<M> {
    pub fn init(mailer: M, settings: &SessionSettings) -> Self {
        Self {
            mailer: Arc::new(mailer),
            sessions: SessionStore::new(settings.ttl()),
            flashes: FlashStore::new(settings.flash_ttl()),
        }
    }
}

impl<M> FromRef<AppState<M>> for SessionStore {
    fn from_ref(state: &AppState<M>) -> Self {
        state.sessions.clone()
    }
}

impl<M> FromRef<AppState<M>> for FlashStore {
    fn from_ref(state: &AppState<M>) -> Self {
        state.flashes.clone()
    }
}
