use crate::data_models::ContactRecord;
use crate::validation::Violations;
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "contact_session";
pub const FLASH_COOKIE: &str = "contact_flash";

pub type SessionData = HashMap<String, serde_json::Value>;
pub type SessionStore = ExpiringStore<SessionData>;
pub type FlashStore = ExpiringStore<FormFlash>;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    last_access: Instant,
}

/// In-memory map of random ids to values that are dropped after `ttl` without access.
#[derive(Debug)]
pub struct ExpiringStore<V> {
    entries: Arc<RwLock<HashMap<Uuid, Entry<V>>>>,
    ttl: Duration,
}

impl<V> Clone for ExpiringStore<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
        }
    }
}

impl<V: Clone> ExpiringStore<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn insert(&self, value: V) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| now.duration_since(entry.last_access) < self.ttl);
        entries.insert(
            id,
            Entry {
                value,
                last_access: now,
            },
        );
        id
    }

    /// Returns a copy of the live value and refreshes its expiry.
    pub fn get(&self, id: &Uuid) -> Option<V> {
        let mut found = None;
        self.update(id, |value| found = Some(value.clone()));
        found
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.update(id, |_| ())
    }

    /// Applies `f` to the live value; returns false when the id is unknown or expired.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut V)) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(id) {
            Some(entry) if now.duration_since(entry.last_access) < self.ttl => {
                entry.last_access = now;
                f(&mut entry.value);
                true
            }
            Some(_) => {
                entries.remove(id);
                false
            }
            None => false,
        }
    }

    /// Removes the entry under one write lock, so only one caller can ever receive it.
    pub fn take(&self, id: &Uuid) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(id)
            .filter(|entry| now.duration_since(entry.last_access) < self.ttl)
            .map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

fn cookie_id(jar: &CookieJar, name: &str) -> Option<Uuid> {
    jar.get(name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Per-request handle on the caller's server-side session.
///
/// Cookie changes made through it reach the client when the handle is
/// returned as part of the response.
#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    jar: CookieJar,
    id: Option<Uuid>,
}

impl Session {
    pub fn new(store: SessionStore, jar: CookieJar) -> Self {
        let id = cookie_id(&jar, SESSION_COOKIE).filter(|id| store.contains(id));
        Self { store, jar, id }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.store.get(self.id.as_ref()?)?;
        serde_json::from_value(data.get(key)?.clone()).ok()
    }

    /// Stores `value` under `key`, creating the session first if needed.
    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        if let Some(id) = self.id {
            let updated = self.store.update(&id, |data| {
                data.insert(key.to_string(), value.clone());
            });
            if updated {
                return Ok(());
            }
        }
        let mut data = SessionData::new();
        data.insert(key.to_string(), value);
        let id = self.store.insert(data);
        self.jar = self.jar.clone().add(cookie(SESSION_COOKIE, id.to_string()));
        self.id = Some(id);
        Ok(())
    }

    /// Drops the session and returns whatever it held.
    pub fn invalidate(&mut self) -> Option<SessionData> {
        let data = self.id.take().and_then(|id| self.store.take(&id));
        if self.jar.get(SESSION_COOKIE).is_some() {
            self.jar = self.jar.clone().remove(removal(SESSION_COOKIE));
        }
        data
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Session::new(SessionStore::from_ref(state), jar))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

/// Rejected form input carried across the redirect back to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFlash {
    pub record: ContactRecord,
    pub violations: Violations,
}

#[derive(Debug)]
pub struct Flash {
    store: FlashStore,
    jar: CookieJar,
}

impl Flash {
    pub fn new(store: FlashStore, jar: CookieJar) -> Self {
        Self { store, jar }
    }

    /// Reads the pending flash once; later reads see nothing.
    pub fn take(&mut self) -> Option<FormFlash> {
        let id = cookie_id(&self.jar, FLASH_COOKIE);
        if self.jar.get(FLASH_COOKIE).is_some() {
            self.jar = self.jar.clone().remove(removal(FLASH_COOKIE));
        }
        self.store.take(&id?)
    }

    pub fn set(&mut self, flash: FormFlash) {
        if let Some(previous) = cookie_id(&self.jar, FLASH_COOKIE) {
            self.store.take(&previous);
        }
        let id = self.store.insert(flash);
        self.jar = self.jar.clone().add(cookie(FLASH_COOKIE, id.to_string()));
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    FlashStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Flash::new(FlashStore::from_ref(state), jar))
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};
    use std::thread::sleep;

    const KEY: &str = "requestContact";

    fn jar_with(name: &str, id: Uuid) -> CookieJar {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("{name}={id}")).expect("Invalid header");
        headers.insert(header::COOKIE, value);
        CookieJar::from_headers(&headers)
    }

    fn record() -> ContactRecord {
        ContactRecord::new("Taro Yamada", "taro@example.com", "Inquiry", "Hello")
    }

    #[test]
    fn store_take_only_once() {
        let store = ExpiringStore::new(Duration::from_secs(60));
        let id = store.insert(1u32);
        assert_eq!(store.take(&id), Some(1));
        assert_eq!(store.take(&id), None);
        assert!(store.is_empty());
    }

    #[test]
    fn store_entries_expire() {
        let store = ExpiringStore::new(Duration::from_millis(10));
        let id = store.insert("value".to_string());
        sleep(Duration::from_millis(30));
        assert_eq!(store.get(&id), None);
        assert_eq!(store.take(&id), None);
    }

    #[test]
    fn store_insert_purges_expired() {
        let store = ExpiringStore::new(Duration::from_millis(10));
        store.insert(1u8);
        sleep(Duration::from_millis(30));
        store.insert(2u8);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn session_without_cookie_does_not_exist() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session = Session::new(store.clone(), CookieJar::new());
        assert!(!session.exists());
        assert_eq!(session.get::<ContactRecord>(KEY), None);
        assert!(store.is_empty());
    }

    #[test]
    fn session_insert_creates_and_get_reads() {
        let store = SessionStore::new(Duration::from_secs(60));
        let mut session = Session::new(store.clone(), CookieJar::new());
        session.insert(KEY, &record()).expect("Failed to insert");
        assert!(session.exists());
        assert_eq!(session.get::<ContactRecord>(KEY), Some(record()));
        assert_eq!(store.len(), 1);
        assert!(session.jar.get(SESSION_COOKIE).is_some());
    }

    #[test]
    fn session_insert_overwrites_existing_key() {
        let store = SessionStore::new(Duration::from_secs(60));
        let mut first = Session::new(store.clone(), CookieJar::new());
        first.insert(KEY, &record()).expect("Failed to insert");
        let id = first.id.expect("Session was not created");

        let mut second = Session::new(store.clone(), jar_with(SESSION_COOKIE, id));
        let mut changed = record();
        changed.title = "Other".to_string();
        second.insert(KEY, &changed).expect("Failed to insert");

        assert_eq!(store.len(), 1);
        assert_eq!(second.get::<ContactRecord>(KEY), Some(changed));
    }

    #[test]
    fn session_with_unknown_cookie_does_not_exist() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session = Session::new(store, jar_with(SESSION_COOKIE, Uuid::new_v4()));
        assert!(!session.exists());
    }

    #[test]
    fn session_invalidate_is_one_shot() {
        let store = SessionStore::new(Duration::from_secs(60));
        let mut session = Session::new(store.clone(), CookieJar::new());
        session.insert(KEY, &record()).expect("Failed to insert");
        let id = session.id.expect("Session was not created");

        let mut first = Session::new(store.clone(), jar_with(SESSION_COOKIE, id));
        let mut second = Session::new(store.clone(), jar_with(SESSION_COOKIE, id));
        assert!(first.invalidate().is_some());
        assert!(second.invalidate().is_none());
        assert!(!first.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn flash_is_read_once() {
        let store = FlashStore::new(Duration::from_secs(60));
        let mut flash = Flash::new(store.clone(), CookieJar::new());
        let form = FormFlash {
            record: record(),
            violations: Violations::default(),
        };
        flash.set(form.clone());
        let id = cookie_id(&flash.jar, FLASH_COOKIE).expect("Flash cookie was not set");

        let mut reader = Flash::new(store.clone(), jar_with(FLASH_COOKIE, id));
        assert_eq!(reader.take(), Some(form));
        let mut again = Flash::new(store.clone(), jar_with(FLASH_COOKIE, id));
        assert_eq!(again.take(), None);
    }

    #[test]
    fn flash_without_cookie_is_empty() {
        let store = FlashStore::new(Duration::from_secs(60));
        let mut flash = Flash::new(store, CookieJar::new());
        assert_eq!(flash.take(), None);
    }
}
