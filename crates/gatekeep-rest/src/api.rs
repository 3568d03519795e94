//! The three store endpoints.
//!
//! Every route takes a JSON body `{"username", "password", "access"?}`.
//! A request may omit `Content-Type`, but any declared type must be
//! `application/json`.
//! Success answers `{"status": "success"}`. Failures are echoed with a 500
//! in debug mode and answered with an empty 200 otherwise, except a failed
//! `/login`, which is always a 401.

use gatekeep::{AccessLevel, Backend, Store};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::{RestError, Result};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Behaviour switches for the endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestSettings {
    /// Echo error text to the client with a 500 status.
    pub debug: bool,
}

impl RestSettings {
    fn error_response(self, err: &RestError) -> Response {
        if self.debug {
            warn!(error = %err, "request failed");
            Response::text(err.to_string()).status(500)
        } else {
            Response::ok()
        }
    }
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
    #[serde(default)]
    access: Option<AccessLevel>,
}

/// Decodes the credentials from a request body.
fn credentials(req: &Request) -> Result<Credentials> {
    if let Some(content_type) = req
        .get_header("content-type")
        .filter(|value| !value.to_ascii_lowercase().starts_with("application/json"))
    {
        return Err(RestError::ContentType(content_type.to_string()));
    }
    Ok(req.json()?)
}

fn success() -> Response {
    Response::json(&json!({ "status": "success" }))
}

/// Runs a store call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> gatekeep::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// Builds the router for `store`.
#[must_use]
pub fn api_router<B: Backend + 'static>(store: Store<B>, settings: RestSettings) -> Router {
    let add_store = store.clone();
    let delete_store = store.clone();
    let login_store = store;

    Router::new()
        .post("/add", move |req| add_handler(req, add_store.clone(), settings))
        .post("/delete", move |req| {
            delete_handler(req, delete_store.clone(), settings)
        })
        .post("/login", move |req| {
            login_handler(req, login_store.clone(), settings)
        })
}

async fn add_handler<B: Backend + 'static>(
    req: Request,
    store: Store<B>,
    settings: RestSettings,
) -> Response {
    let result: Result<()> = async {
        let creds = credentials(&req)?;
        let access = creds.access.unwrap_or_default();
        blocking(move || store.add(&creds.username, &creds.password, access)).await
    }
    .await;

    match result {
        Ok(()) => success(),
        Err(err) => settings.error_response(&err),
    }
}

async fn delete_handler<B: Backend + 'static>(
    req: Request,
    store: Store<B>,
    settings: RestSettings,
) -> Response {
    let result: Result<()> = async {
        let creds = credentials(&req)?;
        blocking(move || {
            let mut user = store.login(&creds.username, &creds.password, None)?;
            user.delete()
        })
        .await
    }
    .await;

    match result {
        Ok(()) => success(),
        Err(err) => settings.error_response(&err),
    }
}

async fn login_handler<B: Backend + 'static>(
    req: Request,
    store: Store<B>,
    settings: RestSettings,
) -> Response {
    let creds = match credentials(&req) {
        Ok(creds) => creds,
        Err(err) => return settings.error_response(&err),
    };

    let result = blocking(move || {
        let mut user = store.login(&creds.username, &creds.password, None)?;
        user.log_out();
        Ok(())
    })
    .await;

    match result {
        Ok(()) => success(),
        Err(err) => {
            tracing::debug!(error = %err, "login rejected");
            Response::json(&json!({ "status": "invalid credentials" })).status(401)
        }
    }
}
