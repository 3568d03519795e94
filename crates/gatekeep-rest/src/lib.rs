//! # gatekeep-rest
//!
//! A thin JSON-over-HTTP layer in front of a [`gatekeep::Store`].
//!
//! Routes:
//! - `POST /add` registers a user
//! - `POST /delete` authenticates and deletes a user
//! - `POST /login` authenticates, then immediately logs the session out
//!
//! ```ignore
//! use std::sync::Arc;
//! use gatekeep::MemoryStore;
//! use gatekeep_rest::{api_router, serve, RestSettings};
//!
//! let router = api_router(MemoryStore::default(), RestSettings { debug: true });
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! serve(listener, Arc::new(router)).await?;
//! ```
//!
//! Store calls block (password hashing, SQLite), so handlers run them on
//! tokio's blocking pool.

mod api;
mod error;
mod request;
mod response;
mod router;
mod server;

pub use api::{api_router, RestSettings};
pub use error::{RestError, Result};
pub use request::{Method, Request};
pub use response::Response;
pub use router::{BoxFuture, Handler, Route, Router};
pub use server::serve;
