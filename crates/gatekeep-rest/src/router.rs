//! Request routing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::{RestError, Result};
use crate::request::{Method, Request};
use crate::response::Response;

/// A boxed future returned by handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A single route definition.
#[derive(Clone)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Exact request path.
    pub path: String,
    /// Request handler.
    pub handler: Handler,
}

impl Route {
    /// Creates a new route.
    #[must_use]
    pub fn new<F, Fut>(method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            method,
            path: path.to_string(),
            handler: Arc::new(move |req| Box::pin(handler(req))),
        }
    }
}

/// Dispatches requests to handlers by method and exact path.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, path, handler)
    }

    /// Adds a route with any method.
    #[must_use]
    pub fn route<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.routes.push(Route::new(method, path, handler));
        self
    }

    /// Handles an incoming request.
    pub fn handle(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            match self.find_route(&request) {
                Ok(route) => (route.handler)(request).await,
                Err(err) => {
                    debug!(error = %err, "unrouted request");
                    match err {
                        RestError::MethodNotAllowed { .. } => Response::method_not_allowed(),
                        _ => Response::not_found(),
                    }
                }
            }
        })
    }

    /// Finds the route for a request.
    fn find_route(&self, request: &Request) -> Result<&Route> {
        let mut path_matched = false;

        for route in &self.routes {
            if route.path == request.path {
                path_matched = true;
                if route.method == request.method {
                    return Ok(route);
                }
            }
        }

        if path_matched {
            Err(RestError::MethodNotAllowed {
                method: request.method.to_string(),
                path: request.path.clone(),
            })
        } else {
            Err(RestError::NotFound {
                method: request.method.to_string(),
                path: request.path.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello_handler(_req: Request) -> Response {
        Response::text("Hello, World!")
    }

    #[tokio::test]
    async fn test_basic_routing() {
        let router = Router::new().post("/hello", hello_handler);

        let res = router.handle(Request::post("/hello")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, World!".to_string()));
    }

    #[tokio::test]
    async fn test_not_found() {
        let router = Router::new().post("/hello", hello_handler);

        let res = router.handle(Request::post("/nonexistent")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let router = Router::new().post("/hello", hello_handler);

        let res = router.handle(Request::get("/hello")).await;
        assert_eq!(res.status, 405);
    }
}
