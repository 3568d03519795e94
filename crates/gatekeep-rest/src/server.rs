//! Serving a [`Router`] over HTTP/1 with hyper.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::request::{Method, Request};
use crate::router::Router;

/// Accepts connections forever, dispatching every request to `router`.
pub async fn serve(listener: TcpListener, router: Arc<Router>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = Arc::clone(&router);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = Arc::clone(&router);
                handle_request(req, router)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %err, "error serving connection");
            }
        });
    }
}

async fn handle_request(
    req: HyperRequest<Incoming>,
    router: Arc<Router>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(status_only(StatusCode::METHOD_NOT_ALLOWED));
    };

    let mut request = Request::new(method, req.uri().path());
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.insert(key.to_string(), v.to_string());
        }
    }

    request.body = match req.collect().await {
        Ok(body) => body.to_bytes().to_vec(),
        Err(err) => {
            debug!(error = %err, "failed to read request body");
            return Ok(status_only(StatusCode::BAD_REQUEST));
        }
    };

    let response = router.handle(request).await;

    let mut builder = HyperResponse::builder().status(
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    Ok(builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|err| {
            warn!(error = %err, "invalid response");
            status_only(StatusCode::INTERNAL_SERVER_ERROR)
        }))
}

fn status_only(status: StatusCode) -> HyperResponse<Full<Bytes>> {
    let mut response = HyperResponse::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
