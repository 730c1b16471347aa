// crates/contract-probe-mock/src/server.rs
// ============================================================================
// Module: Mock Server
// Description: axum transport for the mock backend.
// Purpose: Serve a specification over HTTP in-process or from the binary.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! [`serve`] runs the mock on an existing listener until a shutdown future
//! resolves. [`spawn_mock`] binds a listener, runs [`serve`] on a dedicated
//! thread with its own current-thread runtime, and returns a [`MockHandle`]
//! that stops and joins the server when dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::thread;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use contract_probe_core::ApiSpecification;
use contract_probe_core::HttpMethod;
use contract_probe_core::PREFER_HEADER;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

use crate::MockError;
use crate::backend::MockBackend;
use crate::backend::MockResponse;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the router answering every path from `backend`.
pub fn mock_router(backend: Arc<MockBackend>) -> Router {
    Router::new().fallback(handle_request).with_state(backend)
}

/// Serves `backend` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an I/O error when the server fails.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    backend: Arc<MockBackend>,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, mock_router(backend)).with_graceful_shutdown(shutdown).await
}

/// Answers one request.
async fn handle_request(
    State(backend): State<Arc<MockBackend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let Ok(method) = method.as_str().parse::<HttpMethod>() else {
        let body = json!({
            "code": "MOCK_METHOD_NOT_ALLOWED",
            "message": format!("unsupported method {method}"),
        });
        return (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
    };
    let prefer = headers.get(PREFER_HEADER).and_then(|value| value.to_str().ok());
    into_http(backend.respond(method, uri.path(), prefer))
}

/// Converts a mock response into an HTTP response.
fn into_http(response: MockResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let Some(body) = response.body else {
        return status.into_response();
    };
    let payload = match serde_json::to_vec(&body) {
        Ok(payload) => payload,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };
    let content_type = response.content_type.unwrap_or_else(|| "application/json".to_string());
    (status, [(CONTENT_TYPE, content_type)], payload).into_response()
}

// ============================================================================
// SECTION: Spawned Server
// ============================================================================

/// Handle for an in-process mock server.
pub struct MockHandle {
    /// Bound address.
    addr: SocketAddr,
    /// Shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread, yielding the result of [`serve`].
    join: Option<thread::JoinHandle<io::Result<()>>>,
}

impl MockHandle {
    /// Returns the bound address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the base URL (`http://127.0.0.1:port`).
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns true while the server thread has not exited.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|join| !join.is_finished())
    }

    /// Stops the server and reports how it ended.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Serve`] when the server failed, and
    /// [`MockError::Runtime`] when its thread panicked.
    pub fn shutdown(mut self) -> Result<(), MockError> {
        self.stop()
    }

    /// Signals shutdown and joins the server thread once.
    fn stop(&mut self) -> Result<(), MockError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        match join.join() {
            Ok(result) => result.map_err(|source| MockError::Serve {
                addr: self.addr.to_string(),
                source,
            }),
            Err(_) => Err(MockError::Runtime(format!("mock server thread for {} panicked", self.addr))),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Binds `bind` and serves `specification` on a dedicated thread.
///
/// Port `0` picks a free port; read it back with [`MockHandle::addr`]. The
/// listener is registered with the runtime before the thread starts, so every
/// setup failure is returned here rather than lost on the server thread.
///
/// # Errors
///
/// Returns [`MockError::Bind`] when the address cannot be bound or registered,
/// and [`MockError::Runtime`] when the runtime cannot be built.
pub fn spawn_mock(
    specification: Arc<ApiSpecification>,
    bind: SocketAddr,
) -> Result<MockHandle, MockError> {
    let bind_error = |source| MockError::Bind {
        addr: bind.to_string(),
        source,
    };
    let listener = StdTcpListener::bind(bind).map_err(bind_error)?;
    listener.set_nonblocking(true).map_err(bind_error)?;
    let addr = listener.local_addr().map_err(bind_error)?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| MockError::Runtime(err.to_string()))?;
    let listener = {
        let _entered = runtime.enter();
        tokio::net::TcpListener::from_std(listener).map_err(bind_error)?
    };

    let backend = Arc::new(MockBackend::new(specification));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        runtime.block_on(serve(listener, backend, async move {
            let _ = shutdown_rx.await;
        }))
    });
    Ok(MockHandle {
        addr,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}
