// crates/contract-probe-core/tests/readiness_http.rs
// ============================================================================
// Module: Readiness HTTP Tests
// Description: Readiness polling against throwaway local HTTP servers.
// Purpose: Ensure real responses and refused connections are classified correctly.
// ============================================================================

//! ## Overview
//! Drives [`wait_for_ready`] and [`HttpProbe`] against `tiny_http` servers:
//! - 5xx answers never count as ready, even when they are the only answers
//! - a backend that starts late is picked up by a later attempt
//! - a refused port times out after the configured bound

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use contract_probe_core::HttpProbe;
use contract_probe_core::NoopAuditSink;
use contract_probe_core::ProbeObservation;
use contract_probe_core::ReadinessError;
use contract_probe_core::ReadinessProbe;
use contract_probe_core::ReadinessTarget;
use contract_probe_core::wait_for_ready;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serves `status` to every request until `stop` is set.
fn status_server(status: u16) -> (String, Arc<AtomicBool>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        while !flag.load(Ordering::SeqCst) {
            if let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(20)) {
                let _ = request.respond(Response::from_string("{}").with_status_code(status));
            }
        }
    });
    (format!("http://{addr}/pets"), stop, handle)
}

/// Reserves a local port with nothing listening on it.
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/accounts")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn probe_reports_status_of_live_server() {
    let (url, stop, handle) = status_server(404);
    let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
    let observation = probe.probe(&url.parse().unwrap(), Duration::from_secs(2));
    assert_eq!(observation, ProbeObservation::Status(404));
    assert!(observation.is_ready());
    stop.store(true, Ordering::SeqCst);
    handle.join().unwrap();
}

#[test]
fn probe_reports_transport_error_for_refused_port() {
    let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
    let observation = probe.probe(&refused_url().parse().unwrap(), Duration::from_secs(2));
    assert!(matches!(observation, ProbeObservation::Transport(_)), "{observation:?}");
    assert!(!observation.is_ready());
}

#[test]
fn server_errors_never_count_as_ready() {
    let (url, stop, handle) = status_server(503);
    let target = ReadinessTarget::new(&url, Duration::from_millis(600), Duration::from_millis(100))
        .unwrap();
    let err = wait_for_ready(&target, &NoopAuditSink).unwrap_err();
    match err {
        ReadinessError::Timeout {
            elapsed,
            attempts,
            last,
            ..
        } => {
            assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
            assert!((1..=6).contains(&attempts), "{attempts}");
            assert_eq!(last, ProbeObservation::Status(503));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    stop.store(true, Ordering::SeqCst);
    handle.join().unwrap();
}

#[test]
fn refused_port_times_out_within_bound() {
    let target =
        ReadinessTarget::new(&refused_url(), Duration::from_millis(500), Duration::from_millis(100))
            .unwrap();
    let started = Instant::now();
    let err = wait_for_ready(&target, &NoopAuditSink).unwrap_err();
    assert!(matches!(err, ReadinessError::Timeout { .. }), "{err:?}");
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn late_backend_is_detected() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let starter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        let server = Server::http(addr).unwrap();
        if let Ok(request) = server.recv() {
            let _ = request.respond(Response::from_string("[]").with_status_code(200));
        }
    });
    let target = ReadinessTarget::new(
        &format!("http://{addr}/pets"),
        Duration::from_secs(5),
        Duration::from_millis(100),
    )
    .unwrap();
    let outcome = wait_for_ready(&target, &NoopAuditSink).unwrap();
    assert_eq!(outcome.status, 200);
    assert!(outcome.attempts >= 2, "{outcome:?}");
    starter.join().unwrap();
}

#[test]
fn silent_backend_near_deadline_is_cut_off() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    // Accepts connections (via the backlog) but never answers.
    let holder = thread::spawn(move || {
        thread::sleep(Duration::from_millis(450));
        let silent = TcpListener::bind(addr).unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(silent);
    });
    let target = ReadinessTarget::new(
        &format!("http://{addr}/pets"),
        Duration::from_millis(600),
        Duration::from_millis(100),
    )
    .unwrap();
    let started = Instant::now();
    let err = wait_for_ready(&target, &NoopAuditSink).unwrap_err();
    let waited = started.elapsed();
    assert!(matches!(err, ReadinessError::Timeout { .. }), "{err:?}");
    assert!(waited >= Duration::from_millis(600), "{waited:?}");
    assert!(waited < Duration::from_millis(1_000), "{waited:?}");
    holder.join().unwrap();
}
