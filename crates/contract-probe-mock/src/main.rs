// crates/contract-probe-mock/src/main.rs
// ============================================================================
// Module: Contract Probe Mock Entry Point
// Description: Command-line launcher for one or more mock backends.
// Purpose: Serve API documents on fixed ports until interrupted.
// Dependencies: clap, contract-probe-config, contract-probe-mock, tokio
// ============================================================================

//! ## Overview
//! `contract-probe-mock --serve api/accounts.yaml=127.0.0.1:4010 --serve
//! api/petstore.yaml=127.0.0.1:4020` loads each document relative to the
//! project root, binds its address, and serves it until Ctrl-C. Every document
//! is loaded and every address bound before any server starts, so a bad
//! argument fails the whole launch. A server that stops on its own ends the
//! launch at once with a failure instead of waiting for Ctrl-C.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use contract_probe_config::HarnessConfig;
use contract_probe_core::ApiSpecification;
use contract_probe_mock::MockBackend;
use contract_probe_mock::MockError;
use contract_probe_mock::serve;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio::task::JoinSet;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Mock backend launcher.
#[derive(Parser, Debug)]
#[command(name = "contract-probe-mock", about = "Serve OpenAPI examples as a cooperating mock")]
struct Cli {
    /// Document and bind address as `<spec>=<addr>`; repeat for several mocks.
    #[arg(long = "serve", value_name = "SPEC=ADDR", required = true)]
    serve: Vec<String>,
    /// Root directory document paths are resolved against.
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
}

/// One parsed `--serve` argument.
struct ServeTarget {
    /// Document path relative to the project root.
    spec: String,
    /// Listen address.
    addr: SocketAddr,
}

/// Parses `<spec>=<addr>`.
fn parse_target(raw: &str) -> Result<ServeTarget, MockError> {
    let (spec, addr) = raw
        .split_once('=')
        .ok_or_else(|| MockError::InvalidServe(format!("{raw}: expected <spec>=<addr>")))?;
    if spec.trim().is_empty() {
        return Err(MockError::InvalidServe(format!("{raw}: document path is empty")));
    }
    let addr = addr
        .trim()
        .parse()
        .map_err(|err| MockError::InvalidServe(format!("{raw}: {err}")))?;
    Ok(ServeTarget {
        spec: spec.trim().to_string(),
        addr,
    })
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            let _ = write_stderr_line(&message);
            ExitCode::FAILURE
        }
    }
}

/// Loads, binds, and serves every target until interrupted.
async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let project_root = match cli.project_root {
        Some(root) => root,
        None => HarnessConfig::load().map_err(|err| err.to_string())?.project_root,
    };

    let mut bound = Vec::with_capacity(cli.serve.len());
    for raw in &cli.serve {
        let target = parse_target(raw).map_err(|err| err.to_string())?;
        let specification = ApiSpecification::load(&project_root, &target.spec)
            .map_err(|err| MockError::from(err).to_string())?;
        let listener = TcpListener::bind(target.addr).await.map_err(|source| {
            MockError::Bind {
                addr: target.addr.to_string(),
                source,
            }
            .to_string()
        })?;
        bound.push((target, listener, Arc::new(MockBackend::new(Arc::new(specification)))));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut servers = JoinSet::new();
    for (target, listener, backend) in bound {
        let _ = write_stderr_line(&format!("serving {} on http://{}", target.spec, target.addr));
        let mut shutdown = shutdown_rx.clone();
        servers.spawn(async move {
            let result = serve(listener, backend, async move {
                let _ = shutdown.changed().await;
            })
            .await;
            (target.spec, result)
        });
    }

    supervise(servers, tokio::signal::ctrl_c(), shutdown_tx).await
}

/// Waits for `interrupt` or the first server exit, then stops and drains the rest.
///
/// A server that exits before shutdown is requested is a failure even when it
/// reports success.
async fn supervise<F>(
    mut servers: JoinSet<(String, io::Result<()>)>,
    interrupt: F,
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), String>
where
    F: Future<Output = io::Result<()>>,
{
    let early = tokio::select! {
        signal = interrupt => {
            signal.map_err(|err| format!("signal handler failed: {err}"))?;
            None
        }
        Some(finished) = servers.join_next() => Some(finished),
    };
    let _ = shutdown_tx.send(true);

    let mut outcome = match early {
        Some(finished) => match server_exit(finished) {
            Ok(spec) => Err(format!("mock server for {spec} stopped before shutdown")),
            Err(message) => Err(message),
        },
        None => Ok(()),
    };
    while let Some(finished) = servers.join_next().await {
        if let Err(message) = server_exit(finished)
            && outcome.is_ok()
        {
            outcome = Err(message);
        }
    }
    outcome
}

/// Maps a finished server task to its document path or a failure message.
fn server_exit(finished: Result<(String, io::Result<()>), JoinError>) -> Result<String, String> {
    match finished {
        Ok((spec, Ok(()))) => Ok(spec),
        Ok((spec, Err(err))) => Err(format!("mock server for {spec} failed: {err}")),
        Err(err) => Err(format!("mock server task failed: {err}")),
    }
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}
