// system-tests/src/harness.rs
// ============================================================================
// Module: Backend Harness
// Description: Backend startup, readiness gating, and per-suite contexts.
// Purpose: Give every suite a ready backend and explicitly built clients.
// Dependencies: contract-probe-config, contract-probe-core, contract-probe-mock
// ============================================================================

//! ## Overview
//! [`BackendHarness::start`] loads one API document, spawns the cooperating
//! mock on a free loopback port (or targets the configured external backend),
//! and blocks until the liveness path answers. Suites then build their
//! [`ScenarioContext`] from the harness instead of sharing global state.
//! Invariants:
//! - No request is issued before readiness succeeds.
//! - The mock lives exactly as long as its harness.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use contract_probe_config::AuditLogTarget;
use contract_probe_config::ConfigError;
use contract_probe_config::HarnessConfig;
use contract_probe_core::ApiSpecification;
use contract_probe_core::ContractValidator;
use contract_probe_core::FileAuditSink;
use contract_probe_core::HarnessAuditSink;
use contract_probe_core::HarnessError;
use contract_probe_core::NoopAuditSink;
use contract_probe_core::ReadinessOutcome;
use contract_probe_core::ReadinessTarget;
use contract_probe_core::ScenarioClient;
use contract_probe_core::ScenarioContext;
use contract_probe_core::StderrAuditSink;
use contract_probe_core::wait_for_ready;
use contract_probe_mock::MockError;
use contract_probe_mock::MockHandle;
use contract_probe_mock::spawn_mock;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Petstore API document, relative to the project root.
pub const PETSTORE_DOCUMENT: &str = "api/petstore.yaml";

/// Accounts API document, relative to the project root.
pub const ACCOUNTS_DOCUMENT: &str = "api/accounts.yaml";

/// Petstore liveness path.
const PETSTORE_LIVENESS_PATH: &str = "/pets";

/// Accounts liveness path.
const ACCOUNTS_LIVENESS_PATH: &str = "/accounts";

/// Per-request bound for scenario clients.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while preparing a backend for a suite.
#[derive(Debug, Error)]
pub enum HarnessSetupError {
    /// The environment configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The audit log could not be opened.
    #[error("audit log unavailable: {0}")]
    Audit(#[from] io::Error),
    /// Loading, readiness, or client construction failed.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// The in-process mock could not start.
    #[error(transparent)]
    Mock(#[from] MockError),
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Builds the audit sink selected by `target`.
///
/// # Errors
///
/// Returns an I/O error when a file target cannot be opened for appending.
pub fn audit_sink(target: &AuditLogTarget) -> io::Result<Arc<dyn HarnessAuditSink>> {
    Ok(match target {
        AuditLogTarget::Off => Arc::new(NoopAuditSink),
        AuditLogTarget::Stderr => Arc::new(StderrAuditSink),
        AuditLogTarget::File(path) => Arc::new(FileAuditSink::new(path)?),
    })
}

// ============================================================================
// SECTION: Backend Harness
// ============================================================================

/// One ready backend and the document it serves.
pub struct BackendHarness {
    /// Loaded API document.
    specification: Arc<ApiSpecification>,
    /// Base URL requests are sent to.
    base_url: String,
    /// Readiness result observed at startup.
    readiness: ReadinessOutcome,
    /// Audit sink shared with every client built from this harness.
    audit: Arc<dyn HarnessAuditSink>,
    /// In-process mock, absent for external backends.
    mock: Option<MockHandle>,
}

impl BackendHarness {
    /// Loads `document`, starts its backend, and waits for `liveness_path`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessSetupError`] when the document cannot be loaded, the
    /// mock cannot bind, or the backend does not become ready in time.
    pub fn start(
        config: &HarnessConfig,
        document: &str,
        external_base_url: &str,
        liveness_path: &str,
    ) -> Result<Self, HarnessSetupError> {
        let audit = audit_sink(&config.audit_log)?;
        let specification = ApiSpecification::load(&config.project_root, document)
            .map_err(HarnessError::from)?;
        let specification = Arc::new(specification);
        let (mut mock, base_url) = if config.external_backends {
            (None, external_base_url.trim_end_matches('/').to_string())
        } else {
            let bind = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
            let handle = spawn_mock(Arc::clone(&specification), bind)?;
            let base_url = handle.base_url();
            (Some(handle), base_url)
        };
        let target = ReadinessTarget::new(
            &format!("{base_url}{liveness_path}"),
            config.readiness_timeout,
            config.poll_interval,
        )
        .map_err(HarnessError::from)?;
        let readiness = match wait_for_ready(&target, audit.as_ref()) {
            Ok(readiness) => readiness,
            Err(err) => {
                // An exited mock is reported instead of the timeout it caused.
                if let Some(handle) = mock.take_if(|handle| !handle.is_running()) {
                    handle.shutdown()?;
                }
                return Err(HarnessError::from(err).into());
            }
        };
        Ok(Self {
            specification,
            base_url,
            readiness,
            audit,
            mock,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the loaded document.
    #[must_use]
    pub const fn specification(&self) -> &Arc<ApiSpecification> {
        &self.specification
    }

    /// Returns the readiness result observed at startup.
    #[must_use]
    pub const fn readiness(&self) -> ReadinessOutcome {
        self.readiness
    }

    /// Returns true when the backend is the in-process mock.
    #[must_use]
    pub const fn is_mocked(&self) -> bool {
        self.mock.is_some()
    }

    /// Builds a scenario context over this backend.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessSetupError::Harness`] when a schema does not compile
    /// or the client cannot be built.
    pub fn scenario_context(&self) -> Result<ScenarioContext, HarnessSetupError> {
        let validator = ContractValidator::from_specification(Arc::clone(&self.specification))
            .map_err(HarnessError::from)?;
        let client = ScenarioClient::new(&self.base_url, REQUEST_TIMEOUT, Arc::clone(&self.audit))
            .map_err(HarnessError::from)?;
        Ok(ScenarioContext::new(client, Arc::new(validator), Arc::clone(&self.audit)))
    }
}

// ============================================================================
// SECTION: Suite Harnesses
// ============================================================================

/// Ready petstore backend plus its scenario context.
pub struct PetstoreHarness {
    /// Scenario context bound to the backend.
    context: ScenarioContext,
    /// Backend kept alive for the suite.
    backend: BackendHarness,
}

impl PetstoreHarness {
    /// Starts the petstore backend from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessSetupError`] when configuration or startup fails.
    pub fn start() -> Result<Self, HarnessSetupError> {
        Self::with_config(&HarnessConfig::load()?)
    }

    /// Starts the petstore backend from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessSetupError`] when startup fails.
    pub fn with_config(config: &HarnessConfig) -> Result<Self, HarnessSetupError> {
        let backend = BackendHarness::start(
            config,
            PETSTORE_DOCUMENT,
            &config.petstore_base_url,
            PETSTORE_LIVENESS_PATH,
        )?;
        let context = backend.scenario_context()?;
        Ok(Self {
            context,
            backend,
        })
    }

    /// Returns the scenario context.
    #[must_use]
    pub const fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &BackendHarness {
        &self.backend
    }
}

/// Ready accounts backend plus its scenario context.
///
/// Async accounts clients are built per runtime from [`BackendHarness::base_url`].
pub struct AccountsHarness {
    /// Scenario context for raw contract checks.
    context: ScenarioContext,
    /// Backend kept alive for the suite.
    backend: BackendHarness,
}

impl AccountsHarness {
    /// Starts the accounts backend from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessSetupError`] when configuration or startup fails.
    pub fn start() -> Result<Self, HarnessSetupError> {
        Self::with_config(&HarnessConfig::load()?)
    }

    /// Starts the accounts backend from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessSetupError`] when startup fails.
    pub fn with_config(config: &HarnessConfig) -> Result<Self, HarnessSetupError> {
        let backend = BackendHarness::start(
            config,
            ACCOUNTS_DOCUMENT,
            &config.accounts_base_url,
            ACCOUNTS_LIVENESS_PATH,
        )?;
        let context = backend.scenario_context()?;
        Ok(Self {
            context,
            backend,
        })
    }

    /// Returns the scenario context.
    #[must_use]
    pub const fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &BackendHarness {
        &self.backend
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
