//! Single-flight check runner.
//!
//! The runner makes sure only one check is running at any given time.
//! Callers arriving while a check is in flight join that check and observe
//! its result; the text they passed is not checked. [`CheckRunner::run_tracked`]
//! tells such callers which text the result belongs to. Once a check settles
//! the next call starts a fresh one. Nothing is cached across settled checks.

use std::sync::{Arc, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::debug;

use crate::invocation::{Invoke, ProcessInvoker, build_args, interpret_output};
use crate::resolver::ExecutableResolver;
use crate::server::ServerClient;
use crate::timing::timed;
use crate::{CheckError, FindingsByFile};

/// Result shared by every caller joined on one check.
pub type CheckResult = Result<Arc<FindingsByFile>, CheckError>;

/// A settled check together with the text that was submitted for it.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub submitted: Arc<str>,
    pub result: CheckResult,
}

impl CheckOutcome {
    /// Returns true if this check ran on `text`.
    ///
    /// A caller that joined a check started for another text gets `false`.
    pub fn ran_on(&self, text: &str) -> bool {
        self.submitted.as_ref() == text
    }
}

type InFlight = Shared<BoxFuture<'static, CheckOutcome>>;

/// How checks reach the engine.
enum Transport {
    Cli {
        resolver: Arc<ExecutableResolver>,
        invoker: Arc<dyn Invoke>,
    },
    Server(ServerClient),
}

impl Transport {
    async fn check(&self, text: &str, format: &str) -> Result<FindingsByFile, CheckError> {
        match self {
            Transport::Server(client) => client.check(text, format).await,
            Transport::Cli { resolver, invoker } => {
                let program = resolver.executable_path().await;

                if !resolver.executable_path_exists().await {
                    debug!("Could not find vale at: {}", program.display());
                    return Err(CheckError::MissingExecutable { path: program });
                }

                // Without an explicit config Vale runs its own discovery.
                let config_path = resolver.config_path();
                debug!(
                    "Config path: {}",
                    config_path
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(using Vale discovery)".to_string())
                );

                if let Some(config) = config_path
                    && !resolver.config_path_exists().await
                {
                    debug!("Config file not found at: {}", config.display());
                    return Err(CheckError::MissingConfig {
                        path: config.to_path_buf(),
                    });
                }

                let args = build_args(config_path, format);
                let output = invoker.invoke(&program, &args, text).await?;
                interpret_output(&output)
            }
        }
    }
}

/// Runs checks with at most one in flight.
#[derive(Clone)]
pub struct CheckRunner {
    transport: Arc<Transport>,
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

impl CheckRunner {
    /// Creates a runner that spawns the Vale CLI.
    pub fn cli(resolver: Arc<ExecutableResolver>) -> Self {
        Self::with_invoker(resolver, Arc::new(ProcessInvoker))
    }

    /// Creates a CLI runner with a custom process invoker.
    pub fn with_invoker(resolver: Arc<ExecutableResolver>, invoker: Arc<dyn Invoke>) -> Self {
        Self::from_transport(Transport::Cli { resolver, invoker })
    }

    /// Creates a runner that posts to a Vale server.
    pub fn server(client: ServerClient) -> Self {
        Self::from_transport(Transport::Server(client))
    }

    fn from_transport(transport: Transport) -> Self {
        Self {
            transport: Arc::new(transport),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns true while a check is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Checks `text`, or joins the check already in flight.
    ///
    /// `format` is the extension hint passed to Vale (e.g. `.md`).
    pub async fn run(&self, text: &str, format: &str) -> CheckResult {
        self.run_tracked(text, format).await.result
    }

    /// Like [`CheckRunner::run`], but also returns the text that was checked.
    pub async fn run_tracked(&self, text: &str, format: &str) -> CheckOutcome {
        let check = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(check) => {
                    debug!("Check already in flight, joining it");
                    check.clone()
                }
                None => {
                    debug!("Starting check");
                    let check = self.start(Arc::from(text), format.to_owned());
                    *slot = Some(check.clone());
                    check
                }
            }
        };

        check.await
    }

    fn start(&self, text: Arc<str>, format: String) -> InFlight {
        let transport = Arc::clone(&self.transport);
        let slot: Weak<Mutex<Option<InFlight>>> = Arc::downgrade(&self.in_flight);

        async move {
            let result = timed("CheckRunner::run", transport.check(&text, &format))
                .await
                .map(Arc::new);

            if let Some(slot) = slot.upgrade() {
                slot.lock().take();
            }
            debug!("Check settled (ok: {})", result.is_ok());

            CheckOutcome {
                submitted: text,
                result,
            }
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for CheckRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transport = match self.transport.as_ref() {
            Transport::Cli { .. } => "cli",
            Transport::Server(_) => "server",
        };
        f.debug_struct("CheckRunner")
            .field("transport", &transport)
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}
