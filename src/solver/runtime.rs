// Process-wide solver runtime, initialised once on first use

use crate::domain::SolverBackend;
use std::num::NonZeroUsize;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct SolverRuntime {
    /// Default worker threads handed to a backend
    pub threads: usize,
    /// Backends compiled into this build
    pub backends: Vec<SolverBackend>,
}

static RUNTIME: OnceLock<SolverRuntime> = OnceLock::new();

/// Resolve the runtime; later calls return the same instance
pub fn init() -> &'static SolverRuntime {
    RUNTIME.get_or_init(|| {
        let threads = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let backends = compiled_backends();
        log::info!(
            "solver runtime: {} threads, backends {:?}",
            threads,
            backends
        );
        if backends.is_empty() {
            log::warn!("no solver backend compiled in; enable the `highs` or `coin_cbc` feature");
        }
        SolverRuntime { threads, backends }
    })
}

/// Thread count for a solve: an explicit request wins over the runtime default
pub fn thread_budget(requested: Option<usize>) -> usize {
    requested.filter(|&t| t > 0).unwrap_or_else(|| init().threads)
}

fn compiled_backends() -> Vec<SolverBackend> {
    let mut backends = Vec::new();
    if cfg!(feature = "highs") {
        backends.push(SolverBackend::Highs);
    }
    if cfg!(feature = "coin_cbc") {
        backends.push(SolverBackend::CoinCbc);
    }
    backends
}
