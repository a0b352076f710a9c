use restart_common::{RestartOutcome, RunMode, SkippedEndpoint};
use tracing::{info, warn};

/// Everything a finished run produced.
///
/// `outcomes` holds one entry per container handled, in discovery order.
/// `skipped` holds reachable endpoints that yielded no containers.
#[derive(Debug)]
pub struct RunReport {
    pub mode: RunMode,
    pub outcomes: Vec<RestartOutcome>,
    pub skipped: Vec<SkippedEndpoint>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RestartOutcome> {
        self.outcomes.iter().filter(|o| !o.success())
    }

    pub fn log_summary(&self) {
        let line = format!(
            "{} run finished: {} ok, {} failed, {} endpoints skipped",
            self.mode,
            self.succeeded(),
            self.failed(),
            self.skipped.len()
        );
        if self.failed() > 0 {
            warn!("{}", line);
            for outcome in self.failures() {
                warn!("{}", outcome);
            }
        } else {
            info!("{}", line);
        }
    }
}
