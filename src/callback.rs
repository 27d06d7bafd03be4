use crate::EngineOptions;

/// Summary of one evaluated move batch, passed to [`Callback::call`] by the
/// outer optimize loop (external collaborator; the core never calls this
/// itself).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchReport {
    pub batch_index: u64,
    pub moves_evaluated: usize,
    pub best_delta: f64,
    pub feasible: bool,
}

/// Hook invoked once per move batch for logging, monitoring, or early stopping.
pub trait Callback {
    /// Creates a new callback from engine options.
    fn new(options: &EngineOptions) -> Self
    where
        Self: Sized;

    /// Called at the end of each batch with a summary of what it found.
    fn call(&mut self, report: &BatchReport);
}

/// A callback that does nothing. Use when no per-batch output is needed.
pub struct NoOpCallback {}

impl Callback for NoOpCallback {
    fn new(_options: &EngineOptions) -> Self {
        Self {}
    }

    fn call(&mut self, _report: &BatchReport) {
        // Do nothing
    }
}

/// Prints one summary line per batch to stdout.
pub struct BatchSummaryCallback {}

impl Callback for BatchSummaryCallback {
    fn new(_options: &EngineOptions) -> Self {
        Self {}
    }

    fn call(&mut self, report: &BatchReport) {
        let txt = format!(
            "| {:6} | moves={:<6} | best_delta={:<12.4e} | feasible={} |",
            report.batch_index, report.moves_evaluated, report.best_delta, report.feasible,
        );
        println!("{}", txt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_callback_does_not_panic() {
        let options = EngineOptions::default();
        let mut cb = NoOpCallback::new(&options);
        cb.call(&BatchReport {
            batch_index: 0,
            moves_evaluated: 4,
            best_delta: -1.5,
            feasible: true,
        });
    }
}
