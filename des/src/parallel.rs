//! Parallel execution of independent simulation scenarios
//!
//! Every scenario builds its own [`Environment`], so no event queue, resource
//! or record buffer is shared between threads. Results come back in
//! scenario-id order whatever the thread count.
//!
//! # Example: one scenario per server count
//!
//! ```rust
//! use des::parallel::run_parallel;
//! use des::{Context, Environment, Process, SimError, Yield};
//!
//! struct Noop;
//! impl Process<usize> for Noop {
//!     fn resume(&mut self, ctx: &mut Context<'_, usize>) -> Result<Yield, SimError> {
//!         ctx.record(1);
//!         Ok(Yield::Finished)
//!     }
//! }
//!
//! let results = run_parallel(3, |scenario_id| {
//!     let mut env = Environment::new();
//!     env.add_resource(scenario_id + 1)?;
//!     env.spawn("noop", Noop)?;
//!     Ok(env)
//! });
//!
//! assert_eq!(results.len(), 3);
//! assert!(results.iter().all(|r| r.as_deref() == Ok(&[1][..])));
//! ```
//!
//! # Error Handling
//!
//! Engine errors and panics in individual scenarios are captured as
//! [`ScenarioFailure`]. Other scenarios continue executing normally.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use crate::{Environment, SimError};

/// Why a scenario produced no records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioFailure {
    #[error("scenario {scenario_id} failed: {source}")]
    Engine {
        scenario_id: usize,
        #[source]
        source: SimError,
    },

    #[error("scenario {scenario_id} panicked: {message}")]
    Panicked { scenario_id: usize, message: String },

    #[error("could not build thread pool: {0}")]
    ThreadPool(String),
}

/// Executes multiple scenarios in parallel
///
/// The builder `F` is called once per scenario id, on the worker thread that
/// runs that scenario, and returns a fresh `Environment` ready to run.
pub struct ParallelRunner<R, F>
where
    F: Fn(usize) -> Result<Environment<R>, SimError> + Send + Sync,
    R: Send,
{
    num_scenarios: usize,
    builder: F,
    num_threads: Option<usize>,
    progress_callback: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl<R, F> ParallelRunner<R, F>
where
    F: Fn(usize) -> Result<Environment<R>, SimError> + Send + Sync,
    R: Send,
{
    pub fn new(num_scenarios: usize, builder: F) -> Self {
        ParallelRunner {
            num_scenarios,
            builder,
            num_threads: None,
            progress_callback: None,
        }
    }

    /// Set number of threads (defaults to rayon's global pool)
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Set progress callback, called with `(completed, total)` after each scenario
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Execute all scenarios and return their records in scenario-id order
    pub fn run(self) -> Vec<Result<Vec<R>, ScenarioFailure>> {
        let progress_counter = Arc::new(AtomicUsize::new(0));

        let pool = match self.num_threads {
            Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    let failure = ScenarioFailure::ThreadPool(err.to_string());
                    return (0..self.num_scenarios).map(|_| Err(failure.clone())).collect();
                }
            },
            None => None,
        };

        let execute = || {
            (0..self.num_scenarios)
                .into_par_iter()
                .map(|scenario_id| {
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> Result<Vec<R>, SimError> {
                        let mut env = (self.builder)(scenario_id)?;
                        env.run_until_idle()?;
                        Ok(env.into_records())
                    }));

                    let completed = progress_counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(completed, self.num_scenarios);
                    }

                    match result {
                        Ok(Ok(records)) => Ok(records),
                        Ok(Err(source)) => Err(ScenarioFailure::Engine {
                            scenario_id,
                            source,
                        }),
                        Err(panic) => Err(ScenarioFailure::Panicked {
                            scenario_id,
                            message: panic_message(panic.as_ref()),
                        }),
                    }
                })
                .collect()
        };

        if let Some(pool) = pool {
            pool.install(execute)
        } else {
            execute()
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run scenarios in parallel with the default pool and no progress reporting
pub fn run_parallel<R, F>(num_scenarios: usize, builder: F) -> Vec<Result<Vec<R>, ScenarioFailure>>
where
    F: Fn(usize) -> Result<Environment<R>, SimError> + Send + Sync,
    R: Send,
{
    ParallelRunner::new(num_scenarios, builder).run()
}

/// Progress callback that logs every `interval` completed scenarios
pub fn simple_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync {
    let interval = interval.max(1);
    move |completed, total| {
        if completed % interval == 0 || completed == total {
            tracing::info!("Completed {}/{} scenarios", completed, total);
        }
    }
}
