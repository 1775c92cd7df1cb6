//! Process-oriented discrete-event simulation engine.
//!
//! An [`Environment`] owns a clock, a time-ordered [`EventQueue`], a set of
//! [`Process`]es and any number of capacity-limited [`Resource`]s. Processes
//! are explicit state machines: each call to [`Process::resume`] runs one
//! stretch of the process and returns a [`Yield`] naming its next suspension
//! point (a timed wait, a resource acquisition, or completion).
//!
//! ```rust
//! use des::{Context, Environment, Process, ResourceId, SimError, Yield};
//!
//! enum Visit { Arrive, Served }
//!
//! struct Customer { desk: ResourceId, stage: Visit }
//!
//! impl Process<f64> for Customer {
//!     fn resume(&mut self, ctx: &mut Context<'_, f64>) -> Result<Yield, SimError> {
//!         match self.stage {
//!             Visit::Arrive => {
//!                 self.stage = Visit::Served;
//!                 Ok(Yield::Acquire(self.desk))
//!             }
//!             Visit::Served => {
//!                 ctx.release(self.desk)?;
//!                 let now = ctx.now();
//!                 ctx.record(now);
//!                 Ok(Yield::Finished)
//!             }
//!         }
//!     }
//! }
//!
//! let mut env = Environment::new();
//! let desk = env.add_resource(1).unwrap();
//! env.spawn("c1", Customer { desk, stage: Visit::Arrive }).unwrap();
//! env.run_until_idle().unwrap();
//! assert_eq!(env.records(), &[0.0]);
//! ```

pub mod environment;
pub mod error;
pub mod parallel;
pub mod process;
pub mod queue;
pub mod resource;

pub use environment::Environment;
pub use error::SimError;
pub use process::{Context, Process, ProcessId, ProcessState, Yield};
pub use queue::{Event, EventQueue};
pub use resource::{Grant, PendingRequest, Resource, ResourceId, ResourceStats};

/// Simulation time. Always finite and never decreasing within one run.
pub type SimTime = f64;
