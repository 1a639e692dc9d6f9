//! # Skipper Engine
//!
//! Decides whether one workflow run is redundant and which in-flight runs are outdated.
//!
//! ## Architecture
//!
//! ```text
//! ConfigProvider ──> Settings (typed, validated)
//!                        │
//! RunSource ──> DecisionContext (current run, older runs, all runs)
//!                        │
//!                        └──> DecisionEngine (first match wins)
//!                               ├─ 0. setup failure      -> no skip
//!                               ├─ 1. cancel outdated runs (side effect)
//!                               ├─ 2. do_not_skip event   -> no skip
//!                               ├─ 3. duplicate detection -> skip
//!                               ├─ 4. concurrent trigger  -> skip
//!                               ├─ 5. Backtracer (paths)  -> skip
//!                               └─ 6. default             -> no skip
//! ```
//!
//! Every user-facing message goes through the injected [`Reporter`]; the engine never
//! terminates the process itself.

mod backtrace;
mod config;
mod context;
mod engine;
mod error;
mod reporter;
mod source;

pub use backtrace::{Backtracer, MAX_BACKTRACE_DEPTH};
pub use config::{ConfigError, ConfigProvider, MapConfig, Settings};
pub use context::DecisionContext;
pub use engine::{publish_decision, DecisionEngine};
pub use error::{EngineError, Result};
pub use reporter::{MemoryReporter, Message, Reporter};
pub use source::{RunSource, SourceError};

pub use skipper_protocol::{
    Commit, Conclusion, Decision, PathMatcher, Run, RunRef, RunStatus, SkipReason, TriggerEvent,
    WorkflowRuns,
};
