//! engkit command runner.
//!
//! Runs external commands and `|`-separated pipe chains, captures the final
//! stage's output and enforces a return-code policy with per-command exemptions.
//!
//! ```no_run
//! use engkit_exec::{ShellOps, SystemRunner};
//!
//! let runner = SystemRunner::new();
//! let result = runner.run("cat /proc/cpuinfo | grep -m1 'model name'")?;
//! println!("{}", result.stdout);
//! # Ok::<(), engkit_error::CommandError>(())
//! ```

pub mod fake;
pub mod guard;
pub mod interrupt;
pub mod ops;
pub mod policy;
pub mod runner;
pub mod spec;
pub mod tokenize;

pub use engkit_error::CommandError;
pub use fake::{CallKind, FakeRunner, Invocation};
pub use guard::ChildGuard;
pub use interrupt::InterruptFlag;
pub use ops::{OutputSink, ShellOps};
pub use policy::ReturnCodePolicy;
pub use runner::{RunnerConfig, SystemRunner};
pub use spec::{CommandResult, CommandSpec, Encoding, SHELL_METACHARS};
pub use tokenize::{is_pattern_tool, prepare, split_pipeline};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
