//! Session facade shared by engkit-based command-line tools.
//!
//! ```no_run
//! use engkit_core::{Cli, CliArgs};
//!
//! let args = CliArgs { debug: true, ..CliArgs::default() };
//! let cli = Cli::new("runxhpl", env!("CARGO_PKG_VERSION"), args)?;
//! let _guard = cli.install();
//! cli.print_versions();
//! engkit_log::log_info!(cli, "starting");
//! # Ok::<(), engkit_error::EngError>(())
//! ```

use crate::fileio::{write_file, WriteMode};
use crate::logs::get_formatted_logs;
use crate::randomword::{PhraseSource, WordListPhrase};
use crate::testvar::{check_null, get_debug};
use crate::versions;
use engkit_error::{EngError, EngResult};
use engkit_log::{
    ensure_logdir, get_logdir, get_std_logger, log_debug, Dispatch, LogDirOptions, SessionGuard,
    SessionLog, StdLoggers,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Session arguments, usually filled from a tool's own flags or a JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliArgs {
    /// Run identifier; a random phrase is generated when absent or empty.
    #[serde(default, alias = "logid")]
    pub log_id: Option<String>,
    /// Log directory prefix, `/tmp/logs` when absent.
    #[serde(default)]
    pub prefix: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
}

impl CliArgs {
    /// The run identifier, if one was given.
    pub fn log_id(&self) -> Option<&str> {
        self.log_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The run identifier becomes one directory level, so it may not contain
    /// path separators or parent references.
    pub fn validate(&self) -> EngResult<()> {
        if let Some(id) = self.log_id() {
            let mut components = Path::new(id).components();
            let single_normal = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !single_normal || id.contains('/') {
                log::error!("Invalid Option Error");
                log::debug!("log_id: {:?}", id);
                return Err(EngError::InvalidOption(format!(
                    "log_id must be a single path component: {:?}",
                    id
                )));
            }
        }
        Ok(())
    }
}

/// One tool run: run identifier, log directory and session loggers.
#[derive(Debug)]
pub struct Cli {
    project_name: String,
    version: String,
    args: CliArgs,
    log_id: String,
    logdir: PathBuf,
    loggers: StdLoggers,
    third_party: BTreeMap<String, String>,
}

impl Cli {
    pub fn new(project_name: &str, version: &str, args: CliArgs) -> EngResult<Self> {
        Self::with_phrase_source(project_name, version, args, &WordListPhrase::default())
    }

    /// Like [`Cli::new`], drawing the default run identifier from `source`.
    pub fn with_phrase_source(
        project_name: &str,
        version: &str,
        args: CliArgs,
        source: &dyn PhraseSource,
    ) -> EngResult<Self> {
        check_null(project_name, "project_name")?;
        args.validate()?;

        let log_id = match args.log_id() {
            Some(id) => id.to_string(),
            None => source.phrase()?,
        };
        let mut opts = LogDirOptions::new().with_suffix(log_id.clone());
        if let Some(prefix) = &args.prefix {
            opts = opts.with_prefix(prefix.clone());
        }
        let logdir = get_logdir(project_name, &opts);
        ensure_logdir(&logdir)?;
        let loggers = get_std_logger(project_name, args.debug, Some(&logdir))?;

        let third_party = versions::get_versions(versions::ENGKIT_CRATES);

        Ok(Self {
            project_name: project_name.to_string(),
            version: version.to_string(),
            args,
            log_id,
            logdir,
            loggers,
            third_party,
        })
    }

    /// Also list `name` in [`Cli::print_versions`].
    pub fn with_third_party(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.third_party.insert(name.into(), version.into());
        self
    }

    /// Narrow the logged engkit versions to `names`; unknown names are skipped.
    pub fn with_versions_of(mut self, names: &[&str]) -> Self {
        self.third_party = versions::get_versions(names);
        self
    }

    /// Make this session the thread's default until the guard drops, so `log`
    /// facade records from engkit crates land in it.
    pub fn install(&self) -> SessionGuard {
        engkit_log::install(&self.loggers)
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    pub fn logdir(&self) -> &Path {
        &self.logdir
    }

    pub fn loggers(&self) -> &StdLoggers {
        &self.loggers
    }

    /// Log the tool version, engkit versions and the session args at debug level.
    pub fn print_versions(&self) {
        log_debug!(self, "{} v: {}", self.project_name, self.version);
        for (name, ver) in &self.third_party {
            log_debug!(self, "{} v: {}", name, ver);
        }
        log_debug!(self, "{}", get_debug(&self.args));
    }

    pub fn print_logdir(&self) {
        log_debug!(self, "LOGS: {}", self.logdir.display());
    }

    /// Write named output blocks to the session's `.test.` log.
    pub fn write_logs<I, K, V>(&self, entries: I, mode: WriteMode) -> EngResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        write_file(&self.loggers.test_log(), &get_formatted_logs(entries), mode)
    }

    /// Buffered session output; see [`StdLoggers::get_stdout`].
    pub fn get_stdout(&self) -> EngResult<String> {
        Ok(self.loggers.get_stdout()?)
    }
}

impl SessionLog for Cli {
    fn dispatch(&self) -> &Dispatch {
        self.loggers.dispatch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_logid_key_is_accepted() {
        let args: CliArgs =
            serde_json::from_str(r#"{"logid": "testily-testful-test", "debug": true}"#).unwrap();
        assert_eq!(args.log_id(), Some("testily-testful-test"));
        assert!(args.debug);
        assert_eq!(args.prefix, None);
    }

    #[test]
    fn empty_log_id_counts_as_absent() {
        let args = CliArgs {
            log_id: Some(String::new()),
            ..CliArgs::default()
        };
        assert_eq!(args.log_id(), None);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn log_id_must_be_one_component() {
        for bad in ["../escape", "a/b", "..", "/abs"] {
            let args = CliArgs {
                log_id: Some(bad.to_string()),
                ..CliArgs::default()
            };
            assert!(
                matches!(args.validate(), Err(EngError::InvalidOption(_))),
                "{bad} accepted"
            );
        }
    }
}
