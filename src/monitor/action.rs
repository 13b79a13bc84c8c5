//! Recovery action fired when the watched text stalls.
//!
//! The default action runs an AutoHotkey script: the interpreter is either
//! configured or found in its usual install locations, and the script path is
//! passed as the only argument. The wait is bounded; a command that overruns
//! it is killed and counted as a failed invocation.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{ActionInvocationError, ConfigError};
use crate::monitor::config::ActionConfig;

/// Well-known AutoHotkey locations, checked in order.
const WELL_KNOWN_EXECUTABLES: &[&str] = &[
    "AutoHotkey.exe",
    r"C:\Program Files\AutoHotkey\AutoHotkey.exe",
    r"C:\Program Files\AutoHotkey\v2\AutoHotkey64.exe",
    r"C:\Program Files (x86)\AutoHotkey\AutoHotkey.exe",
];

/// Something to run once per stall episode.
pub trait RecoveryAction: Send {
    /// Returns true when the action ran to completion. Never panics.
    fn fire(&mut self) -> bool;
}

/// Runs `<executable> <script>` with a bounded wait.
#[derive(Clone, Debug)]
pub struct ScriptAction {
    executable: PathBuf,
    script: PathBuf,
    wait: Duration,
}

impl ScriptAction {
    pub fn new(executable: PathBuf, script: PathBuf, wait: Duration) -> Self {
        Self {
            executable,
            script,
            wait,
        }
    }

    /// Checks the configured script and locates the executable.
    ///
    /// Both must exist; otherwise monitoring cannot do anything useful and
    /// this is reported as a configuration error at startup.
    pub fn resolve(config: &ActionConfig) -> Result<Self, ConfigError> {
        let script = config.resolved_script_path();
        if !script.is_file() {
            return Err(ConfigError::ScriptNotFound(script));
        }

        let candidates: Vec<PathBuf> = match &config.executable {
            Some(configured) => vec![configured.clone()],
            None => WELL_KNOWN_EXECUTABLES.iter().map(PathBuf::from).collect(),
        };

        let executable = candidates
            .iter()
            .find_map(|candidate| locate_executable(candidate))
            .ok_or(ConfigError::ExecutableNotFound {
                searched: candidates.clone(),
            })?;

        crate::log(&format!(
            "Recovery action: {} {}",
            executable.display(),
            script.display()
        ));
        Ok(Self::new(executable, script, config.wait()))
    }

    /// Runs the script and waits for it to exit. The exit code is not
    /// inspected: a script that ran and returned is a successful invocation.
    pub fn invoke(&self) -> Result<(), ActionInvocationError> {
        if !self.script.is_file() {
            return Err(ActionInvocationError::ScriptMissing(self.script.clone()));
        }
        if self.executable.components().count() > 1 && !self.executable.exists() {
            return Err(ActionInvocationError::ExecutableMissing(
                self.executable.clone(),
            ));
        }

        let mut child = Command::new(&self.executable)
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(ActionInvocationError::Launch)?;

        match child
            .wait_timeout(self.wait)
            .map_err(ActionInvocationError::Wait)?
        {
            Some(status) => {
                crate::log(&format!("Recovery script exited with {}", status));
                Ok(())
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(ActionInvocationError::TimedOut(self.wait))
            }
        }
    }
}

impl RecoveryAction for ScriptAction {
    fn fire(&mut self) -> bool {
        crate::log(&format!(
            "Running recovery script {}",
            self.script.display()
        ));
        match self.invoke() {
            Ok(()) => {
                crate::log("Recovery script executed");
                true
            }
            Err(e) => {
                crate::log(&format!("Recovery action failed: {}", e));
                false
            }
        }
    }
}

/// Returns the usable path for `candidate`: the path itself when it exists,
/// or, for a bare file name, the first match on PATH.
fn locate_executable(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    if candidate.components().count() != 1 {
        return None;
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(candidate))
        .find(|p| p.is_file())
}
