use std::fmt;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

/// Host operating system family, as far as service control cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    Linux,
    Darwin,
    Unsupported,
}

impl PlatformFamily {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => PlatformFamily::Linux,
            "macos" => PlatformFamily::Darwin,
            _ => PlatformFamily::Unsupported,
        }
    }

    pub fn supports_service_control(self) -> bool {
        !matches!(self, PlatformFamily::Unsupported)
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlatformFamily::Linux => "linux",
            PlatformFamily::Darwin => "darwin",
            PlatformFamily::Unsupported => std::env::consts::OS,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Restart,
}

impl ServiceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Restart => "restart",
        }
    }
}

/// Exit code and trimmed output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs. Split out so service control can be tested
/// without touching the host's service manager.
#[cfg_attr(test, automock)]
pub trait CommandRunner {
    fn exists(&self, program: &str) -> bool;
    fn run(&self, program: &str, args: &[String]) -> CommandOutput;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn exists(&self, program: &str) -> bool {
        std::env::var_os("PATH").is_some_and(|paths| {
            std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(program)))
        })
    }

    fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        match Command::new(program).args(args).output() {
            Ok(output) => CommandOutput {
                code: output.status.code().unwrap_or(1),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => CommandOutput {
                code: 1,
                stdout: String::new(),
                stderr: e.to_string(),
            },
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Starts and restarts the local relay service.
pub trait RelayServiceController {
    fn platform(&self) -> PlatformFamily;
    fn start(&self, service: &str) -> bool;
    fn restart(&self, service: &str) -> bool;
}

/// Service control through `systemctl` (Linux) or `brew services` (macOS).
#[derive(Debug, Clone)]
pub struct SystemServiceController<R = SystemCommandRunner> {
    platform: PlatformFamily,
    runner: R,
}

impl SystemServiceController<SystemCommandRunner> {
    pub fn detect() -> Self {
        Self::new(PlatformFamily::detect(), SystemCommandRunner)
    }
}

impl<R: CommandRunner> SystemServiceController<R> {
    pub fn new(platform: PlatformFamily, runner: R) -> Self {
        Self { platform, runner }
    }

    /// Program and arguments for `action` on this platform.
    pub fn command_for(&self, action: ServiceAction, service: &str) -> Option<(&'static str, Vec<String>)> {
        match self.platform {
            PlatformFamily::Linux => Some((
                "systemctl",
                vec![action.as_str().to_string(), service.to_string()],
            )),
            PlatformFamily::Darwin => Some((
                "brew",
                vec![
                    "services".to_string(),
                    action.as_str().to_string(),
                    service.to_string(),
                ],
            )),
            PlatformFamily::Unsupported => None,
        }
    }

    fn invoke(&self, action: ServiceAction, service: &str) -> bool {
        let Some((program, args)) = self.command_for(action, service) else {
            warn!(
                platform = %self.platform,
                action = action.as_str(),
                "Unsupported platform, skipping relay service control"
            );
            return false;
        };

        if !self.runner.exists(program) {
            warn!(
                program,
                platform = %self.platform,
                action = action.as_str(),
                "Service manager not found on PATH"
            );
            return false;
        }

        let output = self.runner.run(program, &args);
        info!(
            service,
            action = action.as_str(),
            rc = output.code,
            stdout = %output.stdout,
            stderr = %output.stderr,
            "Relay service command finished"
        );
        output.code == 0
    }
}

impl<R: CommandRunner> RelayServiceController for SystemServiceController<R> {
    fn platform(&self) -> PlatformFamily {
        self.platform
    }

    fn start(&self, service: &str) -> bool {
        self.invoke(ServiceAction::Start, service)
    }

    fn restart(&self, service: &str) -> bool {
        self.invoke(ServiceAction::Restart, service)
    }
}
