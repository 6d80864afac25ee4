use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("no path given")]
    EmptyPath,
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Desktop side effects on a result: open with the default handler, or show
/// it in the file manager.
pub trait ShellActions: Send + Sync {
    fn open_path(&self, full_path: &str) -> Result<(), ShellError>;
    fn reveal_path(&self, full_path: &str) -> Result<(), ShellError>;
}

/// Launches the platform's own opener.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl ShellActions for SystemShell {
    fn open_path(&self, full_path: &str) -> Result<(), ShellError> {
        let full_path = non_empty(full_path)?;
        spawn(open_command(full_path))
    }

    fn reveal_path(&self, full_path: &str) -> Result<(), ShellError> {
        let full_path = non_empty(full_path)?;
        spawn(reveal_command(full_path))
    }
}

fn non_empty(path: &str) -> Result<&str, ShellError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        Err(ShellError::EmptyPath)
    } else {
        Ok(trimmed)
    }
}

fn spawn((program, mut command): (&'static str, Command)) -> Result<(), ShellError> {
    tracing::debug!(program, "shell_spawn");
    command
        .spawn()
        .map(|_| ())
        .map_err(|source| ShellError::Spawn { program, source })
}

#[cfg(target_os = "windows")]
fn open_command(path: &str) -> (&'static str, Command) {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", path]);
    ("cmd", command)
}

#[cfg(target_os = "macos")]
fn open_command(path: &str) -> (&'static str, Command) {
    let mut command = Command::new("open");
    command.arg(path);
    ("open", command)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &str) -> (&'static str, Command) {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    ("xdg-open", command)
}

#[cfg(target_os = "windows")]
fn reveal_command(path: &str) -> (&'static str, Command) {
    let mut command = Command::new("explorer");
    command.arg(format!("/select,{path}"));
    ("explorer", command)
}

#[cfg(target_os = "macos")]
fn reveal_command(path: &str) -> (&'static str, Command) {
    let mut command = Command::new("open");
    command.args(["-R", path]);
    ("open", command)
}

// no portable "select in folder"; open the parent instead
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn reveal_command(path: &str) -> (&'static str, Command) {
    let parent = std::path::Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string());
    let mut command = Command::new("xdg-open");
    command.arg(parent);
    ("xdg-open", command)
}
