use flashcore_config::ConfigError;
use flashcore_index::BackendError;
use flashcore_shell::ShellError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Shell(#[from] ShellError),
}
