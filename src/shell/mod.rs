//! Subprocesses, the session search path and environment refresh.

pub mod command;
pub mod path;
pub mod platform;
pub mod refresh;

pub use command::{execute, CommandResult, CommandRunner, CommandSpec, SystemRunner};
pub use path::{is_executable, SearchPath};
pub use platform::{is_ci, is_elevated, ShellReloadInfo, ShellType};
pub use refresh::{
    expand_env_refs, refresh, EnvScope, EnvironmentStore, MemoryStore, RefreshOutcome,
    RegistryStore,
};
