//! Error taxonomy for the TypeTrace backend.
//!
//! Every fallible path in the daemon eventually reports through
//! [`TypeTraceError`], which also carries the process exit code spec'd
//! per error kind in the CLI surface.

use thiserror::Error;

use crate::input::InputError;
use crate::paths::PathError;
use crate::permissions::PermissionCheckError;
use crate::store::StoreError;

/// Top-level error type returned by the daemon's startup and run paths.
#[derive(Debug, Error)]
pub enum TypeTraceError {
    /// A CLI flag could not be parsed, or a positional argument was given.
    #[error("wrong argument")]
    WrongArgument,

    /// Neither `XDG_DATA_HOME` nor `HOME` is set, or a parent directory
    /// could not be created.
    #[error("configuration error: {0}")]
    Config(#[from] PathError),

    /// Libinput/udev initialization, seat assignment, the `input`-group
    /// permission check, device-accessibility check, or event dispatch
    /// failed.
    #[error("input layer error: {0}")]
    InputLayer(#[source] InputError),

    /// The embedded store could not be opened, migrated, or written to.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A required system lookup (username, `input` group) failed outright:
    /// the `input` group does not exist, or the current user's name could
    /// not be resolved.
    #[error("system error: {0}")]
    System(String),
}

/// Permission-check failures that stem from the system's user/group
/// database being broken or incomplete (no `input` group, unresolvable
/// username) are system errors, not permission errors: the current user
/// cannot fix them by joining a group. Only `NotAMember` is a genuine
/// permission error.
impl From<InputError> for TypeTraceError {
    fn from(err: InputError) -> Self {
        if let InputError::Permission(PermissionCheckError::NotAMember { .. }) = &err {
            return Self::InputLayer(err);
        }
        if let InputError::Permission(system_cause) = err {
            return Self::System(system_cause.to_string());
        }
        Self::InputLayer(err)
    }
}

impl TypeTraceError {
    /// Does this error ultimately stem from the `input`-group permission
    /// check, i.e. is it worth printing the remediation text in bold red?
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            Self::InputLayer(InputError::Permission(PermissionCheckError::NotAMember { .. }))
        )
    }

    /// The process exit code for this error, per the CLI contract.
    ///
    /// Each kind maps to a distinct small integer so that external
    /// supervisors (systemd, packaging scripts) can distinguish failure
    /// modes without parsing stderr.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::WrongArgument => 1,
            Self::Config(_) => 2,
            Self::InputLayer(InputError::Permission(_)) => 3,
            Self::InputLayer(InputError::NoDevices) => 4,
            Self::InputLayer(_) => 5,
            Self::Store(_) => 6,
            Self::System(_) => 7,
        }
    }
}
