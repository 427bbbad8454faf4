//! Pre-flight permission checks.
//!
//! `require_input_group` is the only startup gate that can fail purely on
//! configuration of the *user*, independent of hardware; `require_accessible_devices`
//! additionally needs a live multiplexer and lives in [`crate::input`] next
//! to the code that owns one.

use nix::unistd::{Group, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PermissionCheckError {
    #[error("could not resolve username for current user: {0}")]
    UnknownUser(#[source] nix::Error),

    #[error("the 'input' group does not exist on this system")]
    NoInputGroup,

    #[error(
        "user '{user}' is not a member of the 'input' group.\n\n\
         To fix this, run:\n\n    sudo usermod -a -G input {user}\n\n\
         Then log out and log back in (or reboot) for the new group \
         membership to take effect."
    )]
    NotAMember { user: String },
}

/// Abstraction over `/etc/passwd` + `/etc/group` lookups so permission
/// logic can be unit tested without a real system user database.
pub(crate) trait GroupLookup {
    fn current_username(&self) -> Result<String, PermissionCheckError>;
    fn current_primary_gid(&self) -> u32;
    /// Returns the `input` group's gid and member usernames, if the group exists.
    fn input_group(&self) -> Result<Option<(u32, Vec<String>)>, PermissionCheckError>;
}

struct SystemGroupLookup;

impl GroupLookup for SystemGroupLookup {
    fn current_username(&self) -> Result<String, PermissionCheckError> {
        let uid = nix::unistd::Uid::effective();
        User::from_uid(uid)
            .map_err(PermissionCheckError::UnknownUser)?
            .map(|u| u.name)
            .ok_or(PermissionCheckError::UnknownUser(nix::Error::ENOENT))
    }

    fn current_primary_gid(&self) -> u32 {
        nix::unistd::getgid().as_raw()
    }

    fn input_group(&self) -> Result<Option<(u32, Vec<String>)>, PermissionCheckError> {
        match Group::from_name("input") {
            Ok(Some(group)) => Ok(Some((group.gid.as_raw(), group.mem))),
            Ok(None) => Ok(None),
            Err(e) => Err(PermissionCheckError::UnknownUser(e)),
        }
    }
}

/// Verifies the current user is a member of the `input` group.
///
/// On failure, the returned error's `Display` impl is a two-part
/// remediation message; callers are expected to print it to stderr before
/// exiting.
pub fn require_input_group() -> Result<(), PermissionCheckError> {
    require_input_group_with(&SystemGroupLookup)
}

pub(crate) fn require_input_group_with(
    lookup: &dyn GroupLookup,
) -> Result<(), PermissionCheckError> {
    let username = lookup.current_username()?;
    let (input_gid, members) = lookup
        .input_group()?
        .ok_or(PermissionCheckError::NoInputGroup)?;

    let is_member = members.iter().any(|m| m == &username);
    let is_primary = lookup.current_primary_gid() == input_gid;

    if is_member || is_primary {
        Ok(())
    } else {
        Err(PermissionCheckError::NotAMember { user: username })
    }
}
