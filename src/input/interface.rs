//! Restricted open/close callbacks handed to the libinput multiplexer.
//!
//! libinput never touches device files directly; it calls back into this
//! interface so that, in principle, a privileged helper process could be
//! substituted later without any change to [`crate::input::handler`].

use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::OwnedFd;
use std::path::Path;

use input::LibinputInterface;
use libc::{O_RDWR, O_WRONLY};

pub(crate) struct RestrictedInterface;

impl LibinputInterface for RestrictedInterface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> Result<OwnedFd, i32> {
        let mut options = OpenOptions::new();
        options
            .read(true)
            .write(flags & (O_WRONLY | O_RDWR) != 0)
            .custom_flags(flags);

        options
            .open(path)
            .map(|file| file.into())
            .map_err(|e| e.raw_os_error().unwrap_or(libc::EIO))
    }

    fn close_restricted(&mut self, _fd: OwnedFd) {
        // Dropping the OwnedFd closes it. Close errors are not actionable
        // here: the fd is already gone from our perspective either way.
    }
}
