//! Owns the libinput multiplexer and turns its event stream into
//! [`KeystrokeEvent`]s, coalesced for the store.

use std::os::fd::BorrowedFd;
use std::os::unix::io::AsRawFd;
use std::time::{Duration, Instant};

use input::event::device::DeviceEvent;
use input::event::keyboard::{KeyState, KeyboardEvent, KeyboardEventTrait};
use input::event::{Event, EventTrait};
use input::{DeviceCapability, Libinput};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use thiserror::Error;

use crate::input::buffer::CoalescingBuffer;
use crate::input::interface::RestrictedInterface;
use crate::model::KeystrokeEvent;
use crate::permissions::{require_input_group, PermissionCheckError};

/// How long a single `tick()` is allowed to block waiting for readability.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to assign seat0 to the libinput context")]
    SeatAssignment,

    #[error(transparent)]
    Permission(#[from] PermissionCheckError),

    #[error("no accessible keyboard devices were found on seat0")]
    NoDevices,

    #[error("polling the input multiplexer's fd failed: {0}")]
    Poll(#[source] nix::Error),

    #[error("dispatching libinput events failed: {0}")]
    Dispatch(#[source] std::io::Error),
}

type FlushCallback = Box<dyn FnMut(&[KeystrokeEvent]) -> Result<(), Box<dyn std::error::Error>>>;

/// Owns the multiplexer handle, the coalescing buffer, and the flush
/// callback wired to the store. Construction performs every required step
/// in order and propagates the first failure.
pub struct EventHandler {
    context: Libinput,
    buffer: CoalescingBuffer,
    flush_callback: Option<FlushCallback>,
}

impl EventHandler {
    /// `new()`: multiplexer init → seat assignment to `seat0` → permission
    /// check → accessibility check → initialize `window_start`.
    pub fn new() -> Result<Self, InputError> {
        let mut context = Libinput::new_with_udev(RestrictedInterface);
        context
            .udev_assign_seat("seat0")
            .map_err(|()| InputError::SeatAssignment)?;

        require_input_group()?;
        require_accessible_devices(&mut context)?;

        Ok(Self {
            context,
            buffer: CoalescingBuffer::new(),
            flush_callback: None,
        })
    }

    /// Builds a handler around an already-initialized, seat-assigned
    /// context, skipping the permission/accessibility gates. Used by tests
    /// that exercise `tick`/`flush` without root or real devices.
    #[cfg(test)]
    pub(crate) fn from_context(context: Libinput) -> Self {
        Self {
            context,
            buffer: CoalescingBuffer::new(),
            flush_callback: None,
        }
    }

    /// Installs the callback invoked with a borrow of the pending batch on
    /// every flush, replacing any previous callback.
    pub fn set_flush_callback<F>(&mut self, f: F)
    where
        F: FnMut(&[KeystrokeEvent]) -> Result<(), Box<dyn std::error::Error>> + 'static,
    {
        self.flush_callback = Some(Box::new(f));
    }

    /// One iteration of the input loop: wait up to [`POLL_TIMEOUT`] for
    /// readability, drain ready events, push PRESSED keyboard events into
    /// the buffer, then flush if the size/time predicate holds. Never
    /// blocks longer than `POLL_TIMEOUT`.
    pub fn tick(&mut self) -> Result<(), InputError> {
        // SAFETY: the raw fd is valid for the duration of this call since we
        // hold `&mut self`, keeping the libinput context (and its fd) alive.
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.context.as_raw_fd()) };
        let mut fds = [PollFd::new(borrowed_fd, PollFlags::POLLIN)];
        let timeout = PollTimeout::from(POLL_TIMEOUT.as_millis() as u16);
        let ready = poll(&mut fds, timeout).map_err(InputError::Poll)?;

        if ready > 0 {
            self.context.dispatch().map_err(InputError::Dispatch)?;
            self.drain_ready_events();
        }

        if self.buffer.should_flush(Instant::now()) {
            self.flush();
        }
        Ok(())
    }

    fn drain_ready_events(&mut self) {
        while let Some(event) = self.context.next() {
            match event {
                Event::Keyboard(KeyboardEvent::Key(key_event)) => {
                    if key_event.key_state() == KeyState::Pressed {
                        let scan_code = key_event.key();
                        let name = evdev_key_name(scan_code);
                        self.buffer
                            .push(KeystrokeEvent::new(scan_code, name.as_deref()));
                    }
                }
                Event::Device(DeviceEvent::Added(added)) => {
                    log::info!("input device added: {}", added.device().name());
                }
                Event::Device(DeviceEvent::Removed(removed)) => {
                    log::info!("input device removed: {}", removed.device().name());
                }
                _ => {}
            }
        }
    }

    /// Invokes the flush callback with the pending batch (if non-empty),
    /// then clears the buffer and resets `window_start` regardless of
    /// whether the callback succeeded: forward progress beats retry.
    pub fn flush(&mut self) {
        let now = Instant::now();
        if self.buffer.is_empty() {
            return;
        }
        let batch = self.buffer.take(now);

        if let Some(callback) = self.flush_callback.as_mut() {
            if let Err(e) = callback(&batch) {
                log::error!("flush callback failed, batch of {} events dropped: {e}", batch.len());
            } else {
                log::debug!("flushed {} events", batch.len());
            }
        } else {
            log::warn!("flush() called with no callback installed; {} events dropped", batch.len());
        }
    }
}

/// Looks up the kernel's symbolic name for a scan code via the `evdev`
/// crate's key table, which is generated from the same
/// `linux/input-event-codes.h` vocabulary libinput itself uses.
fn evdev_key_name(scan_code: u32) -> Option<String> {
    let Ok(code) = u16::try_from(scan_code) else {
        return None;
    };
    let key = evdev::Key::new(code);
    let name = format!("{key:?}");
    if name.starts_with("KEY_") || name.starts_with("BTN_") {
        Some(name)
    } else {
        None
    }
}

/// Drains at least one `DEVICE_ADDED` event and requires at least one
/// reported device to advertise the keyboard capability.
pub(crate) fn require_accessible_devices(context: &mut Libinput) -> Result<(), InputError> {
    // SAFETY: the raw fd is valid for the duration of this call since we
    // hold `&mut context`, keeping the libinput context (and its fd) alive.
    let borrowed_fd = unsafe { BorrowedFd::borrow_raw(context.as_raw_fd()) };
    let mut fds = [PollFd::new(borrowed_fd, PollFlags::POLLIN)];
    // Seat assignment enumerates existing devices as a burst of
    // DEVICE_ADDED events; give the kernel a generous window to deliver them.
    poll(&mut fds, PollTimeout::from(1000u16)).map_err(InputError::Poll)?;
    context.dispatch().map_err(InputError::Dispatch)?;

    let mut saw_any_device = false;
    let mut saw_keyboard = false;
    for event in context.by_ref() {
        if let Event::Device(DeviceEvent::Added(added)) = event {
            saw_any_device = true;
            if added.device().has_capability(DeviceCapability::Keyboard) {
                saw_keyboard = true;
            }
        }
    }

    if saw_any_device && saw_keyboard {
        Ok(())
    } else {
        Err(InputError::NoDevices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn handler() -> EventHandler {
        EventHandler::from_context(Libinput::new_with_udev(RestrictedInterface))
    }

    #[test]
    fn flush_is_a_noop_when_buffer_is_empty() {
        let mut handler = handler();
        let calls = Rc::new(RefCell::new(0));
        let calls_clone = Rc::clone(&calls);
        handler.set_flush_callback(move |_batch| {
            *calls_clone.borrow_mut() += 1;
            Ok(())
        });
        handler.flush();
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn flush_invokes_callback_with_pending_batch_and_clears_it() {
        let mut handler = handler();
        let seen: Rc<RefCell<Vec<KeystrokeEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        handler.set_flush_callback(move |batch| {
            seen_clone.borrow_mut().extend_from_slice(batch);
            Ok(())
        });

        handler
            .buffer
            .push(KeystrokeEvent::at(30, Some("KEY_A"), "2024-01-01".into()));
        handler
            .buffer
            .push(KeystrokeEvent::at(31, Some("KEY_B"), "2024-01-01".into()));
        handler.flush();

        assert_eq!(seen.borrow().len(), 2);
        assert!(handler.buffer.is_empty());
    }

    #[test]
    fn flush_clears_buffer_even_when_callback_errors() {
        let mut handler = handler();
        handler.set_flush_callback(|_batch| Err("store unavailable".into()));

        handler
            .buffer
            .push(KeystrokeEvent::at(30, Some("KEY_A"), "2024-01-01".into()));
        handler.flush();

        assert!(handler.buffer.is_empty());
    }

    #[test]
    fn flush_with_no_callback_still_clears_buffer() {
        let mut handler = handler();
        handler
            .buffer
            .push(KeystrokeEvent::at(30, Some("KEY_A"), "2024-01-01".into()));
        handler.flush();
        assert!(handler.buffer.is_empty());
    }

    #[test]
    fn known_scan_code_resolves_to_kernel_name() {
        // Scan code 30 is KEY_A in linux/input-event-codes.h.
        assert_eq!(evdev_key_name(30).as_deref(), Some("KEY_A"));
    }
}
