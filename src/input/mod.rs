//! Input-acquisition layer: device multiplexing, restricted fd ownership,
//! and coalescing.

pub mod buffer;
mod handler;
mod interface;

pub use buffer::{CoalescingBuffer, BUFFER_SIZE, BUFFER_TIMEOUT};
pub use handler::{EventHandler, InputError, POLL_TIMEOUT};
