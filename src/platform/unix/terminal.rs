#![allow(unsafe_code)]

use std::fs::OpenOptions;
use std::os::unix::io::AsRawFd;

use crate::error::{EnvError, Result};

/// Controlling terminal; the unix counterpart of `CONOUT$`.
const TTY_PATH: &str = "/dev/tty";

/// Column count of the controlling terminal.
///
/// The tty handle is closed when `tty` drops, on every path.
pub(crate) fn columns() -> Result<u16> {
    let tty = OpenOptions::new()
        .read(true)
        .write(true)
        .open(TTY_PATH)
        .map_err(|e| EnvError::ConsoleQuery {
            function: "open(/dev/tty)",
            detail: e.to_string(),
        })?;

    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: the fd belongs to `tty`, which outlives this call, and `size`
    // is a properly sized, writable winsize for TIOCGWINSZ to fill.
    let rc = unsafe { libc::ioctl(tty.as_raw_fd(), libc::TIOCGWINSZ, &mut size) };
    if rc != 0 {
        return Err(EnvError::ConsoleQuery {
            function: "ioctl(TIOCGWINSZ)",
            detail: std::io::Error::last_os_error().to_string(),
        });
    }
    width_of(&size)
}

/// Column count from a filled `winsize`.  Freshly allocated ptys report 0
/// until someone sets their geometry.
fn width_of(size: &libc::winsize) -> Result<u16> {
    match size.ws_col {
        0 => Err(EnvError::ConsoleQuery {
            function: "ioctl(TIOCGWINSZ)",
            detail: "terminal reports zero columns".to_string(),
        }),
        cols => Ok(cols),
    }
}
