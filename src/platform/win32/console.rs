#![allow(unsafe_code)]

use windows::{
    core::w,
    Win32::{
        Foundation::{CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE},
        Storage::FileSystem::{
            CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE,
            OPEN_EXISTING,
        },
        System::Console::{GetConsoleScreenBufferInfo, CONSOLE_SCREEN_BUFFER_INFO},
    },
};

use crate::error::{EnvError, Result};

/// Console output handle; closed on drop.
struct ConsoleHandle(HANDLE);

impl Drop for ConsoleHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful CreateFileW and is closed
        // exactly once, here.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Width of the console screen buffer, in columns.
///
/// Opens `CONOUT$` rather than using the standard handle so the answer is
/// still correct when stdout is redirected.
pub(crate) fn columns() -> Result<u16> {
    // SAFETY: the file name is a static null-terminated literal; no security
    // attributes or template handle are passed.
    let handle = unsafe {
        CreateFileW(
            w!("CONOUT$"),
            (GENERIC_READ | GENERIC_WRITE).0,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            None,
            OPEN_EXISTING,
            FILE_FLAGS_AND_ATTRIBUTES(0),
            None,
        )
    }
    .map_err(|e| console_error("CreateFileW(CONOUT$)", e))?;
    let console = ConsoleHandle(handle);

    let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
    // SAFETY: `console.0` is a live console output handle and `info` is a
    // writable CONSOLE_SCREEN_BUFFER_INFO owned by this frame.
    unsafe { GetConsoleScreenBufferInfo(console.0, &mut info) }
        .map_err(|e| console_error("GetConsoleScreenBufferInfo", e))?;

    match u16::try_from(info.dwSize.X) {
        Ok(cols) if cols > 0 => Ok(cols),
        _ => Err(EnvError::ConsoleQuery {
            function: "GetConsoleScreenBufferInfo",
            detail: format!("buffer reports {} columns", info.dwSize.X),
        }),
    }
}

fn console_error(function: &'static str, e: windows::core::Error) -> EnvError {
    EnvError::ConsoleQuery {
        function,
        detail: e.message().to_string(),
    }
}
