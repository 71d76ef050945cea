//! Terminal state shared with the interactive prompts.

use console::Term;

/// Puts the terminal back into line mode with echo and a visible cursor.
///
/// A prompt abandoned mid-read (hidden authtoken input, raw key reads) can
/// leave echo off when the process exits. Errors are ignored: without a
/// terminal there is nothing to restore.
pub fn restore() {
    let _ = Term::stderr().show_cursor();
    let _ = Term::stdout().show_cursor();

    #[cfg(unix)]
    restore_line_mode();
}

#[cfg(unix)]
fn restore_line_mode() {
    use std::os::fd::AsRawFd;

    // Prompts read from the controlling terminal, not necessarily stdin.
    let Ok(tty) = std::fs::File::open("/dev/tty") else {
        return;
    };
    let fd = tty.as_raw_fd();
    unsafe {
        let mut attrs: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut attrs) == 0 {
            attrs.c_lflag |= libc::ECHO | libc::ICANON | libc::ISIG;
            libc::tcsetattr(fd, libc::TCSANOW, &attrs);
        }
    }
}
