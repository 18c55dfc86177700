//! Capture of text written to the process's stderr during a call.
//!
//! Some providers report open failures only by printing to stderr. Running
//! the open inside [`capture_stderr`] turns that text into a value. The
//! redirection swaps file descriptor 2 for the whole process, so a single
//! process-wide lock serializes every capture scope.

use std::sync::{Mutex, PoisonError};

static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

/// Result of a captured call.
#[derive(Debug)]
pub struct Captured<T> {
    pub value: T,
    /// Everything written to stderr during the call, lossily decoded.
    pub diagnostic: String,
}

/// Run `f` with stderr redirected into a private pipe and return what it
/// wrote alongside its result.
///
/// If the redirection cannot be set up, `f` still runs, uncaptured, and the
/// diagnostic is empty.
pub fn capture_stderr<T>(f: impl FnOnce() -> T) -> Captured<T> {
    let _guard = CAPTURE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    #[cfg(unix)]
    match unix::Redirect::install() {
        Ok(redirect) => {
            let value = f();
            let diagnostic = redirect.finish();
            return Captured { value, diagnostic };
        }
        Err(err) => {
            tracing::warn!(error = %err, "stderr capture unavailable, running uncaptured");
        }
    }

    Captured {
        value: f(),
        diagnostic: String::new(),
    }
}

#[cfg(unix)]
mod unix {
    use std::io::{self, Write};
    use std::os::unix::io::RawFd;

    const STDERR: RawFd = libc::STDERR_FILENO;

    fn cvt(rc: libc::c_int) -> io::Result<libc::c_int> {
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(rc)
        }
    }

    fn set_nonblocking(fd: RawFd) -> io::Result<()> {
        let flags = cvt(unsafe { libc::fcntl(fd, libc::F_GETFL) })?;
        cvt(unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) })?;
        Ok(())
    }

    /// An installed stderr redirection. Dropping it without calling
    /// [`Redirect::finish`] (for example while unwinding) still restores fd 2.
    pub(super) struct Redirect {
        saved: RawFd,
        read: RawFd,
        write: RawFd,
        active: bool,
    }

    impl Redirect {
        pub(super) fn install() -> io::Result<Redirect> {
            let mut fds = [0 as libc::c_int; 2];
            cvt(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
            let (read, write) = (fds[0], fds[1]);

            let setup = || -> io::Result<RawFd> {
                set_nonblocking(read)?;
                set_nonblocking(write)?;
                let _ = io::stderr().flush();
                let saved = cvt(unsafe { libc::dup(STDERR) })?;
                if let Err(err) = cvt(unsafe { libc::dup2(write, STDERR) }) {
                    unsafe { libc::close(saved) };
                    return Err(err);
                }
                Ok(saved)
            };

            match setup() {
                Ok(saved) => Ok(Redirect {
                    saved,
                    read,
                    write,
                    active: true,
                }),
                Err(err) => {
                    unsafe {
                        libc::close(read);
                        libc::close(write);
                    }
                    Err(err)
                }
            }
        }

        fn restore(&mut self) {
            if !self.active {
                return;
            }
            let _ = io::stderr().flush();
            unsafe {
                libc::dup2(self.saved, STDERR);
                libc::close(self.saved);
                libc::close(self.write);
            }
            self.active = false;
        }

        /// Restore stderr, then drain whatever the pipe holds.
        pub(super) fn finish(mut self) -> String {
            self.restore();

            // Every write end is closed now, so the read side ends in EOF
            // (or EAGAIN if a writer was still mid-flight).
            let mut bytes = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = unsafe {
                    libc::read(self.read, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
                };
                if n > 0 {
                    bytes.extend_from_slice(&buf[..n as usize]);
                    continue;
                }
                if n < 0 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                break;
            }
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl Drop for Redirect {
        fn drop(&mut self) {
            self.restore();
            unsafe { libc::close(self.read) };
        }
    }
}
