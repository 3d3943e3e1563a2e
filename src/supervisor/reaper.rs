//! Reaping of replaced proxy processes.
//!
//! After a graceful handoff the old proxy keeps serving in-flight
//! connections and exits on its own. When this process is its parent (the
//! usual case inside a container, where daemonized children are re-parented
//! to us) its exit status must be collected or it lingers as a zombie.
//!
//! Reapers run on plain OS threads, not the runtime's blocking pool: a
//! draining proxy can outlive the controller, and the runtime waits for its
//! blocking tasks on shutdown.

use std::io;
use std::thread::{self, JoinHandle};

/// How a reap attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// The process exited with this status code.
    Exited(i32),
    /// The process was terminated by this signal.
    Signaled(i32),
    /// Not our child, or already collected.
    NoChild,
}

/// Block until `pid` exits, or until there is nothing left to wait for.
///
/// Stopped/continued reports and `EINTR` are not terminal and loop.
/// `ECHILD` ends the wait without error.
pub fn reap(pid: i32) -> io::Result<ReapOutcome> {
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: waitpid only writes the status through a valid, exclusively
        // borrowed pointer.
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };

        if rc == -1 {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::ECHILD) => return Ok(ReapOutcome::NoChild),
                _ => return Err(err),
            }
        }

        if rc != pid {
            continue;
        }
        if libc::WIFEXITED(status) {
            return Ok(ReapOutcome::Exited(libc::WEXITSTATUS(status)));
        }
        if libc::WIFSIGNALED(status) {
            return Ok(ReapOutcome::Signaled(libc::WTERMSIG(status)));
        }
    }
}

/// Reap `pid` on a detached thread. Outcomes are only logged.
pub fn spawn_reaper(pid: i32) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("reaper-{}", pid))
        .spawn(move || match reap(pid) {
            Ok(ReapOutcome::Exited(code)) => {
                tracing::info!(pid, code, "Old proxy process exited");
            }
            Ok(ReapOutcome::Signaled(signal)) => {
                tracing::info!(pid, signal, "Old proxy process terminated by signal");
            }
            Ok(ReapOutcome::NoChild) => {
                tracing::debug!(pid, "No child process to reap");
            }
            Err(e) => {
                tracing::warn!(pid, error = %e, "Failed to reap old proxy process");
            }
        })
}
