//! A [`guest_core::platform::Platform`] backed by real Linux syscalls.

use guest_core::platform::Platform;

/// Flushes the page cache with `sync(2)`, then asks the kernel to power the
/// machine off with `reboot(2)`. On a guest that actually owns PID 1 (or has
/// the right capabilities) `halt` never returns; in any sandboxed or
/// under-privileged environment `reboot(2)` fails and `halt` returns `false`
/// so the caller can log it.
pub struct LinuxPlatform;

impl Platform for LinuxPlatform {
    fn sync(&self) {
        // SAFETY: `sync(2)` takes no arguments and cannot fail in a way that
        // is observable to the caller.
        unsafe { libc::sync() };
    }

    fn halt(&self) -> bool {
        // SAFETY: `reboot(2)` with `LINUX_REBOOT_CMD_POWER_OFF` takes no
        // pointers; a non-zero return means the syscall itself failed
        // (e.g. missing CAP_SYS_BOOT), not that the machine is in a bad
        // state.
        let rc = unsafe { libc::reboot(libc::LINUX_REBOOT_CMD_POWER_OFF) };
        rc == 0
    }
}
