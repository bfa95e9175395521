//! System Manager Process: consumes system events and halts the device on
//! a shutdown request.

use std::process::ExitCode;

use guest_firmware::platform::LinuxPlatform;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut listener = match guest_firmware::open_system_listener() {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = ?e, "failed to open the system manager queue");
            return ExitCode::FAILURE;
        }
    };

    let platform = LinuxPlatform;

    loop {
        if let Err(e) = guest_core::system_manager::run_iteration(&mut listener, &platform) {
            tracing::error!(error = ?e, "system manager iteration failed");
            return ExitCode::FAILURE;
        }
    }
}
