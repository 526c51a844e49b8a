//! Process-level startup effects: CPU pinning and detaching from the terminal.

#![allow(missing_docs)]

use crate::core::errors::{DwError, Result};

/// Restrict the current process (and the commands it spawns) to `core`.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(core: usize) -> Result<()> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut set = CpuSet::new();
    set.set(core).map_err(|errno| DwError::Platform {
        operation: "sched_setaffinity",
        details: format!("cpu {core} out of range (max {}): {errno}", CpuSet::count()),
    })?;
    sched_setaffinity(Pid::from_raw(0), &set).map_err(|errno| DwError::Platform {
        operation: "sched_setaffinity",
        details: format!("cpu {core}: {errno}"),
    })
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(core: usize) -> Result<()> {
    Err(DwError::Platform {
        operation: "sched_setaffinity",
        details: format!("cpu {core}: affinity is only supported on Linux"),
    })
}

/// Detach from the controlling terminal.
///
/// The working directory is kept so relative trace paths still resolve;
/// stdio is redirected to `/dev/null`.
pub fn daemonize() -> Result<()> {
    nix::unistd::daemon(true, false).map_err(|errno| DwError::Platform {
        operation: "daemon",
        details: errno.to_string(),
    })
}
