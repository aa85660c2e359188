//! Shared helpers used across modules.

use std::path::Path;

/// Display a path with the home directory replaced by `~`.
///
/// Used in log output so user names do not end up in shared logs.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Check whether a process with the given PID exists.
///
/// Sends signal 0, which performs the permission and existence checks
/// without delivering anything. `EPERM` means the process exists but
/// belongs to someone else.
pub fn is_process_running(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }

    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
