use super::SecurityError;

/// Refuses elevated ids: running setuid/setgid (real and effective ids differ) or as root.
///
/// # Errors
/// Returns [`SecurityError::Privileged`] describing the offending id.
pub fn ensure_unprivileged_ids(uid: u32, euid: u32, gid: u32, egid: u32) -> Result<(), SecurityError> {
    let reason = if uid != euid {
        "real and effective user ids differ"
    } else if gid != egid {
        "real and effective group ids differ"
    } else if uid == 0 {
        "running as root"
    } else {
        return Ok(());
    };

    Err(SecurityError::Privileged {
        message: reason.into(),
        context: Some("the server must not run with additional privileges".into()),
    })
}

/// Checks the ids of the current process with [`ensure_unprivileged_ids`].
///
/// # Errors
/// Returns [`SecurityError::Privileged`] if the process is privileged.
#[cfg(unix)]
pub fn ensure_unprivileged() -> Result<(), SecurityError> {
    use nix::unistd::{getegid, geteuid, getgid, getuid};

    ensure_unprivileged_ids(
        getuid().as_raw(),
        geteuid().as_raw(),
        getgid().as_raw(),
        getegid().as_raw(),
    )
}

/// Non-unix targets have no uid model to check.
#[cfg(not(unix))]
pub fn ensure_unprivileged() -> Result<(), SecurityError> {
    Ok(())
}
