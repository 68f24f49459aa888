//! File descriptor limit detection for capping concurrent formatter processes (Unix).

/// Estimated file descriptors held per worker: both ends of the three child pipes while
/// spawning (6), the file being read, and one spare for the formatter's own config lookup.
pub const FDS_PER_WORKER: usize = 8;

/// Fraction of the process FD limit to use (leave headroom for the walk and logging).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur as u64 > i64::MAX as u64 {
        return None;
    }
    Some(cur as u64)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Suggested max worker count so we stay under ~80% of the FD limit.
/// Returns `None` if no limit is available (use caller's value).
pub fn max_workers_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    if usable < FDS_PER_WORKER {
        return Some(1);
    }
    Some(usable / FDS_PER_WORKER)
}

/// Clamp the requested parallelism to what the FD limit allows, never below 1.
pub fn effective_parallelism(requested: usize) -> usize {
    let capped = match max_workers_by_fd_limit() {
        Some(fd_cap) if fd_cap < requested => {
            log::debug!("Capping workers {} -> {} (FD limit ~80%)", requested, fd_cap);
            fd_cap
        }
        _ => requested,
    };
    capped.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_parallelism_is_never_zero() {
        assert!(effective_parallelism(0) >= 1);
        assert!(effective_parallelism(1) == 1);
    }

    #[test]
    fn effective_parallelism_does_not_exceed_request() {
        assert!(effective_parallelism(4) <= 4);
    }
}
