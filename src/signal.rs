//! Dual-flag readiness signal.
//!
//! One flag for "the station holds an address lease", one for "the MQTT
//! session is connected". The platform's event dispatch (a single serialized
//! task) sets and clears the flags; any number of other tasks block on them.
//! Waits are infinite unless a timeout is given, by design: the system
//! prefers hanging over publishing on a dead link.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Flags {
    has_address: bool,
    session_connected: bool,
}

/// Condition-variable readiness signal shared by the link manager, the
/// messaging session, and the sampling loop.
pub struct ReadinessSignal {
    flags: Mutex<Flags>,
    cond: Condvar,
}

impl ReadinessSignal {
    pub fn new() -> Self {
        ReadinessSignal {
            flags: Mutex::new(Flags::default()),
            cond: Condvar::new(),
        }
    }

    pub fn set_address(&self) {
        self.flags.lock().unwrap().has_address = true;
        self.cond.notify_all();
    }

    /// Must run before any re-association is issued, so a blocked publisher
    /// waits instead of sending on a stale lease.
    pub fn clear_address(&self) {
        self.flags.lock().unwrap().has_address = false;
    }

    pub fn set_session(&self) {
        self.flags.lock().unwrap().session_connected = true;
        self.cond.notify_all();
    }

    pub fn clear_session(&self) {
        self.flags.lock().unwrap().session_connected = false;
    }

    pub fn has_address(&self) -> bool {
        self.flags.lock().unwrap().has_address
    }

    pub fn session_connected(&self) -> bool {
        self.flags.lock().unwrap().session_connected
    }

    /// Block until the address flag is set. `None` waits forever.
    /// Returns false only on timeout.
    pub fn wait_for_address(&self, timeout: Option<Duration>) -> bool {
        self.wait(|flags| flags.has_address, timeout)
    }

    /// Block until the session flag is set. `None` waits forever.
    /// Returns false only on timeout.
    pub fn wait_for_session(&self, timeout: Option<Duration>) -> bool {
        self.wait(|flags| flags.session_connected, timeout)
    }

    fn wait(&self, ready: impl Fn(&Flags) -> bool, timeout: Option<Duration>) -> bool {
        let mut flags = self.flags.lock().unwrap();
        match timeout {
            None => {
                while !ready(&flags) {
                    flags = self.cond.wait(flags).unwrap();
                }
                true
            }
            Some(limit) => {
                let deadline = Instant::now() + limit;
                while !ready(&flags) {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    let (guard, _) = self.cond.wait_timeout(flags, deadline - now).unwrap();
                    flags = guard;
                }
                true
            }
        }
    }
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_flags_start_clear() {
        let _ = env_logger::builder().is_test(true).try_init();

        let signal = ReadinessSignal::new();
        assert!(!signal.has_address());
        assert!(!signal.session_connected());
    }

    #[test]
    fn test_set_and_clear_are_independent() {
        let signal = ReadinessSignal::new();
        signal.set_address();
        signal.set_session();
        assert!(signal.has_address());
        assert!(signal.session_connected());

        signal.clear_address();
        assert!(!signal.has_address());
        assert!(signal.session_connected());
    }

    #[test]
    fn test_wait_returns_immediately_when_already_set() {
        let signal = ReadinessSignal::new();
        signal.set_session();
        assert!(signal.wait_for_session(Some(Duration::from_millis(1))));
    }

    #[test]
    fn test_wait_times_out_when_flag_never_set() {
        let signal = ReadinessSignal::new();
        assert!(!signal.wait_for_address(Some(Duration::from_millis(20))));
    }

    #[test]
    fn test_wait_wakes_on_set_from_other_thread() {
        let signal = Arc::new(ReadinessSignal::new());

        let setter = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            setter.set_address();
        });

        assert!(signal.wait_for_address(Some(Duration::from_secs(5))));
        handle.join().unwrap();
    }

    #[test]
    fn test_multiple_waiters_all_wake() {
        let signal = Arc::new(ReadinessSignal::new());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = Arc::clone(&signal);
                thread::spawn(move || signal.wait_for_session(Some(Duration::from_secs(5))))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        signal.set_session();

        for waiter in waiters {
            assert!(waiter.join().unwrap());
        }
    }
}
