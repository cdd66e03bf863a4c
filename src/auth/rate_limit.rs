use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_FAILURES: usize = 5;
const WINDOW: Duration = Duration::from_secs(900);

type ThrottleKey = (IpAddr, String);

/// Failed-login counter shared by the faculty and coordinator login
/// endpoints, keyed by client address and the account being tried.
#[derive(Clone)]
pub struct LoginThrottle {
    failures: Arc<Mutex<HashMap<ThrottleKey, Vec<Instant>>>>,
    max_failures: usize,
    window: Duration,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new(MAX_FAILURES, WINDOW)
    }
}

impl LoginThrottle {
    pub fn new(max_failures: usize, window: Duration) -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window,
        }
    }

    fn key(ip: IpAddr, account: &str) -> ThrottleKey {
        (ip, account.trim().to_string())
    }

    /// True when this address has used up its attempts for the account.
    /// Expired attempts are dropped on the way.
    pub fn is_blocked(&self, ip: IpAddr, account: &str) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let key = Self::key(ip, account);
        let Some(attempts) = map.get_mut(&key) else { return false };

        let now = Instant::now();
        attempts.retain(|t| now.duration_since(*t) < self.window);
        if attempts.is_empty() {
            map.remove(&key);
            return false;
        }
        attempts.len() >= self.max_failures
    }

    pub fn record_failure(&self, ip: IpAddr, account: &str) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(Self::key(ip, account)).or_default().push(Instant::now());
    }

    pub fn clear(&self, ip: IpAddr, account: &str) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&Self::key(ip, account));
    }
}
