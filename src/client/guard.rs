use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::error::ApiError;

/// Keys of mutating actions whose request has not resolved yet.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct InFlightToken {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    pub fn acquire(&self, key: impl Into<String>) -> Result<InFlightToken, ApiError> {
        let key = key.into();
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            log::debug!("Ignoring duplicate submission of {}", key);
            return Err(ApiError::AlreadyInFlight(key));
        }
        Ok(InFlightToken {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_released() {
        let guard = InFlight::default();
        let token = guard.acquire("confirm:1").expect("first");
        assert!(guard.is_pending("confirm:1"));

        let err = guard.acquire("confirm:1").unwrap_err();
        assert!(matches!(err, ApiError::AlreadyInFlight(ref k) if k == "confirm:1"));

        drop(token);
        assert!(!guard.is_pending("confirm:1"));
        assert!(guard.acquire("confirm:1").is_ok());
    }

    #[test]
    fn different_keys_do_not_block_each_other() {
        let guard = InFlight::default();
        let _a = guard.acquire("cancel:1").expect("a");
        assert!(guard.acquire("cancel:2").is_ok());
    }
}
