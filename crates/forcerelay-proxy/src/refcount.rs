//! Reference-count bookkeeping shared by the proxy objects.

use std::sync::atomic::{AtomicU32, Ordering};

/// Drop one reference, refusing to go below zero. Returns the new count.
///
/// A release after the count already reached zero is a host bug; the stored
/// count stays at zero instead of wrapping around.
pub(crate) fn release(refs: &AtomicU32) -> u32 {
    let mut current = refs.load(Ordering::SeqCst);
    loop {
        if current == 0 {
            return 0;
        }
        match refs.compare_exchange(current, current - 1, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return current - 1,
            Err(observed) => current = observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_counts_down_to_zero() -> Result<(), Box<dyn std::error::Error>> {
        let refs = AtomicU32::new(3);
        assert_eq!(release(&refs), 2);
        assert_eq!(release(&refs), 1);
        assert_eq!(release(&refs), 0);
        Ok(())
    }

    #[test]
    fn test_release_past_zero_stays_at_zero() -> Result<(), Box<dyn std::error::Error>> {
        let refs = AtomicU32::new(1);
        assert_eq!(release(&refs), 0);
        assert_eq!(release(&refs), 0);
        assert_eq!(refs.load(Ordering::SeqCst), 0, "stored count must not wrap");
        Ok(())
    }
}
