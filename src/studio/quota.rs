use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::errors::StudioError;

/// Shared "quota exhausted" flag.
///
/// Set by the first quota failure of any feature, cleared only by an explicit
/// dismissal. While set, every feature is rejected before reaching the model.
#[derive(Debug, Clone, Default)]
pub struct QuotaGate(Arc<AtomicBool>);

impl QuotaGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn mark_exhausted(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn dismiss(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn ensure_available(&self) -> Result<(), StudioError> {
        if self.is_exhausted() {
            Err(StudioError::quota_exceeded())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::errors::ErrorKind;

    #[test]
    fn test_gate_is_shared_between_clones() {
        let gate = QuotaGate::new();
        let other = gate.clone();
        assert!(gate.ensure_available().is_ok());

        other.mark_exhausted();
        assert!(gate.is_exhausted());
        assert_eq!(
            gate.ensure_available().unwrap_err().kind,
            ErrorKind::QuotaExceeded
        );

        gate.dismiss();
        assert!(!other.is_exhausted());
    }
}
