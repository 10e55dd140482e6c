use std::sync::atomic::{AtomicBool, Ordering};

use super::Behavior;

/// Enable flag for one behavior output.
///
/// Written only by the activation controller; anyone holding an `Arc` to the
/// gate may read it to gate their own work (e.g. skip a tick while disabled).
#[derive(Debug)]
pub struct ActivationGate {
    behavior: Behavior,
    enabled: AtomicBool,
}

impl ActivationGate {
    pub const fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Returns the previous value.
    pub(crate) fn set(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_gate_test() {
        let gate = ActivationGate::new(Behavior::Turning);

        assert!(!gate.is_enabled());
        assert_eq!(gate.behavior(), Behavior::Turning);

        assert!(!gate.set(true));
        assert!(gate.is_enabled());

        assert!(gate.set(false));
        assert!(!gate.is_enabled());
    }
}
