use async_trait::async_trait;

use guestlist_client::BiometricGate;

/// Implements [BiometricGate] for devices without biometric hardware. The
/// gate reports itself unavailable, so sessions restore directly into the
/// logged-in state.
pub struct NoBiometrics;

#[async_trait]
impl BiometricGate for NoBiometrics {
    fn available(&self) -> bool {
        false
    }

    async fn prompt(&self) -> bool {
        true
    }
}

/// Implements [BiometricGate] with fixed answers, for tests and demos
pub struct StaticGate {
    pub available: bool,
    pub accept: bool,
}

#[async_trait]
impl BiometricGate for StaticGate {
    fn available(&self) -> bool {
        self.available
    }

    async fn prompt(&self) -> bool {
        self.accept
    }
}
