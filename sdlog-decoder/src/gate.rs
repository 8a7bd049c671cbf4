//! Time-based admission of channel updates
//!
//! The logger occasionally flushes frames out of order; the gate decides per
//! frame whether its payload is trusted to update the telemetry channels.
//! Header fields always reach the output row - gating suppresses channel
//! values only.
//!
//! The rule is kept exactly as the logger firmware applied it, behind a
//! trait so an alternative policy can be injected without touching the
//! pipeline. Its intent was never verified against the hardware protocol,
//! so no "corrected" variant is offered.

/// Per-frame admission policy for channel updates
pub trait GatePolicy {
    /// Decide whether this frame's channel updates are applied. Called once
    /// per frame, in stream order.
    fn admit(&mut self, timestamp_ms: u32, data_length: u8) -> bool;

    /// Forget all history, as at stream start
    fn reset(&mut self);
}

/// The stock policy: admit frames whose timestamp does not run ahead of the
/// previous frame's by more than a small tolerance
///
/// With `delta = previous - current`, a frame is admitted iff it declares a
/// non-empty payload and `delta >= -tolerance`. The first frame of a stream
/// is always admitted. The previous timestamp advances after every frame,
/// admitted or not.
#[derive(Debug, Clone)]
pub struct DeltaGate {
    tolerance_ms: i64,
    previous_ms: Option<u32>,
}

impl DeltaGate {
    /// Tolerance used by the logger firmware
    pub const DEFAULT_TOLERANCE_MS: i64 = 10;

    pub fn new(tolerance_ms: i64) -> Self {
        Self {
            tolerance_ms,
            previous_ms: None,
        }
    }
}

impl Default for DeltaGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOLERANCE_MS)
    }
}

impl GatePolicy for DeltaGate {
    fn admit(&mut self, timestamp_ms: u32, data_length: u8) -> bool {
        let admitted = match self.previous_ms {
            None => true,
            Some(previous) => {
                let delta = i64::from(previous) - i64::from(timestamp_ms);
                data_length > 0 && delta >= -self.tolerance_ms
            }
        };
        self.previous_ms = Some(timestamp_ms);
        admitted
    }

    fn reset(&mut self) {
        self.previous_ms = None;
    }
}

/// Pass-through policy, useful for inspecting ungated output
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl GatePolicy for AdmitAll {
    fn admit(&mut self, _timestamp_ms: u32, _data_length: u8) -> bool {
        true
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_always_admitted() {
        let mut gate = DeltaGate::default();
        // Even with an empty payload
        assert!(gate.admit(5000, 0));
    }

    #[test]
    fn test_small_backstep_admitted() {
        let mut gate = DeltaGate::default();
        assert!(gate.admit(1000, 8));
        // 995 after 1000: delta = +5, within tolerance
        assert!(gate.admit(995, 8));
    }

    #[test]
    fn test_forward_jump_suppressed() {
        let mut gate = DeltaGate::default();
        assert!(gate.admit(1000, 8));
        // 1015 after 1000: delta = -15, past tolerance
        assert!(!gate.admit(1015, 8));
    }

    #[test]
    fn test_empty_payload_suppressed_after_first() {
        let mut gate = DeltaGate::default();
        assert!(gate.admit(1000, 8));
        assert!(!gate.admit(1000, 0));
    }

    #[test]
    fn test_previous_advances_even_when_suppressed() {
        let mut gate = DeltaGate::default();
        assert!(gate.admit(1000, 8));
        assert!(!gate.admit(1015, 8));
        // 1020 relative to 1015 is delta -5: admitted, proving the previous
        // timestamp moved to 1015 despite the suppression
        assert!(gate.admit(1020, 8));
    }

    #[test]
    fn test_reset_restores_first_frame_rule() {
        let mut gate = DeltaGate::default();
        assert!(gate.admit(1000, 8));
        assert!(!gate.admit(2000, 8));
        gate.reset();
        assert!(gate.admit(9000, 8));
    }

    #[test]
    fn test_admit_all() {
        let mut gate = AdmitAll;
        assert!(gate.admit(1000, 0));
        assert!(gate.admit(5000, 0));
    }
}
