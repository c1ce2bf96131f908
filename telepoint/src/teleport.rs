use crate::core::{to_warp_space, Point};
use crate::platform::CursorSystem;

/// Delay before a teleport's landing position is verified, in seconds.
pub const VERIFY_DELAY: f64 = 0.1;

/// Per-axis tolerance before a verification logs a divergence warning.
pub const DIVERGENCE_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
struct PendingVerification {
    due: f64,
    target: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyOutcome {
    pub target: Point,
    pub actual: Point,
    pub diverged: bool,
}

/// Converts a saved position into warp space, issues the warp, and checks
/// the landing position a short moment later.
///
/// Verification is best-effort observability: a divergence is logged, never
/// retried. Verifications have no cancellation; if a second teleport fires
/// within the delay window of the first, the first verification reads the
/// cursor where the second left it and may log a spurious warning. Accepted
/// behavior, not guarded.
#[derive(Debug, Default)]
pub struct TeleportEngine {
    pending: Vec<PendingVerification>,
}

impl TeleportEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warp the cursor to `target` (given in measurement space). The
    /// conversion into warp space happens exactly once, against the primary
    /// display height read at call time. With no display available the warp
    /// is issued untransformed and unverified, as a degraded fallback.
    pub fn teleport<S: CursorSystem>(&mut self, system: &S, target: Point, now: f64) {
        let Some(primary) = system.primary_display() else {
            tracing::warn!("No display found for coordinate conversion, warping untransformed");
            system.warp_cursor(target);
            return;
        };

        for display in system.displays() {
            tracing::debug!(
                "Display {}: frame ({}, {}) {}x{} scale {}{}",
                display.id,
                display.frame.x,
                display.frame.y,
                display.frame.width,
                display.frame.height,
                display.scale_factor,
                if display.is_main { " (main)" } else { "" }
            );
        }

        let warp_point = to_warp_space(target, primary.frame.height);
        tracing::debug!(
            "Teleporting to ({}, {}), warp point ({}, {})",
            target.x,
            target.y,
            warp_point.x,
            warp_point.y
        );
        system.warp_cursor(warp_point);

        self.pending.push(PendingVerification {
            due: now + VERIFY_DELAY,
            target,
        });
    }

    /// Run every verification whose delay has elapsed. Called from the main
    /// loop tick; outcomes are informational only.
    pub fn run_due_verifications<S: CursorSystem>(
        &mut self,
        system: &S,
        now: f64,
    ) -> Vec<VerifyOutcome> {
        let mut outcomes = Vec::new();

        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due > now {
                i += 1;
                continue;
            }
            let verification = self.pending.remove(i);
            let actual = system.cursor_position();
            let target = verification.target;
            let diverged = (actual.x - target.x).abs() > DIVERGENCE_TOLERANCE
                || (actual.y - target.y).abs() > DIVERGENCE_TOLERANCE;

            if diverged {
                tracing::warn!(
                    "Teleport landed at ({}, {}), expected ({}, {})",
                    actual.x,
                    actual.y,
                    target.x,
                    target.y
                );
            } else {
                tracing::debug!("Teleport verified at ({}, {})", actual.x, actual.y);
            }

            outcomes.push(VerifyOutcome {
                target,
                actual,
                diverged,
            });
        }

        outcomes
    }

    pub fn pending_verifications(&self) -> usize {
        self.pending.len()
    }
}
