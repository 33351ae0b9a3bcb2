//! Render thread statistics.

/// Counters accumulated by the render thread over its lifetime.
///
/// Returned by [`RenderThread::shutdown`](crate::RenderThread::shutdown).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Commands applied, across all kinds.
    pub commands_applied: u64,
    /// Sequence number of the last applied command.
    pub last_sequence: Option<u64>,
    /// Published frames read and retired.
    pub frames_consumed: u64,
    /// Frames actually drawn (several consumed frames may share one draw).
    pub frames_drawn: u64,
    /// Draw calls submitted.
    pub draw_calls: u64,
    /// Create commands applied.
    pub objects_created: u64,
    /// Destroy commands applied.
    pub objects_destroyed: u64,
    /// Objects still live at shutdown and released then.
    pub objects_released_at_shutdown: u64,
    /// Creates whose resource the backend could not build.
    pub build_failures: u64,
    /// Published transforms for objects destroyed before the frame was read.
    pub stale_transforms_skipped: u64,
    /// Immediate transforms superseded by a newer published frame.
    pub immediate_transforms_ignored: u64,
}

impl RenderStats {
    /// Consumed frames that were folded into a later draw.
    #[must_use]
    pub fn frames_coalesced(&self) -> u64 {
        self.frames_consumed.saturating_sub(self.frames_drawn)
    }

    /// Objects still live when these stats were taken.
    #[must_use]
    pub fn objects_live(&self) -> u64 {
        self.objects_created
            .saturating_sub(self.objects_destroyed)
            .saturating_sub(self.objects_released_at_shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_counters() {
        let stats = RenderStats {
            frames_consumed: 10,
            frames_drawn: 7,
            objects_created: 5,
            objects_destroyed: 2,
            objects_released_at_shutdown: 3,
            ..RenderStats::default()
        };
        assert_eq!(stats.frames_coalesced(), 3);
        assert_eq!(stats.objects_live(), 0);
    }
}
