// ============================================================
// Epoch Clock: pure time arithmetic, no storage
// ============================================================

/// One epoch of the external voting protocol, in seconds.
pub const WEEK: u64 = 604_800;

/// Shortest allowed tail of an epoch reserved for the special window: 90 minutes.
pub const MIN_PRE_WINDOW: u64 = 5_400;

/// Shortest allowed head of an epoch reserved for the special window: 30 minutes.
pub const MIN_POST_WINDOW: u64 = 1_800;

/// Epoch boundaries and special-window edges, derived from a fixed offset that
/// aligns epoch 0 with the voting protocol's own schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochClock {
    pub offset: u64,
    pub pre_window: u64,
    pub post_window: u64,
}

impl EpochClock {
    pub fn new(offset: u64, pre_window: u64, post_window: u64) -> Self {
        EpochClock {
            offset,
            pre_window,
            post_window,
        }
    }

    /// `None` before the genesis offset.
    pub fn epoch_of(&self, timestamp: u64) -> Option<u64> {
        if timestamp < self.offset {
            return None;
        }
        Some((timestamp - self.offset) / WEEK)
    }

    pub fn epoch_start(&self, epoch: u64) -> u64 {
        self.offset.saturating_add(epoch.saturating_mul(WEEK))
    }

    pub fn epoch_end(&self, epoch: u64) -> u64 {
        self.epoch_start(epoch.saturating_add(1)) - 1
    }

    /// Regular operations reopen here, `post_window` seconds into `epoch`.
    pub fn window_open_at(&self, epoch: u64) -> u64 {
        self.epoch_start(epoch).saturating_add(self.post_window)
    }

    /// Regular operations close here, `pre_window` seconds before `epoch` ends.
    pub fn window_close_at(&self, epoch: u64) -> u64 {
        self.epoch_end(epoch).saturating_sub(self.pre_window)
    }

    /// The window straddling the boundary between `epoch` and `epoch + 1`:
    /// open strictly after `window_close_at(epoch)`, up to and including
    /// `window_open_at(epoch + 1)`.
    pub fn in_window(&self, epoch: u64, now: u64) -> bool {
        self.window_close_at(epoch) < now && now <= self.window_open_at(epoch.saturating_add(1))
    }
}

pub fn window_durations_valid(pre_window: u64, post_window: u64) -> bool {
    pre_window >= MIN_PRE_WINDOW
        && post_window >= MIN_POST_WINDOW
        && pre_window.saturating_add(post_window) < WEEK
}
