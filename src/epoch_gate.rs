multiversx_sc::imports!();

use crate::epoch_clock::EpochClock;
use crate::types::GatePhase;

// ============================================================
// Special Window Gate
// Whether `now` falls in the window that follows the last
// synchronized epoch. Nothing about the window is stored; it is
// recomputed from the pointer and the block timestamp.
// ============================================================

#[multiversx_sc::module]
pub trait EpochGateModule {
    fn clock(&self) -> EpochClock {
        EpochClock::new(
            self.epoch_offset().get(),
            self.pre_window().get(),
            self.post_window().get(),
        )
    }

    fn epoch_at(&self, now: u64) -> u64 {
        match self.clock().epoch_of(now) {
            Some(epoch) => epoch,
            None => sc_panic!("Before epoch genesis"),
        }
    }

    fn window_open(&self, now: u64) -> bool {
        self.clock().in_window(self.last_synced_epoch().get(), now)
    }

    fn require_phase(&self, phase: GatePhase, now: u64) {
        let inside = self.window_open(now);
        match phase {
            GatePhase::InsideWindow => {
                require!(inside, "Outside special window");
            }
            GatePhase::OutsideWindow => {
                require!(!inside, "Inside special window");
            }
        }
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getCurrentEpoch)]
    fn get_current_epoch(&self) -> u64 {
        self.epoch_at(self.blockchain().get_block_timestamp())
    }

    #[view(isWindowOpen)]
    fn is_window_open(&self) -> bool {
        self.window_open(self.blockchain().get_block_timestamp())
    }

    /// (close, open): the window after `epoch` spans `(close, open]`.
    #[view(getWindowBounds)]
    fn get_window_bounds(&self, epoch: u64) -> MultiValue2<u64, u64> {
        let clock = self.clock();
        (clock.window_close_at(epoch), clock.window_open_at(epoch.saturating_add(1))).into()
    }

    #[view(getWindowDurations)]
    fn get_window_durations(&self) -> MultiValue2<u64, u64> {
        (self.pre_window().get(), self.post_window().get()).into()
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[view(getEpochOffset)]
    #[storage_mapper("epochOffset")]
    fn epoch_offset(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("preWindow")]
    fn pre_window(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("postWindow")]
    fn post_window(&self) -> SingleValueMapper<u64>;

    /// Highest epoch whose weight and accumulator are settled.
    #[view(getLastSyncedEpoch)]
    #[storage_mapper("lastSyncedEpoch")]
    fn last_synced_epoch(&self) -> SingleValueMapper<u64>;
}
