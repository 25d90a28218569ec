multiversx_sc::imports!();

use crate::types::Position;

/// Fixed-point scale of the reward accumulator.
pub const SCALE: u64 = 1_000_000_000_000_000_000;

// ============================================================
// Weight Ledger + Reward Accumulator & Synchronizer
//
// total_weight[e] holds the weight eligible for income settled
// out of epoch e. The accumulator only moves on income; the
// pointer only moves through `advance_to`.
// ============================================================

#[multiversx_sc::module]
pub trait RewardLedgerModule:
    crate::config::ConfigModule
    + crate::epoch_gate::EpochGateModule
    + crate::position_registry::PositionRegistryModule
{
    // ========================================================
    // Weight ledger
    // ========================================================

    /// Deposits made inside the window belong to the next epoch, so they
    /// never dilute the total that is about to be settled.
    fn deposit_target_epoch(&self, now: u64) -> u64 {
        let last = self.last_synced_epoch().get();
        if self.window_open(now) {
            last + 1
        } else {
            last
        }
    }

    fn add_weight(&self, epoch: u64, amount: &BigUint) {
        self.total_weight(epoch).update(|total| *total += amount);
    }

    fn remove_weight(&self, position: &Position<Self::Api>) {
        let last = self.last_synced_epoch().get();
        // A future eligible epoch was never carried forward; adjust it in place.
        let epoch = if position.eligible_epoch > last {
            position.eligible_epoch
        } else {
            last
        };
        let total = self.total_weight(epoch).get();
        self.total_weight(epoch)
            .set(self.saturating_sub(&total, &position.voting_weight));
    }

    fn apply_rebase_delta(&self, increase: &BigUint, decrease: &BigUint) {
        let last = self.last_synced_epoch().get();
        let grown = self.total_weight(last).get() + increase;
        self.total_weight(last)
            .set(self.saturating_sub(&grown, decrease));
    }

    // ========================================================
    // Synchronizer
    // ========================================================

    /// Settles everything up to `current_epoch`: distributes `income` over the
    /// weight of the last synced epoch, then folds that weight (and any weight
    /// parked in the epoch after it) into `current_epoch`.
    fn advance_to(&self, current_epoch: u64, income: &BigUint) {
        let last = self.last_synced_epoch().get();
        require!(current_epoch > last, "Epoch already synced");

        let last_total = self.total_weight(last).get();

        if *income > 0u64 {
            self.reward_reserve().update(|reserve| *reserve += income);
            let distributable = income + &self.undistributed_income().get();
            if last_total > 0u64 {
                let increment = &distributable * &self.scale() / &last_total;
                self.acc_reward_scaled().update(|acc| *acc += &increment);
                self.undistributed_income().clear();
            } else {
                self.undistributed_income().set(&distributable);
                self.zero_weight_income_event(last, &distributable);
            }
        }

        let carried = if current_epoch == last + 1 {
            last_total
        } else {
            // Intermediate epochs were never populated; only `last + 1` can hold
            // window deposits made before the gap.
            last_total + self.total_weight(last + 1).get()
        };
        self.total_weight(current_epoch)
            .update(|total| *total += &carried);

        self.last_synced_epoch().set(current_epoch);
        self.epoch_accumulator(current_epoch)
            .set(self.acc_reward_scaled().get());
    }

    /// Runs at the top of every mutating endpoint. Advances the pointer with
    /// zero income once the window of the last synced epoch has passed
    /// without a snapshot.
    fn ensure_synced(&self, now: u64) -> bool {
        let current = self.epoch_at(now);
        let last = self.last_synced_epoch().get();
        if current <= last || self.window_open(now) {
            return false;
        }

        self.advance_to(current, &BigUint::zero());
        self.emergency_sync_event(last, current);
        true
    }

    // ========================================================
    // Settlement
    // ========================================================

    /// Moves the position's baseline to the current accumulator and returns
    /// what it earned since the previous baseline.
    fn accrue(&self, position: &mut Position<Self::Api>) -> BigUint {
        let last = self.last_synced_epoch().get();
        if last <= position.eligible_epoch || position.voting_weight == 0u64 {
            return BigUint::zero();
        }

        let acc = self.acc_reward_scaled().get();
        let checkpoint = self.epoch_accumulator(position.eligible_epoch).get();
        let baseline = if checkpoint > position.reward_baseline {
            checkpoint
        } else {
            position.reward_baseline.clone()
        };

        let earned = &position.voting_weight * &(&acc - &baseline) / &self.scale();
        position.reward_baseline = acc;
        earned
    }

    /// Accrues and drains the pending balance; the caller pays out.
    fn collect(&self, position: &mut Position<Self::Api>) -> BigUint {
        let mut payout = self.accrue(position);
        if position.pending_reward > 0u64 {
            payout += &position.pending_reward;
            position.pending_reward = BigUint::zero();
        }
        if payout > 0u64 {
            let reserve = self.reward_reserve().get();
            self.reward_reserve()
                .set(self.saturating_sub(&reserve, &payout));
        }
        payout
    }

    fn pay_out(&self, to: &ManagedAddress, amount: &BigUint) {
        if *amount == 0u64 {
            return;
        }
        let reward_token = self.reward_token().get();
        self.send().direct_esdt(to, &reward_token, 0, amount);
    }

    // ========================================================
    // Helpers
    // ========================================================

    fn scale(&self) -> BigUint {
        BigUint::from(SCALE)
    }

    fn saturating_sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a > b {
            a - b
        } else {
            BigUint::zero()
        }
    }

    // ========================================================
    // VIEWS
    // ========================================================

    /// Reads against the stored pointer. A due emergency sync carries no
    /// income and leaves the accumulator untouched, so it changes nothing here.
    #[view(getPendingReward)]
    fn get_pending_reward(&self, lock_id: u64) -> BigUint {
        let mut position = self.load_position(lock_id);
        let earned = self.accrue(&mut position);
        earned + &position.pending_reward
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("snapshot")]
    fn snapshot_event(
        &self,
        #[indexed] from_epoch: u64,
        #[indexed] to_epoch: u64,
        income: &BigUint,
    );

    #[event("emergencySync")]
    fn emergency_sync_event(&self, #[indexed] from_epoch: u64, #[indexed] to_epoch: u64);

    #[event("zeroWeightIncome")]
    fn zero_weight_income_event(&self, #[indexed] epoch: u64, undistributed: &BigUint);

    #[event("rebase")]
    fn rebase_event(
        &self,
        #[indexed] epoch: u64,
        #[indexed] increase: &BigUint,
        #[indexed] decrease: &BigUint,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    #[view(getTotalWeight)]
    #[storage_mapper("totalWeight")]
    fn total_weight(&self, epoch: u64) -> SingleValueMapper<BigUint>;

    /// Cumulative reward per unit of weight, scaled by `SCALE`.
    #[view(getAccRewardScaled)]
    #[storage_mapper("accRewardScaled")]
    fn acc_reward_scaled(&self) -> SingleValueMapper<BigUint>;

    /// Accumulator value at the moment the pointer reached each epoch.
    #[view(getEpochAccumulator)]
    #[storage_mapper("epochAccumulator")]
    fn epoch_accumulator(&self, epoch: u64) -> SingleValueMapper<BigUint>;

    /// Reward tokens owed to depositors, claimed or not yet distributed.
    #[view(getRewardReserve)]
    #[storage_mapper("rewardReserve")]
    fn reward_reserve(&self) -> SingleValueMapper<BigUint>;

    /// Income that landed on an epoch with no weight; rolls into the next
    /// harvest that has weight to land on.
    #[view(getUndistributedIncome)]
    #[storage_mapper("undistributedIncome")]
    fn undistributed_income(&self) -> SingleValueMapper<BigUint>;
}
