#![no_std]

multiversx_sc::imports!();

pub mod config;
pub mod eligibility_proxy;
pub mod epoch_clock;
pub mod epoch_gate;
pub mod escrow_proxy;
pub mod position_registry;
pub mod reward_ledger;
pub mod types;
pub mod voter_proxy;

use epoch_clock::window_durations_valid;
use types::{GatePhase, Position};

// ============================================================
// Contract
// Pools perpetually-locked voting-escrow NFTs, votes with them
// during the special window around each epoch boundary and pays
// harvested income back pro rata to contributed weight.
// ============================================================

#[multiversx_sc::contract]
pub trait LockRelay:
    config::ConfigModule
    + epoch_gate::EpochGateModule
    + position_registry::PositionRegistryModule
    + reward_ledger::RewardLedgerModule
{
    // ========================================================
    // Init / Upgrade
    // ========================================================

    #[init]
    fn init(
        &self,
        lock_token: TokenIdentifier,
        reward_token: TokenIdentifier,
        escrow_address: ManagedAddress,
        voter_address: ManagedAddress,
        epoch_offset: u64,
        pre_window: u64,
        post_window: u64,
    ) {
        require!(lock_token.is_valid_esdt_identifier(), "Invalid lock token");
        require!(reward_token.is_valid_esdt_identifier(), "Invalid reward token");
        require!(lock_token != reward_token, "Lock and reward token must differ");
        require!(
            window_durations_valid(pre_window, post_window),
            "Invalid window durations"
        );

        let now = self.blockchain().get_block_timestamp();
        require!(now >= epoch_offset, "Epoch offset in the future");

        self.lock_token().set(&lock_token);
        self.reward_token().set(&reward_token);
        self.escrow_address().set(&escrow_address);
        self.voter_address().set(&voter_address);
        self.epoch_offset().set(epoch_offset);
        self.pre_window().set(pre_window);
        self.post_window().set(post_window);
        self.paused().set(false);

        let genesis_epoch = self.epoch_at(now);
        self.last_synced_epoch().set(genesis_epoch);
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: deposit
    // Accepts one lock NFT. Inside the window the position only
    // starts earning from the next epoch.
    // ========================================================

    #[endpoint(deposit)]
    #[payable("*")]
    fn deposit(&self) -> u64 {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_not_paused();

        let payment = self.call_value().single_esdt();
        require!(
            payment.token_identifier == self.lock_token().get(),
            "Not a lock position"
        );
        require!(payment.amount == 1u64, "Lock positions are non-fungible");
        let lock_id = payment.token_nonce;
        require!(
            self.positions(lock_id).is_empty(),
            "Position already deposited"
        );

        let caller = self.blockchain().get_caller();
        let escrow_addr = self.escrow_address().get();

        let voted: bool = self
            .tx()
            .to(&escrow_addr)
            .typed(escrow_proxy::EscrowProxy)
            .is_voted(lock_id)
            .returns(ReturnsResult)
            .sync_call();
        require!(!voted, "Position already voted this epoch");

        let weight: BigUint = self
            .tx()
            .to(&escrow_addr)
            .typed(escrow_proxy::EscrowProxy)
            .get_voting_power(lock_id)
            .returns(ReturnsResult)
            .sync_call();
        require!(weight > 0u64, "Position has no voting power");

        self.require_eligible(lock_id, &caller);

        let eligible_epoch = self.deposit_target_epoch(now);
        self.add_weight(eligible_epoch, &weight);

        let position = Position {
            lock_id,
            owner: caller.clone(),
            voting_weight: weight.clone(),
            reward_baseline: self.acc_reward_scaled().get(),
            eligible_epoch,
            pending_reward: BigUint::zero(),
        };
        self.insert_position(&position);

        self.deposit_event(&caller, lock_id, eligible_epoch, &weight);

        lock_id
    }

    // ========================================================
    // ENDPOINT: withdraw
    // Pays what the position earned, then hands the NFT back.
    // ========================================================

    #[endpoint(withdraw)]
    fn withdraw(&self, lock_id: u64) -> BigUint {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_phase(GatePhase::OutsideWindow, now);

        let caller = self.blockchain().get_caller();
        let mut position = self.load_owned_position(lock_id, &caller);

        let payout = self.collect(&mut position);
        self.remove_weight(&position);
        self.remove_position(lock_id);

        self.pay_out(&caller, &payout);
        let lock_token = self.lock_token().get();
        self.send()
            .direct_esdt(&caller, &lock_token, lock_id, &BigUint::from(1u64));

        self.withdraw_event(&caller, lock_id, &payout);

        payout
    }

    // ========================================================
    // ENDPOINT: claim / claimAll
    // ========================================================

    #[endpoint(claim)]
    fn claim(&self, lock_id: u64) -> BigUint {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_phase(GatePhase::OutsideWindow, now);

        let caller = self.blockchain().get_caller();
        let mut position = self.load_owned_position(lock_id, &caller);

        let payout = self.collect(&mut position);
        self.positions(lock_id).set(&position);

        self.pay_out(&caller, &payout);
        self.claim_event(&caller, lock_id, &payout);

        payout
    }

    #[endpoint(claimAll)]
    fn claim_all(&self) -> BigUint {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_phase(GatePhase::OutsideWindow, now);

        let caller = self.blockchain().get_caller();
        let mut total = BigUint::zero();
        for lock_id in self.owner_positions(&caller).iter() {
            let mut position = self.positions(lock_id).get();
            let payout = self.collect(&mut position);
            self.positions(lock_id).set(&position);
            if payout > 0u64 {
                self.claim_event(&caller, lock_id, &payout);
                total += &payout;
            }
        }

        self.pay_out(&caller, &total);

        total
    }

    // ========================================================
    // ENDPOINT: voteBatch
    // Every listed position casts the same allocation.
    // ========================================================

    #[endpoint(voteBatch)]
    fn vote_batch(
        &self,
        lock_ids: ManagedVec<Self::Api, u64>,
        pools: ManagedVec<Self::Api, ManagedAddress>,
        weights: ManagedVec<Self::Api, BigUint>,
        epoch: u64,
    ) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_operator();
        self.require_phase(GatePhase::InsideWindow, now);
        require!(epoch == self.epoch_at(now), "Epoch mismatch");
        require!(
            !pools.is_empty() && pools.len() == weights.len(),
            "Pools and weights mismatch"
        );

        for lock_id in lock_ids.iter() {
            self.require_held(lock_id);
        }

        let voter_addr = self.voter_address().get();
        for lock_id in lock_ids.iter() {
            self.tx()
                .to(&voter_addr)
                .typed(voter_proxy::VoterProxy)
                .vote(lock_id, pools.clone(), weights.clone())
                .sync_call();
        }

        self.vote_event(epoch, lock_ids.len() as u64);
    }

    // ========================================================
    // ENDPOINT: harvestBribes / harvestFees
    // Incentives land in this contract's balance; the swap stage
    // turns them into reward tokens later.
    // ========================================================

    #[endpoint(harvestBribes)]
    fn harvest_bribes(
        &self,
        lock_ids: ManagedVec<Self::Api, u64>,
        sources: ManagedVec<Self::Api, ManagedAddress>,
        tokens: ManagedVec<Self::Api, TokenIdentifier>,
    ) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_operator();
        self.require_phase(GatePhase::InsideWindow, now);

        let voter_addr = self.voter_address().get();
        for lock_id in lock_ids.iter() {
            self.require_held(lock_id);
            self.tx()
                .to(&voter_addr)
                .typed(voter_proxy::VoterProxy)
                .claim_bribes(lock_id, sources.clone(), tokens.clone())
                .sync_call();
        }

        self.harvest_event(self.last_synced_epoch().get(), lock_ids.len() as u64);
    }

    #[endpoint(harvestFees)]
    fn harvest_fees(
        &self,
        lock_ids: ManagedVec<Self::Api, u64>,
        sources: ManagedVec<Self::Api, ManagedAddress>,
        tokens: ManagedVec<Self::Api, TokenIdentifier>,
    ) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_operator();
        self.require_phase(GatePhase::InsideWindow, now);

        let voter_addr = self.voter_address().get();
        for lock_id in lock_ids.iter() {
            self.require_held(lock_id);
            self.tx()
                .to(&voter_addr)
                .typed(voter_proxy::VoterProxy)
                .claim_fees(lock_id, sources.clone(), tokens.clone())
                .sync_call();
        }

        self.harvest_event(self.last_synced_epoch().get(), lock_ids.len() as u64);
    }

    // ========================================================
    // ENDPOINT: harvestRebase
    // Re-reads escrow weights. Each position first banks what it
    // earned at its old weight.
    // ========================================================

    #[endpoint(harvestRebase)]
    fn harvest_rebase(&self, lock_ids: MultiValueEncoded<u64>) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_operator();
        self.require_phase(GatePhase::OutsideWindow, now);

        let escrow_addr = self.escrow_address().get();
        let mut increase = BigUint::zero();
        let mut decrease = BigUint::zero();

        for lock_id in lock_ids.into_iter() {
            let mut position = self.load_position(lock_id);
            let fresh: BigUint = self
                .tx()
                .to(&escrow_addr)
                .typed(escrow_proxy::EscrowProxy)
                .get_voting_power(lock_id)
                .returns(ReturnsResult)
                .sync_call();
            if fresh == position.voting_weight {
                continue;
            }

            let earned = self.accrue(&mut position);
            position.pending_reward += &earned;

            if fresh > position.voting_weight {
                increase += &(&fresh - &position.voting_weight);
            } else {
                decrease += &(&position.voting_weight - &fresh);
            }
            position.voting_weight = fresh;
            self.positions(lock_id).set(&position);
        }

        self.apply_rebase_delta(&increase, &decrease);
        self.rebase_event(self.last_synced_epoch().get(), &increase, &decrease);
    }

    // ========================================================
    // ENDPOINT: fillSwapStage
    // Ships harvested tokens to the swap stage. The reward reserve
    // and the lock NFTs never leave.
    // ========================================================

    #[endpoint(fillSwapStage)]
    fn fill_swap_stage(&self, tokens: MultiValueEncoded<TokenIdentifier>) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_operator();
        self.require_phase(GatePhase::InsideWindow, now);
        require!(!self.swap_stage().is_empty(), "Swap stage not set");

        let swap_stage = self.swap_stage().get();
        let lock_token = self.lock_token().get();

        for token in tokens.into_iter() {
            require!(token != lock_token, "Lock positions cannot be staged");
            let amount = self.stageable_balance(&token);
            if amount > 0u64 {
                self.send().direct_esdt(&swap_stage, &token, 0, &amount);
                self.swap_staged_event(&swap_stage, &token, &amount);
            }
        }
    }

    // ========================================================
    // ENDPOINT: snapshot
    // Swap stage delivers the converted income and settles the
    // epoch that just ended.
    // ========================================================

    #[endpoint(snapshot)]
    #[payable("*")]
    fn snapshot(&self) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_swap_stage();

        let from_epoch = self.last_synced_epoch().get();
        let current_epoch = self.epoch_at(now);
        require!(current_epoch > from_epoch, "Epoch already synced");
        self.require_phase(GatePhase::InsideWindow, now);

        let income = self.received_income();
        self.advance_to(current_epoch, &income);

        self.snapshot_event(from_epoch, current_epoch, &income);
    }

    // ========================================================
    // ENDPOINT: emergencySync
    // Anyone may push the pointer forward once a window has
    // passed without a snapshot.
    // ========================================================

    #[endpoint(emergencySync)]
    fn emergency_sync(&self) {
        let now = self.blockchain().get_block_timestamp();
        require!(self.ensure_synced(now), "No synchronization due");
    }

    // ========================================================
    // OWNER ENDPOINTS
    // None of these run while the special window is open.
    // ========================================================

    #[endpoint(pause)]
    fn pause(&self) {
        self.require_owner_outside_window();
        self.paused().set(true);
        self.paused_changed_event(true);
    }

    #[endpoint(unpause)]
    fn unpause(&self) {
        self.require_owner_outside_window();
        self.paused().set(false);
        self.paused_changed_event(false);
    }

    /// Moves the window edges, so only allowed while deposits are paused.
    #[endpoint(setWindowDurations)]
    fn set_window_durations(&self, pre_window: u64, post_window: u64) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_owner();
        require!(self.paused().get(), "Pause deposits first");
        self.require_phase(GatePhase::OutsideWindow, now);
        require!(
            window_durations_valid(pre_window, post_window),
            "Invalid window durations"
        );

        self.pre_window().set(pre_window);
        self.post_window().set(post_window);
        self.window_durations_event(pre_window, post_window);
    }

    #[endpoint(setSwapStage)]
    fn set_swap_stage(&self, swap_stage: ManagedAddress) {
        self.require_owner_outside_window();
        require!(!swap_stage.is_zero(), "Invalid swap stage");
        self.swap_stage().set(&swap_stage);
        self.swap_stage_changed_event(&swap_stage);
    }

    #[endpoint(setEligibilityPolicy)]
    fn set_eligibility_policy(&self, policy: OptionalValue<ManagedAddress>) {
        self.require_owner_outside_window();
        match policy {
            OptionalValue::Some(address) => {
                require!(!address.is_zero(), "Invalid eligibility policy");
                self.eligibility_policy().set(&address);
                self.eligibility_policy_changed_event(true);
            }
            OptionalValue::None => {
                self.eligibility_policy().clear();
                self.eligibility_policy_changed_event(false);
            }
        }
    }

    #[endpoint(addOperator)]
    fn add_operator(&self, operator: ManagedAddress) {
        self.require_owner_outside_window();
        self.operators().insert(operator.clone());
        self.operator_changed_event(&operator, true);
    }

    #[endpoint(removeOperator)]
    fn remove_operator(&self, operator: ManagedAddress) {
        self.require_owner_outside_window();
        require!(self.operators().swap_remove(&operator), "Not an operator");
        self.operator_changed_event(&operator, false);
    }

    /// Sweeps tokens nobody is owed. Reward tokens above the reserve count
    /// as stray; lock NFTs never do.
    #[endpoint(recoverTokens)]
    fn recover_tokens(&self, token: TokenIdentifier) -> BigUint {
        self.require_owner_outside_window();
        require!(token != self.lock_token().get(), "Lock positions cannot be recovered");

        let amount = self.stageable_balance(&token);
        if amount > 0u64 {
            let owner = self.blockchain().get_caller();
            self.send().direct_esdt(&owner, &token, 0, &amount);
            self.tokens_recovered_event(&owner, &token, &amount);
        }
        amount
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn require_owner_outside_window(&self) {
        let now = self.blockchain().get_block_timestamp();
        self.ensure_synced(now);
        self.require_owner();
        self.require_phase(GatePhase::OutsideWindow, now);
    }

    fn require_eligible(&self, lock_id: u64, depositor: &ManagedAddress) {
        if self.eligibility_policy().is_empty() {
            return;
        }
        let policy_addr = self.eligibility_policy().get();
        let eligible: bool = self
            .tx()
            .to(&policy_addr)
            .typed(eligibility_proxy::EligibilityProxy)
            .is_eligible(lock_id, depositor.clone())
            .returns(ReturnsResult)
            .sync_call();
        require!(eligible, "Rejected by eligibility policy");
    }

    /// Income attached to a snapshot: nothing, or one reward-token payment.
    fn received_income(&self) -> BigUint {
        require!(
            self.call_value().egld_value().clone_value() == 0u64,
            "Income must be the reward token"
        );
        let transfers = self.call_value().all_esdt_transfers();
        require!(transfers.len() <= 1, "Single income payment expected");
        if transfers.is_empty() {
            return BigUint::zero();
        }

        let payment = transfers.get(0);
        require!(
            payment.token_identifier == self.reward_token().get(),
            "Income must be the reward token"
        );
        payment.amount.clone()
    }

    // ========================================================
    // VIEWS
    // ========================================================

    /// Balance of `token` that is not owed to depositors.
    #[view(getStageableBalance)]
    fn stageable_balance(&self, token: &TokenIdentifier) -> BigUint {
        let balance = self
            .blockchain()
            .get_sc_balance(&EgldOrEsdtTokenIdentifier::esdt(token.clone()), 0);
        if *token == self.reward_token().get() {
            self.saturating_sub(&balance, &self.reward_reserve().get())
        } else {
            balance
        }
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("deposit")]
    fn deposit_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        #[indexed] lock_id: u64,
        #[indexed] eligible_epoch: u64,
        weight: &BigUint,
    );

    #[event("withdraw")]
    fn withdraw_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        #[indexed] lock_id: u64,
        payout: &BigUint,
    );

    #[event("claim")]
    fn claim_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        #[indexed] lock_id: u64,
        payout: &BigUint,
    );

    #[event("vote")]
    fn vote_event(&self, #[indexed] epoch: u64, #[indexed] positions: u64);

    #[event("harvest")]
    fn harvest_event(&self, #[indexed] epoch: u64, #[indexed] positions: u64);

    #[event("swapStaged")]
    fn swap_staged_event(
        &self,
        #[indexed] swap_stage: &ManagedAddress,
        #[indexed] token: &TokenIdentifier,
        amount: &BigUint,
    );

    #[event("windowDurations")]
    fn window_durations_event(&self, #[indexed] pre_window: u64, #[indexed] post_window: u64);

    #[event("tokensRecovered")]
    fn tokens_recovered_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        #[indexed] token: &TokenIdentifier,
        amount: &BigUint,
    );
}
