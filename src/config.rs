multiversx_sc::imports!();

// ============================================================
// Configuration & access control
// Owner, operator set, collaborator addresses, pause flag.
// ============================================================

#[multiversx_sc::module]
pub trait ConfigModule {
    fn require_owner(&self) {
        let caller = self.blockchain().get_caller();
        require!(
            caller == self.blockchain().get_owner_address(),
            "Only owner"
        );
    }

    fn require_operator(&self) {
        let caller = self.blockchain().get_caller();
        require!(self.operators().contains(&caller), "Only operator");
    }

    fn require_swap_stage(&self) {
        require!(!self.swap_stage().is_empty(), "Swap stage not set");
        let caller = self.blockchain().get_caller();
        require!(caller == self.swap_stage().get(), "Only swap stage");
    }

    fn require_not_paused(&self) {
        require!(!self.paused().get(), "Deposits paused");
    }

    #[view(getConfig)]
    fn get_config(
        &self,
    ) -> MultiValue5<TokenIdentifier, TokenIdentifier, ManagedAddress, ManagedAddress, bool> {
        (
            self.lock_token().get(),
            self.reward_token().get(),
            self.escrow_address().get(),
            self.voter_address().get(),
            self.paused().get(),
        )
            .into()
    }

    #[view(getOperators)]
    fn get_operators(&self) -> MultiValueEncoded<ManagedAddress> {
        let mut result = MultiValueEncoded::new();
        for operator in self.operators().iter() {
            result.push(operator);
        }
        result
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("pausedChanged")]
    fn paused_changed_event(&self, #[indexed] paused: bool);

    #[event("operatorChanged")]
    fn operator_changed_event(
        &self,
        #[indexed] operator: &ManagedAddress,
        #[indexed] allowed: bool,
    );

    #[event("swapStageChanged")]
    fn swap_stage_changed_event(&self, #[indexed] swap_stage: &ManagedAddress);

    #[event("eligibilityPolicyChanged")]
    fn eligibility_policy_changed_event(&self, #[indexed] installed: bool);

    // ========================================================
    // STORAGE
    // ========================================================

    /// NFT collection of the voting-escrow locks accepted on deposit.
    #[view(getLockToken)]
    #[storage_mapper("lockToken")]
    fn lock_token(&self) -> SingleValueMapper<TokenIdentifier>;

    /// Token depositors are paid in.
    #[view(getRewardToken)]
    #[storage_mapper("rewardToken")]
    fn reward_token(&self) -> SingleValueMapper<TokenIdentifier>;

    #[storage_mapper("escrowAddress")]
    fn escrow_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("voterAddress")]
    fn voter_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[view(getSwapStage)]
    #[storage_mapper("swapStage")]
    fn swap_stage(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("eligibilityPolicy")]
    fn eligibility_policy(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("operators")]
    fn operators(&self) -> UnorderedSetMapper<ManagedAddress>;

    #[view(isPaused)]
    #[storage_mapper("paused")]
    fn paused(&self) -> SingleValueMapper<bool>;
}
