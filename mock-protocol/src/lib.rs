#![no_std]

multiversx_sc::imports!();

// Stand-in for the voting-escrow registry, the gauge voter and the deposit
// eligibility policy, driven by scenario tests.
#[multiversx_sc::contract]
pub trait MockProtocol {
    #[init]
    fn init(&self) {}

    #[upgrade]
    fn upgrade(&self) {}

    // ── Escrow registry ──

    #[endpoint(setVotingPower)]
    fn set_voting_power(&self, lock_id: u64, power: BigUint) {
        self.voting_power(lock_id).set(&power);
    }

    #[endpoint(setVoted)]
    fn set_voted(&self, lock_id: u64, voted: bool) {
        self.voted(lock_id).set(voted);
    }

    // ── Voter ──

    #[endpoint(vote)]
    fn vote(
        &self,
        lock_id: u64,
        pools: ManagedVec<Self::Api, ManagedAddress>,
        weights: ManagedVec<Self::Api, BigUint>,
    ) {
        require!(pools.len() == weights.len(), "Length mismatch");
        self.voted(lock_id).set(true);
        self.vote_count(lock_id).update(|count| *count += 1);
    }

    #[endpoint(fundIncentives)]
    #[payable("*")]
    fn fund_incentives(&self) {
        let payment = self.call_value().single_esdt();
        self.incentives(&payment.token_identifier)
            .update(|amount| *amount += &payment.amount);
    }

    #[endpoint(claimBribes)]
    fn claim_bribes(
        &self,
        _lock_id: u64,
        _sources: ManagedVec<Self::Api, ManagedAddress>,
        tokens: ManagedVec<Self::Api, TokenIdentifier>,
    ) {
        self.pay_incentives(&tokens);
    }

    #[endpoint(claimFees)]
    fn claim_fees(
        &self,
        _lock_id: u64,
        _sources: ManagedVec<Self::Api, ManagedAddress>,
        tokens: ManagedVec<Self::Api, TokenIdentifier>,
    ) {
        self.pay_incentives(&tokens);
    }

    fn pay_incentives(&self, tokens: &ManagedVec<Self::Api, TokenIdentifier>) {
        let caller = self.blockchain().get_caller();
        for token in tokens.iter() {
            let amount = self.incentives(&token).take();
            if amount > 0u64 {
                self.send().direct_esdt(&caller, &token, 0, &amount);
            }
        }
    }

    // ── Eligibility policy ──

    #[endpoint(setBlocked)]
    fn set_blocked(&self, depositor: ManagedAddress, blocked: bool) {
        self.blocked(&depositor).set(blocked);
    }

    #[view(isEligible)]
    fn is_eligible(&self, _lock_id: u64, depositor: ManagedAddress) -> bool {
        !self.blocked(&depositor).get()
    }

    // ── Storage ──

    #[view(getVotingPower)]
    #[storage_mapper("votingPower")]
    fn voting_power(&self, lock_id: u64) -> SingleValueMapper<BigUint>;

    #[view(isVoted)]
    #[storage_mapper("voted")]
    fn voted(&self, lock_id: u64) -> SingleValueMapper<bool>;

    #[view(getVoteCount)]
    #[storage_mapper("voteCount")]
    fn vote_count(&self, lock_id: u64) -> SingleValueMapper<u64>;

    #[storage_mapper("incentives")]
    fn incentives(&self, token: &TokenIdentifier) -> SingleValueMapper<BigUint>;

    #[storage_mapper("blocked")]
    fn blocked(&self, depositor: &ManagedAddress) -> SingleValueMapper<bool>;
}
