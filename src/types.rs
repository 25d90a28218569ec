multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Position: one deposited lock NFT
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Position<M: ManagedTypeApi> {
    /// Nonce of the lock NFT in the escrow collection.
    pub lock_id: u64,
    pub owner: ManagedAddress<M>,
    pub voting_weight: BigUint<M>,
    /// Accumulator value at the last settlement.
    pub reward_baseline: BigUint<M>,
    /// First epoch whose income this position shares in.
    pub eligible_epoch: u64,
    /// Reward accrued at a previous weight, not yet paid out.
    pub pending_reward: BigUint<M>,
}

// ============================================================
// Gate phase: which side of the special window an endpoint needs
// ============================================================

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GatePhase {
    /// Batch operations: voting, harvesting, swap staging, snapshot.
    InsideWindow,
    /// Depositor exits and claims, rebase harvesting, owner maintenance.
    OutsideWindow,
}
