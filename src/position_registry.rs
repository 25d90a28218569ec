multiversx_sc::imports!();

use crate::types::Position;

// ============================================================
// Position Registry
// Positions keyed by lock id, plus a per-owner slot list with a
// reverse index. Removal swaps the last slot into the hole.
// ============================================================

#[multiversx_sc::module]
pub trait PositionRegistryModule {
    fn insert_position(&self, position: &Position<Self::Api>) {
        let slot = self.owner_positions(&position.owner).push(&position.lock_id);
        self.position_slot(position.lock_id).set(slot);
        self.positions(position.lock_id).set(position);
        self.position_count().update(|count| *count += 1);
    }

    fn remove_position(&self, lock_id: u64) {
        let position = self.load_position(lock_id);
        let mut owner_list = self.owner_positions(&position.owner);
        let slot = self.position_slot(lock_id).get();

        owner_list.swap_remove(slot);
        // The former last entry now lives at `slot`, unless `slot` was the last one.
        if slot <= owner_list.len() {
            let moved = owner_list.get(slot);
            self.position_slot(moved).set(slot);
        }

        self.position_slot(lock_id).clear();
        self.positions(lock_id).clear();
        self.position_count().update(|count| *count -= 1);
    }

    fn load_position(&self, lock_id: u64) -> Position<Self::Api> {
        require!(!self.positions(lock_id).is_empty(), "Unknown position");
        self.positions(lock_id).get()
    }

    fn load_owned_position(&self, lock_id: u64, caller: &ManagedAddress) -> Position<Self::Api> {
        let position = self.load_position(lock_id);
        require!(position.owner == *caller, "Not position owner");
        position
    }

    fn require_held(&self, lock_id: u64) {
        require!(
            !self.positions(lock_id).is_empty(),
            "Position not held by pool"
        );
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getPosition)]
    fn get_position(&self, lock_id: u64) -> OptionalValue<Position<Self::Api>> {
        if self.positions(lock_id).is_empty() {
            return OptionalValue::None;
        }
        OptionalValue::Some(self.positions(lock_id).get())
    }

    #[view(getOwnerPositions)]
    fn get_owner_positions(&self, owner: ManagedAddress) -> MultiValueEncoded<u64> {
        let mut result = MultiValueEncoded::new();
        for lock_id in self.owner_positions(&owner).iter() {
            result.push(lock_id);
        }
        result
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("positions")]
    fn positions(&self, lock_id: u64) -> SingleValueMapper<Position<Self::Api>>;

    /// 1-based, like every `VecMapper`.
    #[storage_mapper("ownerPositions")]
    fn owner_positions(&self, owner: &ManagedAddress) -> VecMapper<u64>;

    #[storage_mapper("positionSlot")]
    fn position_slot(&self, lock_id: u64) -> SingleValueMapper<usize>;

    #[view(getPositionCount)]
    #[storage_mapper("positionCount")]
    fn position_count(&self) -> SingleValueMapper<u64>;
}
