use multiversx_sc::proxy_imports::*;

/// Voting-escrow registry that minted the lock NFTs: weight and vote-state oracle.
pub struct EscrowProxy;

impl<Env, From, To, Gas> TxProxyTrait<Env, From, To, Gas> for EscrowProxy
where
    Env: TxEnv,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    type TxProxyMethods = EscrowProxyMethods<Env, From, To, Gas>;

    fn proxy_methods(self, tx: Tx<Env, From, To, (), Gas, (), ()>) -> Self::TxProxyMethods {
        EscrowProxyMethods { wrapped_tx: tx }
    }
}

pub struct EscrowProxyMethods<Env, From, To, Gas>
where
    Env: TxEnv,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    wrapped_tx: Tx<Env, From, To, (), Gas, (), ()>,
}

impl<Env, From, To, Gas> EscrowProxyMethods<Env, From, To, Gas>
where
    Env: TxEnv,
    Env::Api: VMApi,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    pub fn get_voting_power<Arg0: ProxyArg<u64>>(
        self,
        lock_id: Arg0,
    ) -> TxTypedCall<Env, From, To, NotPayable, Gas, BigUint<Env::Api>> {
        self.wrapped_tx
            .payment(NotPayable)
            .raw_call("getVotingPower")
            .argument(&lock_id)
            .original_result()
    }

    pub fn is_voted<Arg0: ProxyArg<u64>>(
        self,
        lock_id: Arg0,
    ) -> TxTypedCall<Env, From, To, NotPayable, Gas, bool> {
        self.wrapped_tx
            .payment(NotPayable)
            .raw_call("isVoted")
            .argument(&lock_id)
            .original_result()
    }
}
