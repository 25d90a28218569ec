use multiversx_sc::proxy_imports::*;

/// Gauge voting and incentive-claim protocol.
pub struct VoterProxy;

impl<Env, From, To, Gas> TxProxyTrait<Env, From, To, Gas> for VoterProxy
where
    Env: TxEnv,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    type TxProxyMethods = VoterProxyMethods<Env, From, To, Gas>;

    fn proxy_methods(self, tx: Tx<Env, From, To, (), Gas, (), ()>) -> Self::TxProxyMethods {
        VoterProxyMethods { wrapped_tx: tx }
    }
}

pub struct VoterProxyMethods<Env, From, To, Gas>
where
    Env: TxEnv,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    wrapped_tx: Tx<Env, From, To, (), Gas, (), ()>,
}

impl<Env, From, To, Gas> VoterProxyMethods<Env, From, To, Gas>
where
    Env: TxEnv,
    Env::Api: VMApi,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    pub fn vote<
        Arg0: ProxyArg<u64>,
        Arg1: ProxyArg<ManagedVec<Env::Api, ManagedAddress<Env::Api>>>,
        Arg2: ProxyArg<ManagedVec<Env::Api, BigUint<Env::Api>>>,
    >(
        self,
        lock_id: Arg0,
        pools: Arg1,
        weights: Arg2,
    ) -> TxTypedCall<Env, From, To, NotPayable, Gas, ()> {
        self.wrapped_tx
            .payment(NotPayable)
            .raw_call("vote")
            .argument(&lock_id)
            .argument(&pools)
            .argument(&weights)
            .original_result()
    }

    pub fn claim_bribes<
        Arg0: ProxyArg<u64>,
        Arg1: ProxyArg<ManagedVec<Env::Api, ManagedAddress<Env::Api>>>,
        Arg2: ProxyArg<ManagedVec<Env::Api, TokenIdentifier<Env::Api>>>,
    >(
        self,
        lock_id: Arg0,
        sources: Arg1,
        tokens: Arg2,
    ) -> TxTypedCall<Env, From, To, NotPayable, Gas, ()> {
        self.wrapped_tx
            .payment(NotPayable)
            .raw_call("claimBribes")
            .argument(&lock_id)
            .argument(&sources)
            .argument(&tokens)
            .original_result()
    }

    pub fn claim_fees<
        Arg0: ProxyArg<u64>,
        Arg1: ProxyArg<ManagedVec<Env::Api, ManagedAddress<Env::Api>>>,
        Arg2: ProxyArg<ManagedVec<Env::Api, TokenIdentifier<Env::Api>>>,
    >(
        self,
        lock_id: Arg0,
        sources: Arg1,
        tokens: Arg2,
    ) -> TxTypedCall<Env, From, To, NotPayable, Gas, ()> {
        self.wrapped_tx
            .payment(NotPayable)
            .raw_call("claimFees")
            .argument(&lock_id)
            .argument(&sources)
            .argument(&tokens)
            .original_result()
    }
}
