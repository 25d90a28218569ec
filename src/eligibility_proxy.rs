use multiversx_sc::proxy_imports::*;

pub struct EligibilityProxy;

impl<Env, From, To, Gas> TxProxyTrait<Env, From, To, Gas> for EligibilityProxy
where
    Env: TxEnv,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    type TxProxyMethods = EligibilityProxyMethods<Env, From, To, Gas>;

    fn proxy_methods(self, tx: Tx<Env, From, To, (), Gas, (), ()>) -> Self::TxProxyMethods {
        EligibilityProxyMethods { wrapped_tx: tx }
    }
}

pub struct EligibilityProxyMethods<Env, From, To, Gas>
where
    Env: TxEnv,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    wrapped_tx: Tx<Env, From, To, (), Gas, (), ()>,
}

impl<Env, From, To, Gas> EligibilityProxyMethods<Env, From, To, Gas>
where
    Env: TxEnv,
    Env::Api: VMApi,
    From: TxFrom<Env>,
    To: TxTo<Env>,
    Gas: TxGas<Env>,
{
    pub fn is_eligible<Arg0: ProxyArg<u64>, Arg1: ProxyArg<ManagedAddress<Env::Api>>>(
        self,
        lock_id: Arg0,
        depositor: Arg1,
    ) -> TxTypedCall<Env, From, To, NotPayable, Gas, bool> {
        self.wrapped_tx
            .payment(NotPayable)
            .raw_call("isEligible")
            .argument(&lock_id)
            .argument(&depositor)
            .original_result()
    }
}
