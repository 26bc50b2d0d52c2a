//! Lifecycle of user-submitted state-changing calls.
//!
//! Per action the flow is
//! `Idle -> Submitting -> {SubmitFailed, Pending} -> {Confirmed, Reverted,
//! TimedOut} -> Idle`. A submission result enters `Pending` only after the
//! well-formed-hash gate; 30 seconds without a terminal state force a
//! timeout so a hung wallet or RPC cannot leave the client waiting forever.
//!
//! Cancellation is local: it stops the waiting, it cannot retract an
//! already-broadcast transaction.
//!
//! Selling requires a prior allowance. [`sell_with_approval`] chains the two
//! independent transactions: the approval fully confirms first, the live
//! allowance is re-read (never assumed granted), and only then is the sell
//! issued.
//!
//! The module is runtime-agnostic: delays come from an injected
//! `sleep: Fn(Duration) -> Future` and waits are cut short by a
//! caller-supplied cancellation future.

use std::time::Duration;

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    providers::Provider,
    sol_types::SolCall,
};
use fastnum::UD256;
use futures::{FutureExt, pin_mut, select_biased};

use crate::{
    Chain,
    abi::{BondingCurve, Erc20, GraduationRegistry, TokenFactory},
    error::LaunchpadError,
    num::Converter,
    types::{TxKind, parse_tx_hash},
};

/// Absolute window from submission to a terminal state.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Sleeps between the defensive refetches that follow the immediate
/// post-confirmation refetch, placing them at +2s and +5s from confirmation.
/// Read-after-write consistency from the RPC/explorer is not guaranteed;
/// a single immediate refetch can return stale data.
pub const SETTLE_REFETCH_DELAYS: [Duration; 2] = [Duration::from_secs(2), Duration::from_secs(3)];

/// Lifecycle state of one state-changing call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Submitting,
    SubmitFailed,
    Pending(TxHash),
    Confirmed(TxHash),
    Reverted(TxHash),
    TimedOut,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowState::SubmitFailed
                | FlowState::Confirmed(_)
                | FlowState::Reverted(_)
                | FlowState::TimedOut
        )
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, FlowState::Submitting | FlowState::Pending(_))
    }
}

/// Terminal outcome of driving a flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed(TxHash),
    Reverted(TxHash),
    TimedOut,
    Cancelled,
}

impl TxOutcome {
    pub fn is_confirmed(&self) -> bool { matches!(self, TxOutcome::Confirmed(_)) }

    /// Error view of a non-confirmed outcome. `None` for a confirmed flow and
    /// for a local cancellation: stopping the wait is not a failure.
    pub fn failure(&self) -> Option<LaunchpadError> {
        match self {
            TxOutcome::Confirmed(_) | TxOutcome::Cancelled => None,
            TxOutcome::Reverted(hash) => Some(LaunchpadError::Reverted(*hash)),
            TxOutcome::TimedOut => {
                Some(LaunchpadError::ConfirmationTimeout(CONFIRMATION_TIMEOUT))
            },
        }
    }
}

/// State machine for a single state-changing call.
#[derive(Debug)]
pub struct TxFlow {
    kind: TxKind,
    state: FlowState,
}

impl TxFlow {
    pub fn new(kind: TxKind) -> Self { Self { kind, state: FlowState::Idle } }

    pub fn kind(&self) -> TxKind { self.kind }

    pub fn state(&self) -> FlowState { self.state }

    pub fn begin(&mut self) { self.state = FlowState::Submitting; }

    /// Validates the raw submission result. Only a well-formed hash enters
    /// `Pending`; anything else fails the submission, because a corrupt hash
    /// would have the client waiting for a confirmation that cannot arrive.
    pub fn submitted(&mut self, raw: &str) -> Result<TxHash, LaunchpadError> {
        match parse_tx_hash(raw) {
            Ok(hash) => {
                self.state = FlowState::Pending(hash);
                Ok(hash)
            },
            Err(err) => {
                self.state = FlowState::SubmitFailed;
                Err(err)
            },
        }
    }

    pub fn submit_failed(&mut self) { self.state = FlowState::SubmitFailed; }

    pub fn confirmed(&mut self, hash: TxHash) { self.state = FlowState::Confirmed(hash); }

    pub fn reverted(&mut self, hash: TxHash) { self.state = FlowState::Reverted(hash); }

    pub fn timed_out(&mut self) { self.state = FlowState::TimedOut; }

    /// Local reset. Does not retract anything already broadcast.
    pub fn reset(&mut self) { self.state = FlowState::Idle; }
}

/// Prepared state-changing call for the wallet to sign and broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRequest {
    pub kind: TxKind,
    pub to: Address,
    pub input: Bytes,
    pub value: U256,
}

/// Boundary to the signing wallet.
///
/// Implementations submit the prepared call and report the raw hash string
/// exactly as the signer returned it; validation happens on this side of the
/// boundary. A declined signature maps to [`LaunchpadError::Rejected`].
pub trait WalletGateway {
    fn submit(
        &self,
        request: WriteRequest,
    ) -> impl Future<Output = Result<String, LaunchpadError>>;
}

/// Drives one flow from submission to a terminal state.
///
/// `submit` performs the write call; `watch` resolves once the tracked hash
/// has a receipt (`Ok(true)` success, `Ok(false)` reverted); `cancel` stops
/// the waiting locally when it resolves. The [`CONFIRMATION_TIMEOUT`] spans
/// both phases.
pub async fn drive<SubFut, W, WFut, S, SFut, C>(
    flow: &mut TxFlow,
    submit: SubFut,
    watch: W,
    sleep: S,
    cancel: C,
) -> Result<TxOutcome, LaunchpadError>
where
    SubFut: Future<Output = Result<String, LaunchpadError>>,
    W: FnOnce(TxHash) -> WFut,
    WFut: Future<Output = Result<bool, LaunchpadError>>,
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
    C: Future<Output = ()>,
{
    flow.begin();

    let timeout = sleep(CONFIRMATION_TIMEOUT).fuse();
    let cancel = cancel.fuse();
    let submit = submit.fuse();
    pin_mut!(timeout, cancel, submit);

    let raw = select_biased! {
        result = submit => match result {
            Ok(raw) => raw,
            Err(err) => {
                flow.submit_failed();
                return Err(err);
            },
        },
        _ = cancel => {
            flow.reset();
            return Ok(TxOutcome::Cancelled);
        },
        _ = timeout => {
            flow.timed_out();
            return Ok(TxOutcome::TimedOut);
        },
    };

    let hash = flow.submitted(&raw)?;

    let watch = watch(hash).fuse();
    pin_mut!(watch);

    select_biased! {
        result = watch => match result {
            Ok(true) => {
                flow.confirmed(hash);
                Ok(TxOutcome::Confirmed(hash))
            },
            Ok(false) => {
                flow.reverted(hash);
                Ok(TxOutcome::Reverted(hash))
            },
            Err(err) => {
                // Unexpected failure while watching; reset to allow retry.
                flow.reset();
                Err(err)
            },
        },
        _ = cancel => {
            flow.reset();
            Ok(TxOutcome::Cancelled)
        },
        _ = timeout => {
            flow.timed_out();
            Ok(TxOutcome::TimedOut)
        },
    }
}

/// Post-confirmation reconciliation: refetch dependent state immediately,
/// then twice more at +2s and +5s from confirmation (the
/// [`SETTLE_REFETCH_DELAYS`] sleeps run back to back).
pub async fn settle<S, SFut, R, RFut>(sleep: S, refetch: R)
where
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
    R: Fn() -> RFut,
    RFut: Future<Output = ()>,
{
    refetch().await;
    for delay in SETTLE_REFETCH_DELAYS {
        sleep(delay).await;
        refetch().await;
    }
}

/// Chain-facing operations the sell flow depends on.
pub trait SellOps {
    /// Live allowance granted to the curve, in raw fixed-point units.
    fn allowance(&self) -> impl Future<Output = Result<U256, LaunchpadError>>;

    fn submit_approve(
        &self,
        amount: U256,
    ) -> impl Future<Output = Result<String, LaunchpadError>>;

    fn submit_sell(
        &self,
        amount: U256,
        min_quote_out: U256,
    ) -> impl Future<Output = Result<String, LaunchpadError>>;
}

/// Outcome of the full sell flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SellOutcome {
    /// Sell confirmed, preceded by an approval when one was needed.
    Completed { approval: Option<TxHash>, sell: TxHash },
    /// Flow stopped before the sell was issued.
    ApprovalIncomplete(TxOutcome),
    /// Sell submitted but did not confirm.
    SellIncomplete { approval: Option<TxHash>, sell: TxOutcome },
}

/// Sells `amount` tokens, chaining an approval first when the live allowance
/// is insufficient.
///
/// Approval and sell are two independent transactions, never combined. The
/// sell is issued only after the approval's confirmation is observed and the
/// allowance has been re-read at or above the requested amount; the grant is
/// never assumed from the approval request itself.
pub async fn sell_with_approval<O, W, WFut, S, SFut, C, CFut>(
    ops: &O,
    watch: W,
    amount: U256,
    min_quote_out: U256,
    sleep: S,
    cancel: C,
) -> Result<SellOutcome, LaunchpadError>
where
    O: SellOps,
    W: Fn(TxHash) -> WFut + Copy,
    WFut: Future<Output = Result<bool, LaunchpadError>>,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
    C: Fn() -> CFut,
    CFut: Future<Output = ()>,
{
    let mut approval = None;
    if ops.allowance().await? < amount {
        let mut flow = TxFlow::new(TxKind::Approve);
        match drive(&mut flow, ops.submit_approve(amount), watch, sleep, cancel()).await? {
            TxOutcome::Confirmed(hash) => approval = Some(hash),
            other => return Ok(SellOutcome::ApprovalIncomplete(other)),
        }

        let granted = ops.allowance().await?;
        if granted < amount {
            return Err(LaunchpadError::InsufficientAllowance {
                have: granted.to_string(),
                need: amount.to_string(),
            });
        }
    }

    let mut flow = TxFlow::new(TxKind::Sell);
    match drive(&mut flow, ops.submit_sell(amount, min_quote_out), watch, sleep, cancel()).await? {
        TxOutcome::Confirmed(hash) => Ok(SellOutcome::Completed { approval, sell: hash }),
        other => Ok(SellOutcome::SellIncomplete { approval, sell: other }),
    }
}

/// High-level write operations against the launchpad.
///
/// Calls are prepared here, submitted through the [`WalletGateway`] and
/// tracked to a receipt via the provider. After every confirmation the
/// caller-supplied `refetch` runs on the [`settle`] schedule.
pub struct Trader<P, W> {
    chain: Chain,
    provider: P,
    wallet: W,
    account: Address,
    converter: Converter,
}

impl<P: Provider, W: WalletGateway> Trader<P, W> {
    pub fn new(chain: &Chain, provider: P, wallet: W, account: Address) -> Self {
        Self { chain: chain.clone(), provider, wallet, account, converter: Converter::amounts() }
    }

    pub fn account(&self) -> Address { self.account }

    pub fn converter(&self) -> Converter { self.converter }

    pub fn wallet(&self) -> &W { &self.wallet }

    /// Token balance of the trader's account.
    pub async fn balance(&self, token: Address) -> Result<UD256, LaunchpadError> {
        let erc20 = Erc20::new(token, &self.provider);
        Ok(self.converter.from_unsigned(erc20.balanceOf(self.account).call().await?))
    }

    /// Allowance granted by the trader's account to the curve.
    pub async fn allowance(&self, token: Address) -> Result<UD256, LaunchpadError> {
        Ok(self.converter.from_unsigned(self.allowance_raw(token).await?))
    }

    async fn allowance_raw(&self, token: Address) -> Result<U256, LaunchpadError> {
        let erc20 = Erc20::new(token, &self.provider);
        Ok(erc20.allowance(self.account, self.chain.curve()).call().await?)
    }

    /// Receipt poll for a tracked hash; resolves with the execution status.
    pub async fn watch_receipt<S, SFut>(
        &self,
        hash: TxHash,
        sleep: S,
    ) -> Result<bool, LaunchpadError>
    where
        S: Fn(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(receipt.status());
            }
            sleep(self.provider.client().poll_interval()).await;
        }
    }

    pub async fn create_token<S, SFut, C, CFut, R, RFut>(
        &self,
        name: &str,
        symbol: &str,
        image_uri: &str,
        description: &str,
        creation_fee: UD256,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<TxOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let input = TokenFactory::createTokenCall {
            name: name.to_string(),
            symbol: symbol.to_string(),
            imageUri: image_uri.to_string(),
            description: description.to_string(),
        }
        .abi_encode();
        self.execute(
            TxKind::Create,
            self.chain.factory(),
            input,
            self.converter.to_unsigned(creation_fee),
            sleep,
            cancel,
            refetch,
        )
        .await
    }

    /// Buys tokens with `quote_amount` of the quote asset.
    pub async fn buy<S, SFut, C, CFut, R, RFut>(
        &self,
        token: Address,
        quote_amount: UD256,
        min_tokens_out: UD256,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<TxOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let input = BondingCurve::buyCall {
            token,
            minTokensOut: self.converter.to_unsigned(min_tokens_out),
        }
        .abi_encode();
        self.execute(
            TxKind::Buy,
            self.chain.curve(),
            input,
            self.converter.to_unsigned(quote_amount),
            sleep,
            cancel,
            refetch,
        )
        .await
    }

    /// Sells `amount` tokens, chaining an approval first when needed.
    pub async fn sell<S, SFut, C, CFut, R, RFut>(
        &self,
        token: Address,
        amount: UD256,
        min_quote_out: UD256,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<SellOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let ops = CurveSellOps { trader: self, token };
        let outcome = sell_with_approval(
            &ops,
            |hash| self.watch_receipt(hash, sleep),
            self.converter.to_unsigned(amount),
            self.converter.to_unsigned(min_quote_out),
            sleep,
            cancel,
        )
        .await?;
        if matches!(outcome, SellOutcome::Completed { .. }) {
            settle(sleep, &refetch).await;
        }
        Ok(outcome)
    }

    pub async fn initialize_curve<S, SFut, C, CFut, R, RFut>(
        &self,
        token: Address,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<TxOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let input = BondingCurve::initializeCall { token }.abi_encode();
        self.execute(
            TxKind::InitializeCurve,
            self.chain.curve(),
            input,
            U256::ZERO,
            sleep,
            cancel,
            refetch,
        )
        .await
    }

    pub async fn graduate<S, SFut, C, CFut, R, RFut>(
        &self,
        token: Address,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<TxOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let input = GraduationRegistry::graduateCall { token }.abi_encode();
        self.execute(
            TxKind::Graduate,
            self.chain.graduation_registry(),
            input,
            U256::ZERO,
            sleep,
            cancel,
            refetch,
        )
        .await
    }

    pub async fn list_on_dex<S, SFut, C, CFut, R, RFut>(
        &self,
        token: Address,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<TxOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let input = GraduationRegistry::listOnDexCall { token }.abi_encode();
        self.execute(
            TxKind::ListOnDex,
            self.chain.graduation_registry(),
            input,
            U256::ZERO,
            sleep,
            cancel,
            refetch,
        )
        .await
    }

    async fn execute<S, SFut, C, CFut, R, RFut>(
        &self,
        kind: TxKind,
        to: Address,
        input: Vec<u8>,
        value: U256,
        sleep: S,
        cancel: C,
        refetch: R,
    ) -> Result<TxOutcome, LaunchpadError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
        R: Fn() -> RFut,
        RFut: Future<Output = ()>,
    {
        let mut flow = TxFlow::new(kind);
        let outcome = drive(
            &mut flow,
            self.wallet.submit(WriteRequest { kind, to, input: input.into(), value }),
            |hash| self.watch_receipt(hash, sleep),
            sleep,
            cancel(),
        )
        .await?;
        if outcome.is_confirmed() {
            settle(sleep, &refetch).await;
        }
        Ok(outcome)
    }
}

struct CurveSellOps<'t, P, W> {
    trader: &'t Trader<P, W>,
    token: Address,
}

impl<P: Provider, W: WalletGateway> SellOps for CurveSellOps<'_, P, W> {
    async fn allowance(&self) -> Result<U256, LaunchpadError> {
        self.trader.allowance_raw(self.token).await
    }

    async fn submit_approve(&self, amount: U256) -> Result<String, LaunchpadError> {
        let input =
            Erc20::approveCall { spender: self.trader.chain.curve(), amount }.abi_encode();
        self.trader
            .wallet
            .submit(WriteRequest {
                kind: TxKind::Approve,
                to: self.token,
                input: input.into(),
                value: U256::ZERO,
            })
            .await
    }

    async fn submit_sell(&self, amount: U256, min_quote_out: U256) -> Result<String, LaunchpadError> {
        let input = BondingCurve::sellCall {
            token: self.token,
            tokenAmount: amount,
            minQuoteOut: min_quote_out,
        }
        .abi_encode();
        self.trader
            .wallet
            .submit(WriteRequest {
                kind: TxKind::Sell,
                to: self.trader.chain.curve(),
                input: input.into(),
                value: U256::ZERO,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use futures::future;

    use super::*;
    use crate::testing::hash_str;

    fn never_cancel() -> future::Pending<()> { future::pending() }

    async fn instant(_: Duration) {}

    #[test]
    fn pending_requires_a_well_formed_hash() {
        let mut flow = TxFlow::new(TxKind::Buy);
        flow.begin();
        assert_eq!(flow.state(), FlowState::Submitting);

        let err = flow.submitted("0xdeadbeef").unwrap_err();
        assert!(matches!(err, LaunchpadError::MalformedHash(_)));
        assert_eq!(flow.state(), FlowState::SubmitFailed);
        assert!(flow.state().is_terminal());
    }

    #[test]
    fn well_formed_hash_enters_pending() {
        let mut flow = TxFlow::new(TxKind::Buy);
        flow.begin();
        let hash = flow.submitted(&hash_str(7)).unwrap();
        assert_eq!(flow.state(), FlowState::Pending(hash));
        assert!(flow.state().is_in_flight());
    }

    #[tokio::test]
    async fn drive_confirms_a_successful_call() {
        let mut flow = TxFlow::new(TxKind::Buy);
        let outcome = drive(
            &mut flow,
            async { Ok(hash_str(1)) },
            |_| async { Ok(true) },
            |_| future::pending::<()>(),
            never_cancel(),
        )
        .await
        .unwrap();

        let TxOutcome::Confirmed(hash) = outcome else { panic!("expected confirmation") };
        assert_eq!(flow.state(), FlowState::Confirmed(hash));
    }

    #[tokio::test]
    async fn drive_never_waits_on_a_malformed_hash() {
        let mut flow = TxFlow::new(TxKind::Sell);
        let err = drive(
            &mut flow,
            async { Ok("0xnot-a-hash".to_string()) },
            |_| async { unreachable!("watch must not run for a malformed hash") },
            |_| future::pending::<()>(),
            never_cancel(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LaunchpadError::MalformedHash(_)));
        assert_eq!(flow.state(), FlowState::SubmitFailed);
    }

    #[tokio::test]
    async fn drive_reports_reverts() {
        let mut flow = TxFlow::new(TxKind::Graduate);
        let outcome = drive(
            &mut flow,
            async { Ok(hash_str(2)) },
            |_| async { Ok(false) },
            |_| future::pending::<()>(),
            never_cancel(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, TxOutcome::Reverted(_)));
        assert!(matches!(flow.state(), FlowState::Reverted(_)));
    }

    #[tokio::test]
    async fn drive_times_out_without_a_receipt() {
        let mut flow = TxFlow::new(TxKind::Buy);
        let outcome = drive(
            &mut flow,
            async { Ok(hash_str(3)) },
            |_| future::pending(),
            instant, // timeout window elapses immediately
            never_cancel(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, TxOutcome::TimedOut);
        assert_eq!(flow.state(), FlowState::TimedOut);
    }

    #[tokio::test]
    async fn cancel_stops_waiting_and_resets() {
        let mut flow = TxFlow::new(TxKind::Buy);
        let outcome = drive(
            &mut flow,
            async { Ok(hash_str(4)) },
            |_| future::pending(),
            |_| future::pending::<()>(),
            async {}, // user cancels right away
        )
        .await
        .unwrap();

        assert_eq!(outcome, TxOutcome::Cancelled);
        // Local reset only; nothing broadcast was retracted.
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn rejection_fails_the_submission() {
        let mut flow = TxFlow::new(TxKind::Buy);
        let err = drive(
            &mut flow,
            async { Err(LaunchpadError::Rejected) },
            |_| async { unreachable!() },
            |_| future::pending::<()>(),
            never_cancel(),
        )
        .await
        .unwrap_err();

        assert!(err.is_user_rejection());
        assert_eq!(flow.state(), FlowState::SubmitFailed);
    }

    #[tokio::test]
    async fn settle_refetches_immediately_and_twice_delayed() {
        let refetches = RefCell::new(0);
        let delays = RefCell::new(Vec::new());

        settle(
            |delay| {
                delays.borrow_mut().push(delay);
                async {}
            },
            || async {
                *refetches.borrow_mut() += 1;
            },
        )
        .await;

        assert_eq!(*refetches.borrow(), 3);
        assert_eq!(*delays.borrow(), SETTLE_REFETCH_DELAYS.to_vec());
        // Back-to-back sleeps place the delayed refetches at +2s and +5s
        // from confirmation.
        let mut elapsed = Duration::ZERO;
        let offsets: Vec<Duration> = delays
            .borrow()
            .iter()
            .map(|delay| {
                elapsed += *delay;
                elapsed
            })
            .collect();
        assert_eq!(offsets, vec![Duration::from_secs(2), Duration::from_secs(5)]);
    }

    #[test]
    fn outcome_failures_keep_their_kind() {
        assert!(TxOutcome::Cancelled.failure().is_none());
        assert!(matches!(
            TxOutcome::TimedOut.failure(),
            Some(LaunchpadError::ConfirmationTimeout(window)) if window == CONFIRMATION_TIMEOUT
        ));
        let hash = crate::types::parse_tx_hash(&hash_str(5)).unwrap();
        assert!(TxOutcome::Confirmed(hash).failure().is_none());
        assert!(matches!(
            TxOutcome::Reverted(hash).failure(),
            Some(LaunchpadError::Reverted(h)) if h == hash
        ));
    }

    #[tokio::test]
    async fn trader_prepares_buy_requests_for_the_wallet() {
        use alloy::providers::ProviderBuilder;
        use fastnum::udec256;

        use crate::testing::MockWallet;

        let chain = Chain::testnet();
        // Never contacted: the scripted rejection stops the flow before any
        // receipt watch.
        let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap());
        let wallet = MockWallet::new();
        wallet.push_response(Err(LaunchpadError::Rejected));

        let token = Address::repeat_byte(0x42);
        let trader = Trader::new(&chain, provider, wallet, Address::repeat_byte(0xEE));
        let err = trader
            .buy(token, udec256!(1), udec256!(0), instant, never_cancel, || async {})
            .await
            .unwrap_err();
        assert!(err.is_user_rejection());

        let requests = trader.wallet().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, TxKind::Buy);
        assert_eq!(requests[0].to, chain.curve());
        assert_eq!(requests[0].value, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(
            requests[0].input,
            Bytes::from(
                BondingCurve::buyCall { token, minTokensOut: U256::ZERO }.abi_encode()
            )
        );
    }

    #[tokio::test]
    async fn trader_targets_the_registry_for_graduation() {
        use alloy::providers::ProviderBuilder;

        use crate::testing::MockWallet;

        let chain = Chain::testnet();
        let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap());
        let wallet = MockWallet::new();
        wallet.push_response(Err(LaunchpadError::Rejected));

        let token = Address::repeat_byte(0x43);
        let trader = Trader::new(&chain, provider, wallet, Address::repeat_byte(0xEE));
        trader
            .graduate(token, instant, never_cancel, || async {})
            .await
            .unwrap_err();

        let requests = trader.wallet().requests();
        assert_eq!(requests[0].kind, TxKind::Graduate);
        assert_eq!(requests[0].to, chain.graduation_registry());
        assert_eq!(requests[0].value, U256::ZERO);
    }

    struct ScriptedOps {
        allowances: RefCell<VecDeque<u64>>,
        log: RefCell<Vec<String>>,
    }

    impl ScriptedOps {
        fn new(allowances: &[u64]) -> Self {
            Self {
                allowances: RefCell::new(allowances.iter().copied().collect()),
                log: RefCell::new(Vec::new()),
            }
        }

        fn log(&self) -> Vec<String> { self.log.borrow().clone() }
    }

    impl SellOps for ScriptedOps {
        async fn allowance(&self) -> Result<U256, LaunchpadError> {
            self.log.borrow_mut().push("allowance".to_string());
            let next = self.allowances.borrow_mut().pop_front().expect("scripted allowance");
            Ok(U256::from(next))
        }

        async fn submit_approve(&self, amount: U256) -> Result<String, LaunchpadError> {
            self.log.borrow_mut().push(format!("approve {amount}"));
            Ok(hash_str(0xA1))
        }

        async fn submit_sell(&self, amount: U256, _min: U256) -> Result<String, LaunchpadError> {
            self.log.borrow_mut().push(format!("sell {amount}"));
            Ok(hash_str(0xB2))
        }
    }

    #[tokio::test]
    async fn sell_chains_approval_before_selling() {
        // Allowance 50, selling 100: approve first, recheck, then sell.
        let ops = ScriptedOps::new(&[50, 100]);
        let outcome = sell_with_approval(
            &ops,
            |_| async { Ok(true) },
            U256::from(100u64),
            U256::ZERO,
            |_| future::pending::<()>(),
            never_cancel,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SellOutcome::Completed { approval: Some(_), .. }));
        assert_eq!(
            ops.log(),
            vec!["allowance", "approve 100", "allowance", "sell 100"]
        );
    }

    #[tokio::test]
    async fn sufficient_allowance_skips_approval() {
        let ops = ScriptedOps::new(&[150]);
        let outcome = sell_with_approval(
            &ops,
            |_| async { Ok(true) },
            U256::from(100u64),
            U256::ZERO,
            |_| future::pending::<()>(),
            never_cancel,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SellOutcome::Completed { approval: None, .. }));
        assert_eq!(ops.log(), vec!["allowance", "sell 100"]);
    }

    #[tokio::test]
    async fn stale_allowance_after_approval_aborts_the_sell() {
        // Approval confirms but the re-read still reports less than needed.
        let ops = ScriptedOps::new(&[50, 60]);
        let err = sell_with_approval(
            &ops,
            |_| async { Ok(true) },
            U256::from(100u64),
            U256::ZERO,
            |_| future::pending::<()>(),
            never_cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LaunchpadError::InsufficientAllowance { .. }));
        assert!(!ops.log().iter().any(|entry| entry.starts_with("sell")));
    }

    #[tokio::test]
    async fn unconfirmed_approval_never_reaches_the_sell() {
        let ops = ScriptedOps::new(&[50]);
        let outcome = sell_with_approval(
            &ops,
            |_| future::pending(), // approval never confirms
            U256::from(100u64),
            U256::ZERO,
            instant, // let the timeout fire
            never_cancel,
        )
        .await
        .unwrap();

        assert_eq!(outcome, SellOutcome::ApprovalIncomplete(TxOutcome::TimedOut));
        assert!(!ops.log().iter().any(|entry| entry.starts_with("sell")));
    }
}
