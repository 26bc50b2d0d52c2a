//! Sell flow driven through the scripted wallet boundary: approval ordering,
//! allowance rechecks and the well-formed-hash gate.

use std::{cell::RefCell, collections::VecDeque, time::Duration};

use alloy::{
    primitives::{Address, U256},
    sol_types::SolCall,
};
use futures::future;
use launchpad_sdk::{
    Chain,
    abi::{BondingCurve, Erc20},
    error::LaunchpadError,
    lifecycle::{SellOps, SellOutcome, WalletGateway, WriteRequest, sell_with_approval},
    testing::{MockWallet, hash_str},
    types::TxKind,
};

/// Sell ops wired to the wallet double the way a front end wires them to a
/// real signer: calls are ABI-encoded here, the wallet only signs and
/// broadcasts.
struct WalletSellOps<'w> {
    wallet: &'w MockWallet,
    token: Address,
    curve: Address,
    allowances: RefCell<VecDeque<u64>>,
}

impl<'w> WalletSellOps<'w> {
    fn new(wallet: &'w MockWallet, chain: &Chain, token: Address, allowances: &[u64]) -> Self {
        Self {
            wallet,
            token,
            curve: chain.curve(),
            allowances: RefCell::new(allowances.iter().copied().collect()),
        }
    }
}

impl SellOps for WalletSellOps<'_> {
    async fn allowance(&self) -> Result<U256, LaunchpadError> {
        Ok(U256::from(self.allowances.borrow_mut().pop_front().unwrap_or(0)))
    }

    async fn submit_approve(&self, amount: U256) -> Result<String, LaunchpadError> {
        let input = Erc20::approveCall { spender: self.curve, amount }.abi_encode();
        self.wallet
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
        self.wallet
            .submit(WriteRequest {
                kind: TxKind::Sell,
                to: self.curve,
                input: input.into(),
                value: U256::ZERO,
            })
            .await
    }
}

#[tokio::test]
async fn approval_confirms_before_the_sell_is_issued() {
    let chain = Chain::testnet();
    let token = Address::repeat_byte(0x42);
    let wallet = MockWallet::new();
    wallet.push_response(Ok(hash_str(0xA1)));
    wallet.push_response(Ok(hash_str(0xB2)));

    // Allowance 50, selling 100; the recheck after approval reports 100.
    let ops = WalletSellOps::new(&wallet, &chain, token, &[50, 100]);
    let outcome = sell_with_approval(
        &ops,
        |_| async { Ok(true) },
        U256::from(100u64),
        U256::ZERO,
        |_: Duration| future::pending::<()>(),
        future::pending::<()>,
    )
    .await
    .unwrap();

    let SellOutcome::Completed { approval: Some(approval), sell } = outcome else {
        panic!("expected a completed sell with approval, got {outcome:?}");
    };
    assert_eq!(format!("{approval:?}"), hash_str(0xA1));
    assert_eq!(format!("{sell:?}"), hash_str(0xB2));

    let requests = wallet.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].kind, TxKind::Approve);
    assert_eq!(requests[0].to, token);
    assert_eq!(
        requests[0].input,
        alloy::primitives::Bytes::from(
            Erc20::approveCall { spender: chain.curve(), amount: U256::from(100u64) }.abi_encode()
        )
    );
    assert_eq!(requests[1].kind, TxKind::Sell);
    assert_eq!(requests[1].to, chain.curve());
}

#[tokio::test]
async fn malformed_approval_hash_stops_the_chain() {
    let chain = Chain::testnet();
    let wallet = MockWallet::new();
    wallet.push_response(Ok("0xgarbage".to_string()));

    let ops = WalletSellOps::new(&wallet, &chain, Address::repeat_byte(0x42), &[50, 100]);
    let err = sell_with_approval(
        &ops,
        |_| async { Ok(true) },
        U256::from(100u64),
        U256::ZERO,
        |_: Duration| future::pending::<()>(),
        future::pending::<()>,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LaunchpadError::MalformedHash(_)));
    // The sell was never submitted.
    assert_eq!(wallet.requests().len(), 1);
    assert_eq!(wallet.requests()[0].kind, TxKind::Approve);
}

#[tokio::test]
async fn signer_rejection_is_not_a_failure_toast() {
    let chain = Chain::testnet();
    let wallet = MockWallet::new();
    wallet.push_response(Err(LaunchpadError::Rejected));

    let ops = WalletSellOps::new(&wallet, &chain, Address::repeat_byte(0x42), &[50]);
    let err = sell_with_approval(
        &ops,
        |_| async { Ok(true) },
        U256::from(100u64),
        U256::ZERO,
        |_: Duration| future::pending::<()>(),
        future::pending::<()>,
    )
    .await
    .unwrap_err();

    assert!(err.is_user_rejection());
}
