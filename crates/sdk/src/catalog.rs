//! Aggregated catalog of all known launchpad tokens.
//!
//! Discovery merges two sources: factory enumeration (authoritative) and
//! explorer-observed creation transactions (catches tokens the enumeration
//! read missed or raced). Every refresh re-derives the complete snapshot
//! instead of patching the previous one; redundant re-fetches are the price
//! of self-healing against missed or stale entries.

use std::time::Duration;

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::Provider,
};
use futures::{Stream, StreamExt, stream};
use itertools::Itertools;

use crate::{
    Chain,
    abi::TokenFactory,
    error::LaunchpadError,
    graduation::GraduationTracker,
    indexer::{self, ExplorerClient},
    price::{CurvePricer, UnitPrice},
    state::TokenRecord,
    types,
};

/// Fixed catalog polling period.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Concurrent per-token enrichment fetches within one refresh.
const ENRICH_CONCURRENCY: usize = 8;

/// Full catalog snapshot produced by one refresh.
#[derive(Clone, Debug, Default)]
pub struct CatalogSnapshot {
    instant: types::StateInstant,
    tokens: Vec<TokenRecord>,
}

impl CatalogSnapshot {
    pub(crate) fn new(instant: types::StateInstant, tokens: Vec<TokenRecord>) -> Self {
        Self { instant, tokens }
    }

    /// Instant the refresh started from; every token was derived at or after
    /// this point.
    pub fn instant(&self) -> types::StateInstant { self.instant }

    pub fn tokens(&self) -> &[TokenRecord] { &self.tokens }

    pub fn into_tokens(self) -> Vec<TokenRecord> { self.tokens }

    pub fn len(&self) -> usize { self.tokens.len() }

    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    pub fn get(&self, address: Address) -> Option<&TokenRecord> {
        self.tokens.iter().find(|token| token.address() == address)
    }
}

/// Discovers, enriches and refreshes the full set of launched tokens.
pub struct TokenCatalog<P> {
    chain: Chain,
    provider: P,
    explorer: ExplorerClient,
    pricer: CurvePricer<P>,
    tracker: GraduationTracker<P>,
}

impl<P: Provider + Clone> TokenCatalog<P> {
    pub fn new(chain: &Chain, provider: P, explorer: ExplorerClient) -> Self {
        Self {
            chain: chain.clone(),
            pricer: CurvePricer::new(chain, provider.clone()),
            tracker: GraduationTracker::new(chain, provider.clone()),
            provider,
            explorer,
        }
    }

    pub fn chain(&self) -> &Chain { &self.chain }

    pub fn pricer(&self) -> &CurvePricer<P> { &self.pricer }

    pub fn tracker(&self) -> &GraduationTracker<P> { &self.tracker }

    /// All candidate token addresses: factory enumeration merged with
    /// explorer-observed creations, factory itself excluded, deduplicated.
    pub async fn discover(&self) -> Result<Vec<Address>, LaunchpadError> {
        let factory = TokenFactory::new(self.chain.factory(), &self.provider);
        let count: u64 = factory.tokenCount().call().await?.try_into().unwrap_or(u64::MAX);

        let mut addresses = Vec::with_capacity(count as usize);
        for index in 0..count {
            addresses.push(factory.tokenAt(U256::from(index)).call().await?);
        }

        let observed = self.explorer.internal_transactions(self.chain.factory()).await;
        addresses.extend(indexer::creation_candidates(&observed, self.chain.factory()));

        Ok(addresses
            .into_iter()
            .filter(|address| *address != self.chain.factory())
            .unique()
            .collect())
    }

    /// Fully enriched record for one token.
    pub async fn enrich(&self, token: Address) -> Result<TokenRecord, LaunchpadError> {
        let factory = TokenFactory::new(self.chain.factory(), &self.provider);
        let info = factory.tokenInfo(token).call().await?;
        let mut record = TokenRecord::new(&info, self.pricer.converter());

        if let Some(extra) = self.explorer.address_info(token).await {
            record.apply_explorer(&extra);
        }

        let curve = self.pricer.curve_state(token).await?;
        let price = match self.pricer.price_from_state(token, curve.as_ref()).await {
            Ok(price) => price,
            // Not yet tradable is an expected state for a listed token
            Err(LaunchpadError::NoCurveData(_)) => UnitPrice::default(),
            Err(err) => return Err(err),
        };
        let graduation = self.tracker.status(token, curve.as_ref()).await;

        record.apply_curve(curve, price, graduation);
        Ok(record)
    }

    /// One full refresh: discovery plus concurrent enrichment. Also the
    /// on-demand override after a confirmed transaction, so fresh state
    /// surfaces without waiting out the poll interval.
    pub async fn refresh(&self) -> Result<CatalogSnapshot, LaunchpadError> {
        let instant = match self.provider.get_block(BlockId::latest()).await? {
            Some(block) => {
                types::StateInstant::new(block.header.number, block.header.timestamp)
            },
            None => types::StateInstant::default(),
        };
        let discovered = self.discover().await?;
        let tokens = enrich_all(discovered, |token| self.enrich(token)).await;
        Ok(CatalogSnapshot::new(instant, tokens))
    }

    /// Polling stream of snapshots: one immediately, then one per
    /// [`POLL_INTERVAL`]. Dropping the stream stops the polling; there is no
    /// detached timer to leak.
    pub fn updates<S, SFut>(
        &self,
        sleep: S,
    ) -> impl Stream<Item = Result<CatalogSnapshot, LaunchpadError>>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        stream::unfold(false, move |polled_before| async move {
            if polled_before {
                sleep(POLL_INTERVAL).await;
            }
            Some((self.refresh().await, true))
        })
    }
}

/// Enrichment with partial-failure isolation: a token whose enrichment
/// fails is logged and dropped from the snapshot; the rest survive.
pub(crate) async fn enrich_all<F, Fut>(addresses: Vec<Address>, enrich: F) -> Vec<TokenRecord>
where
    F: Fn(Address) -> Fut,
    Fut: Future<Output = Result<TokenRecord, LaunchpadError>>,
{
    stream::iter(addresses)
        .map(|address| {
            let record = enrich(address);
            async move { (address, record.await) }
        })
        .buffer_unordered(ENRICH_CONCURRENCY)
        .filter_map(|(address, result)| async move {
            match result {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(%address, %err, "token enrichment failed, dropped from catalog");
                    None
                },
            }
        })
        .collect()
        .await
}

#[cfg(feature = "display")]
impl std::fmt::Display for CatalogSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use colored::Colorize;
        use tabled::{Table, Tabled, settings::Style};

        #[derive(Tabled)]
        struct Row {
            #[tabled(rename = "Token")]
            token: String,
            #[tabled(rename = "Symbol")]
            symbol: String,
            #[tabled(rename = "Price")]
            price: String,
            #[tabled(rename = "Progress")]
            progress: String,
            #[tabled(rename = "Graduated")]
            graduated: String,
            #[tabled(rename = "Active")]
            active: String,
        }

        writeln!(f, "{}", format!("{} token(s) | {}", self.len(), self.instant).blue())?;
        let rows = self.tokens.iter().map(|token| Row {
            token: token.address().to_string(),
            symbol: token.symbol().to_string(),
            price: token.price().to_plain_string(),
            progress: format!("{}%", token.graduation().progress_percent()),
            graduated: if token.graduation().is_graduated() { "yes".to_string() } else { String::new() },
            active: if token.active() { "yes".to_string() } else { String::new() },
        });
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        table.fmt(f)
    }
}
