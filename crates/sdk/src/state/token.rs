use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use fastnum::UD256;

use super::*;
use crate::abi::TokenFactory::TokenInfo;

/// Structured creator profile attached to a token.
///
/// A proper optional sub-record: profile data is never embedded inside the
/// free-text description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenProfile {
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
}

impl TokenProfile {
    pub fn is_empty(&self) -> bool {
        self.website.is_none() && self.twitter.is_none() && self.telegram.is_none()
    }
}

/// One launched token, enriched with curve-derived state.
///
/// Created once an address is first observed (factory enumeration or
/// explorer discovery); tokens are permanent, records are only refreshed.
#[derive(Clone, derive_more::Debug)]
pub struct TokenRecord {
    address: Address,
    name: String,
    symbol: String,
    image_uri: String,
    description: String,
    profile: Option<TokenProfile>,
    creator: Address,
    created_at: DateTime<Utc>,
    #[debug("{total_supply}")]
    total_supply: UD256,
    active: bool,
    curve: Option<CurveState>,
    price: price::UnitPrice,
    graduation: graduation::GraduationStatus,
}

impl TokenRecord {
    pub(crate) fn new(info: &TokenInfo, converter: num::Converter) -> Self {
        Self {
            address: info.token,
            name: info.name.clone(),
            symbol: info.symbol.clone(),
            image_uri: info.imageUri.clone(),
            description: info.description.clone(),
            profile: None,
            creator: info.creator,
            created_at: DateTime::<Utc>::from_timestamp(info.createdAt as i64, 0)
                .unwrap_or_default(),
            total_supply: converter.from_unsigned(info.totalSupply),
            active: info.active,
            curve: None,
            price: price::UnitPrice::default(),
            graduation: graduation::GraduationStatus::default(),
        }
    }

    /// Supplements the record with explorer metadata. Factory data stays
    /// authoritative; only gaps are filled.
    pub(crate) fn apply_explorer(&mut self, info: &indexer::AddressInfo) {
        if self.name.is_empty()
            && let Some(name) = &info.name
        {
            self.name = name.clone();
        }
        if self.creator.is_zero()
            && let Some(creator) =
                info.creator_address_hash.as_deref().and_then(|h| h.parse::<Address>().ok())
        {
            self.creator = creator;
        }
        if self.created_at == DateTime::<Utc>::default()
            && let Some(ts) = info.creation_timestamp
        {
            self.created_at = DateTime::<Utc>::from_timestamp(ts as i64, 0).unwrap_or_default();
        }
        let profile = TokenProfile {
            website: info.website.clone(),
            twitter: info.twitter.clone(),
            telegram: info.telegram.clone(),
        };
        if !profile.is_empty() {
            self.profile = Some(profile);
        }
    }

    pub(crate) fn apply_curve(
        &mut self,
        curve: Option<CurveState>,
        price: price::UnitPrice,
        graduation: graduation::GraduationStatus,
    ) {
        self.curve = curve;
        self.price = price;
        self.graduation = graduation;
    }

    /// Unique identifier of the token; assigned at creation.
    pub fn address(&self) -> Address { self.address }

    pub fn name(&self) -> &str { &self.name }

    pub fn symbol(&self) -> &str { &self.symbol }

    pub fn image_uri(&self) -> &str { &self.image_uri }

    pub fn description(&self) -> &str { &self.description }

    pub fn profile(&self) -> Option<&TokenProfile> { self.profile.as_ref() }

    pub fn creator(&self) -> Address { self.creator }

    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Fixed at mint.
    pub fn total_supply(&self) -> UD256 { self.total_supply }

    /// Mutated by contract logic only; the client just mirrors it.
    pub fn active(&self) -> bool { self.active }

    pub fn curve(&self) -> Option<&CurveState> { self.curve.as_ref() }

    pub fn price(&self) -> price::UnitPrice { self.price }

    pub fn graduation(&self) -> graduation::GraduationStatus { self.graduation }

    #[cfg(any(feature = "test-utils", test))]
    pub fn for_test(address: Address, symbol: &str) -> Self {
        Self {
            address,
            name: format!("{symbol} token"),
            symbol: symbol.to_string(),
            image_uri: String::new(),
            description: String::new(),
            profile: None,
            creator: Address::ZERO,
            created_at: DateTime::<Utc>::default(),
            total_supply: UD256::ZERO,
            active: true,
            curve: None,
            price: price::UnitPrice::default(),
            graduation: graduation::GraduationStatus::default(),
        }
    }
}
