use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Who a stored quote belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// A signed-in user, by identity-service uid.
    User(String),
    /// A visitor without an account, by locally generated session id.
    Anonymous(String),
}

impl Owner {
    pub fn kind(&self) -> &'static str {
        match self {
            Owner::User(_) => "user",
            Owner::Anonymous(_) => "anonymous",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Owner::User(id) | Owner::Anonymous(id) => id,
        }
    }

    pub fn parse(
        kind: &str,
        id: String,
    ) -> Option<Self> {
        match kind {
            "user" => Some(Owner::User(id)),
            "anonymous" => Some(Owner::Anonymous(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteKind {
    Sizing,
    Projection,
}

impl QuoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteKind::Sizing => "sizing",
            QuoteKind::Projection => "projection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sizing" => Some(QuoteKind::Sizing),
            "projection" => Some(QuoteKind::Projection),
            _ => None,
        }
    }
}

/// A stored quote or projection, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: i64,
    pub owner: Owner,
    pub kind: QuoteKind,

    // Sizing summary
    pub power_kwp: Option<Decimal>,
    pub panel_count: Option<u32>,
    pub total_price: Option<Decimal>,

    // Projection summary (base scenario)
    pub npv: Option<Decimal>,
    pub irr: Option<Decimal>,
    pub payback: Option<Decimal>,

    /// Full request and response, kept verbatim as JSON.
    pub payload: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

/// For appending new quotes (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuoteRecord {
    pub owner: Owner,
    pub kind: QuoteKind,
    pub power_kwp: Option<Decimal>,
    pub panel_count: Option<u32>,
    pub total_price: Option<Decimal>,
    pub npv: Option<Decimal>,
    pub irr: Option<Decimal>,
    pub payback: Option<Decimal>,
    pub payload: serde_json::Value,
}

impl NewQuoteRecord {
    pub fn sizing(
        owner: Owner,
        quote: &super::SizingQuote,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            owner,
            kind: QuoteKind::Sizing,
            power_kwp: Some(quote.power_kwp),
            panel_count: Some(quote.panel_count),
            total_price: Some(quote.total_price),
            npv: None,
            irr: None,
            payback: None,
            payload,
        }
    }

    pub fn projection(
        owner: Owner,
        indicators: Option<&super::Indicators>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            owner,
            kind: QuoteKind::Projection,
            power_kwp: None,
            panel_count: None,
            total_price: None,
            npv: indicators.and_then(|i| i.npv),
            irr: indicators.and_then(|i| i.irr),
            payback: indicators.and_then(|i| i.payback),
            payload,
        }
    }
}
