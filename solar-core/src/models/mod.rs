mod financial_params;
mod quote;
mod scenario;
mod scenario_set;
mod sizing;
mod user_session;

pub use financial_params::{
    FinancialParameters, ParameterError, ParameterWarning, WarningTone, fraction_to_percent,
    percent_to_fraction,
};
pub use quote::{NewQuoteRecord, Owner, QuoteKind, QuoteRecord};
pub use scenario::{Scenario, ScenarioFlags};
pub use scenario_set::{Indicators, ScenarioSet, YearlyRow};
pub use sizing::{
    ConsumptionSource, InverterType, Location, RoofType, SizingQuote, SizingRequest,
    StructureType,
};
pub use user_session::UserSession;
