//! HTTP clients for the remote services the quoting tool depends on: the
//! sizing API, the financial projection API and the identity service.

pub mod bill;
pub mod client;
pub mod error;
pub mod financial;
pub mod identity;
pub mod sizing;

pub use bill::{BillDocument, BillError, DEFAULT_MAX_BILL_BYTES};
pub use error::{ApiError, Service};
pub use financial::{FinancialClient, ScenarioSource};
pub use identity::{AuthError, AuthState, FirebaseIdentity, IdentityProvider};
pub use sizing::SizingClient;
