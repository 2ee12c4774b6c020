//! Client-side derivations over a fetched [`ScenarioSet`](crate::models::ScenarioSet).
//!
//! Every function here is pure: the result set is only ever read, so toggling
//! between scenarios re-derives from the same data without a new request.

pub mod break_even;
pub mod cash_flow_table;
pub mod common;
pub mod scenario_selector;

pub use break_even::{Agreement, locate, reconcile};
pub use cash_flow_table::{Cell, CellKind, Column, DisplayRow, DisplayTable, TableError, build};
pub use scenario_selector::{SelectedScenario, SelectionError, select};
