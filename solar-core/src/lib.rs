pub mod calculations;
pub mod chart;
pub mod db;
pub mod format;
pub mod models;
pub mod simulator;

pub use calculations::{DisplayTable, SelectionError, TableError};
pub use chart::{ChartModel, ChartSlot};
pub use db::repository::{QuoteRepository, RepositoryError};
pub use models::*;
pub use simulator::{Completion, ScenarioView, Simulator, SimulatorError, Ticket};
