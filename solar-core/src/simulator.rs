//! Transient state of the financial simulator.
//!
//! Holds the form parameters, the last fetched [`ScenarioSet`], the two
//! toggles and the live chart. Network calls happen outside: the caller asks
//! for a [`Ticket`] with [`Simulator::begin_submit`], performs the request, and
//! hands the outcome back to [`Simulator::complete`]. Only the ticket of the
//! current submission is accepted, so a response that arrives after a reset is
//! dropped.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{Agreement, DisplayTable, TableError, break_even, build, select};
use crate::chart::{ChartModel, ChartSlot};
use crate::models::{
    FinancialParameters, Indicators, ParameterError, Scenario, ScenarioFlags, ScenarioSet,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    #[error("a calculation is already in progress")]
    RequestPending,

    #[error("invalid parameters: {}", describe(.0))]
    InvalidParameters(Vec<ParameterError>),
}

fn describe(errors: &[ParameterError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Correlates a response with the submission that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result replaced the previous one.
    Applied,
    /// The error was recorded and the previous result cleared.
    Failed,
    /// The ticket no longer matches the current submission; nothing changed.
    Stale,
}

/// Everything shown for the currently selected scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioView {
    pub scenario: Scenario,
    pub flags: ScenarioFlags,
    pub indicators: Indicators,
    pub table: DisplayTable,
    pub break_even: Option<usize>,
    pub payback_check: Agreement,
    pub chart: ChartModel,
}

/// Derives the view of `set` for `flags` without touching any state.
pub fn derive_view(
    set: &ScenarioSet,
    flags: ScenarioFlags,
) -> Result<ScenarioView, TableError> {
    let table = build(set, flags)?;
    let selected = select(set, flags)?;

    Ok(ScenarioView {
        scenario: selected.scenario,
        flags,
        indicators: selected.indicators.clone(),
        break_even: break_even::locate(selected.flows),
        payback_check: break_even::reconcile(selected.flows, selected.indicators.payback),
        chart: ChartModel::from_flows(selected.scenario, selected.flows),
        table,
    })
}

#[derive(Debug, Default)]
pub struct Simulator {
    params: FinancialParameters,
    result: Option<Arc<ScenarioSet>>,
    flags: ScenarioFlags,
    pending: Option<Ticket>,
    generation: u64,
    last_error: Option<String>,
    chart: ChartSlot,
}

impl Simulator {
    pub fn new(params: FinancialParameters) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn parameters(&self) -> &FinancialParameters {
        &self.params
    }

    pub fn set_parameters(
        &mut self,
        params: FinancialParameters,
    ) {
        self.params = params;
    }

    pub fn flags(&self) -> ScenarioFlags {
        self.flags
    }

    pub fn result(&self) -> Option<&Arc<ScenarioSet>> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn chart(&self) -> &ChartSlot {
        &self.chart
    }

    /// Starts a submission of the current parameters.
    ///
    /// # Errors
    /// * [`SimulatorError::RequestPending`] while a previous submission has
    ///   not completed.
    /// * [`SimulatorError::InvalidParameters`] when any field is out of range.
    pub fn begin_submit(&mut self) -> Result<Ticket, SimulatorError> {
        if self.pending.is_some() {
            return Err(SimulatorError::RequestPending);
        }
        self.params.validate().map_err(SimulatorError::InvalidParameters)?;

        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
        };
        self.pending = Some(ticket);
        debug!(generation = self.generation, "calculation submitted");
        Ok(ticket)
    }

    /// Applies the outcome of the request `ticket` was issued for.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ScenarioSet, String>,
    ) -> Completion {
        if self.pending != Some(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale calculation response"
            );
            return Completion::Stale;
        }
        self.pending = None;

        match outcome {
            Ok(set) => {
                info!(years = set.horizon(), "calculation result received");
                self.result = Some(Arc::new(set));
                self.flags = ScenarioFlags::default();
                self.last_error = None;
                self.refresh_chart();
                Completion::Applied
            }
            Err(message) => {
                self.result = None;
                self.chart.clear();
                self.last_error = Some(message);
                Completion::Failed
            }
        }
    }

    /// Restores the default form and forgets any result, error or pending
    /// submission.
    pub fn reset(&mut self) {
        self.params = FinancialParameters::default();
        self.result = None;
        self.flags = ScenarioFlags::default();
        self.pending = None;
        self.last_error = None;
        self.chart.clear();
        self.generation += 1;
    }

    /// Switches scenario; re-derives from the fetched result only.
    pub fn set_flags(
        &mut self,
        flags: ScenarioFlags,
    ) {
        self.flags = flags;
        self.refresh_chart();
    }

    /// The derived view for the current result and toggles, if a result exists.
    pub fn view(&self) -> Option<Result<ScenarioView, TableError>> {
        self.result.as_deref().map(|set| derive_view(set, self.flags))
    }

    fn refresh_chart(&mut self) {
        let model = self.result.as_deref().and_then(|set| {
            select(set, self.flags)
                .ok()
                .map(|s| ChartModel::from_flows(s.scenario, s.flows))
        });

        match model {
            Some(model) => {
                self.chart.replace(model);
            }
            None => self.chart.clear(),
        }
    }
}
