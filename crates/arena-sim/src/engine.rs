//! Simulation driver.

use arena_core::error::{AgentError, SimulationError};
use arena_core::traits::{Agent, DecisionContext, PriceSource};
use arena_core::types::{Action, Decision, Ledger, PriceSeries, Quote, Snapshot, Trade};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metrics::to_decimal;
use crate::report::RunReport;

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Starting cash for every agent
    pub initial_cash: Decimal,
    /// Flat fee charged per committed trade
    pub fee_per_trade: Decimal,
    /// Whether fees are charged at all
    pub fees_enabled: bool,
    /// Stop after this many steps
    pub max_steps: Option<u64>,
    /// Prices kept per symbol for agents to look at (0 = unlimited)
    pub history_limit: usize,
    /// Emit a progress line every N steps (0 = never)
    pub log_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: dec!(5000),
            fee_per_trade: dec!(1),
            fees_enabled: true,
            max_steps: None,
            history_limit: 0,
            log_every: 10,
        }
    }
}

impl SimulationConfig {
    /// A fresh ledger for one agent.
    pub fn ledger(&self) -> Ledger {
        Ledger::new(self.initial_cash, self.fee_per_trade, self.fees_enabled)
    }
}

/// Cooperative stop signal, checked between steps.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the run to stop before the next step.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The price source ran out of data
    Exhausted,
    /// `max_steps` was reached
    MaxSteps,
    /// The stop handle was triggered
    Interrupted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "source exhausted"),
            StopReason::MaxSteps => write!(f, "max steps reached"),
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// A committed trade, tagged with when and by whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub step: u64,
    pub timestamp: Option<i64>,
    pub agent: String,
    #[serde(flatten)]
    pub trade: Trade,
}

/// One registered agent together with everything it owns.
pub struct AgentSlot {
    agent: Box<dyn Agent>,
    ledger: Ledger,
    curve: Vec<Decimal>,
    failures: u64,
    rejections: u64,
    decisions: u64,
}

impl AgentSlot {
    fn new(agent: Box<dyn Agent>, ledger: Ledger) -> Self {
        Self {
            agent,
            ledger,
            curve: Vec::new(),
            failures: 0,
            rejections: 0,
            decisions: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn kind(&self) -> &str {
        self.agent.kind()
    }

    pub fn agent(&self) -> &dyn Agent {
        self.agent.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mark-to-market value after each step.
    pub fn curve(&self) -> &[Decimal] {
        &self.curve
    }

    /// Decisions that errored or panicked.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Orders the ledger refused.
    pub fn rejections(&self) -> u64 {
        self.rejections
    }

    /// Decisions returned successfully (including holds).
    pub fn decisions(&self) -> u64 {
        self.decisions
    }
}

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: u64,
    /// Symbols with a usable quote this step
    pub fresh: usize,
    pub trades: usize,
    pub failures: usize,
    pub rejections: usize,
}

/// Drives a set of agents through a stream of snapshots.
///
/// Every agent sees the same step before any decision is applied, and
/// each agent only ever touches its own ledger.
pub struct Simulation {
    config: SimulationConfig,
    symbols: Vec<String>,
    slots: Vec<AgentSlot>,
    histories: HashMap<String, PriceSeries>,
    last_prices: HashMap<String, Decimal>,
    trades: Vec<TradeEvent>,
    steps: u64,
    stop: StopHandle,
    unavailable_observations: u64,
    source_errors: u64,
    started_at: DateTime<Utc>,
}

impl Simulation {
    /// Create a simulation over a fixed symbol universe.
    pub fn new(config: SimulationConfig, symbols: Vec<String>) -> Result<Self, SimulationError> {
        if symbols.is_empty() {
            return Err(SimulationError::NoSymbols);
        }

        let histories = symbols
            .iter()
            .map(|s| (s.clone(), PriceSeries::with_capacity(s.clone(), config.history_limit)))
            .collect();

        Ok(Self {
            config,
            symbols,
            slots: Vec::new(),
            histories,
            last_prices: HashMap::new(),
            trades: Vec::new(),
            steps: 0,
            stop: StopHandle::default(),
            unavailable_observations: 0,
            source_errors: 0,
            started_at: Utc::now(),
        })
    }

    /// Register an agent with a fresh ledger. Names must be unique.
    pub fn add_agent(&mut self, agent: Box<dyn Agent>) -> Result<(), SimulationError> {
        if self.slots.iter().any(|s| s.name() == agent.name()) {
            return Err(SimulationError::DuplicateAgent(agent.name().to_string()));
        }
        debug!(agent = agent.name(), kind = agent.kind(), "Registered agent");
        self.slots.push(AgentSlot::new(agent, self.config.ledger()));
        Ok(())
    }

    /// Handle that stops the run at the next step boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn agents(&self) -> &[AgentSlot] {
        &self.slots
    }

    /// Look up an agent by name.
    pub fn agent(&self, name: &str) -> Option<&AgentSlot> {
        self.slots.iter().find(|s| s.name() == name)
    }

    pub fn histories(&self) -> &HashMap<String, PriceSeries> {
        &self.histories
    }

    pub fn history(&self, symbol: &str) -> Option<&PriceSeries> {
        self.histories.get(symbol)
    }

    /// Latest usable mid price per symbol.
    pub fn last_prices(&self) -> &HashMap<String, Decimal> {
        &self.last_prices
    }

    /// Every committed trade across all agents, in execution order.
    pub fn trades(&self) -> &[TradeEvent] {
        &self.trades
    }

    /// Steps processed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Symbol-steps that carried no usable quote.
    pub fn unavailable_observations(&self) -> u64 {
        self.unavailable_observations
    }

    /// Steps where the source itself failed.
    pub fn source_errors(&self) -> u64 {
        self.source_errors
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Process one snapshot: update histories, collect and apply every
    /// agent's decisions, then mark every ledger to market.
    pub fn step(&mut self, snapshot: &Snapshot) -> StepOutcome {
        let step = self.steps;
        let mut outcome = StepOutcome {
            step,
            ..StepOutcome::default()
        };

        let mut fresh: Vec<(&str, Quote)> = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            match snapshot.get(symbol).usable() {
                Some(quote) => {
                    if let Some(series) = self.histories.get_mut(symbol) {
                        series.push(quote.mid());
                    }
                    if let Some(price) = to_decimal(quote.mid()) {
                        self.last_prices.insert(symbol.clone(), price);
                    }
                    fresh.push((symbol.as_str(), quote));
                }
                None => self.unavailable_observations += 1,
            }
        }
        outcome.fresh = fresh.len();

        for slot in &mut self.slots {
            for &(symbol, quote) in &fresh {
                let history = match self.histories.get(symbol) {
                    Some(series) => series.prices(),
                    None => continue,
                };

                let ctx = DecisionContext::new(step, symbol, history, &slot.ledger)
                    .with_quote(quote.bid(), quote.ask());
                let agent = &mut slot.agent;
                let result = catch_unwind(AssertUnwindSafe(|| agent.decide(&ctx)))
                    .unwrap_or_else(|payload| {
                        Err(AgentError::Panicked(panic_message(payload.as_ref())))
                    });

                let decision = match result {
                    Ok(decision) => {
                        slot.decisions += 1;
                        decision
                    }
                    Err(e) => {
                        warn!(
                            agent = slot.agent.name(),
                            symbol,
                            step,
                            error = %e,
                            "Decision failed, holding"
                        );
                        slot.failures += 1;
                        outcome.failures += 1;
                        Decision::HOLD
                    }
                };

                if !decision.is_actionable() {
                    continue;
                }

                let fill = match decision.action {
                    Action::Buy => quote.buy_price(),
                    _ => quote.sell_price(),
                };
                let Some(price) = to_decimal(fill) else {
                    debug!(agent = slot.agent.name(), symbol, fill, "Unrepresentable fill price");
                    slot.rejections += 1;
                    outcome.rejections += 1;
                    continue;
                };

                let result = match decision.action {
                    Action::Buy => slot.ledger.buy(symbol, price, decision.quantity),
                    Action::Sell => slot.ledger.sell(symbol, price, decision.quantity),
                    Action::Hold => continue,
                };

                match result {
                    Ok(trade) => {
                        debug!(
                            agent = slot.agent.name(),
                            step,
                            side = %trade.side,
                            symbol,
                            qty = trade.qty,
                            price = %trade.price,
                            "Trade executed"
                        );
                        outcome.trades += 1;
                        self.trades.push(TradeEvent {
                            step,
                            timestamp: snapshot.timestamp,
                            agent: slot.agent.name().to_string(),
                            trade,
                        });
                    }
                    Err(reason) => {
                        debug!(agent = slot.agent.name(), step, symbol, %reason, "Order rejected");
                        slot.rejections += 1;
                        outcome.rejections += 1;
                    }
                }
            }
        }

        for slot in &mut self.slots {
            let value = slot
                .ledger
                .value_with(|symbol| self.last_prices.get(symbol).copied());
            slot.curve.push(value);
        }

        self.steps += 1;
        outcome
    }

    /// Replay the source until it is exhausted, `max_steps` is reached or
    /// the stop handle fires.
    pub async fn run(
        &mut self,
        source: &mut dyn PriceSource,
    ) -> Result<RunReport, SimulationError> {
        if self.slots.is_empty() {
            return Err(SimulationError::NoAgents);
        }

        if self.steps == 0 {
            self.started_at = Utc::now();
            for slot in &mut self.slots {
                slot.agent.reset();
            }
        }

        info!(
            source = source.name(),
            agents = self.slots.len(),
            symbols = ?self.symbols,
            "Starting simulation"
        );

        let stop_reason = loop {
            if self.stop.is_stopped() {
                info!(step = self.steps, "Stop requested");
                break StopReason::Interrupted;
            }
            if self.config.max_steps.is_some_and(|max| self.steps >= max) {
                break StopReason::MaxSteps;
            }

            let snapshot = match source.next_snapshot(&self.symbols).await {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => break StopReason::Exhausted,
                Err(e) => {
                    warn!(
                        step = self.steps,
                        error = %e,
                        "Price source failed, treating step as unavailable"
                    );
                    self.source_errors += 1;
                    Snapshot::unavailable(self.steps, &self.symbols)
                }
            };

            let outcome = self.step(&snapshot);

            if self.config.log_every > 0 && self.steps % self.config.log_every == 0 {
                info!(
                    step = outcome.step,
                    fresh = outcome.fresh,
                    trades = self.trades.len(),
                    "Progress"
                );
            }
        };

        let report = self.report(stop_reason);
        info!(
            steps = self.steps,
            trades = self.trades.len(),
            reason = %stop_reason,
            winner = report.winner().map(|s| s.agent.as_str()).unwrap_or("-"),
            "Simulation finished"
        );
        Ok(report)
    }

    /// Snapshot the current state as a report.
    pub fn report(&self, stop_reason: StopReason) -> RunReport {
        RunReport::new(self, stop_reason)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::types::Observation;

    /// Buys one share on the first step it sees, sells it on the second.
    struct RoundTrip {
        name: String,
        calls: u64,
    }

    impl RoundTrip {
        fn boxed(name: &str) -> Box<dyn Agent> {
            Box::new(Self {
                name: name.to_string(),
                calls: 0,
            })
        }
    }

    impl Agent for RoundTrip {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> &str {
            "round_trip"
        }

        fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
            self.calls += 1;
            Ok(match self.calls {
                1 => Decision::buy(1),
                2 if ctx.held() > 0 => Decision::sell(1),
                _ => Decision::HOLD,
            })
        }
    }

    struct Failing;

    impl Agent for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn kind(&self) -> &str {
            "failing"
        }

        fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
            Err(AgentError::DecisionFailed("boom".into()))
        }
    }

    /// Asks for as many shares as a u64 can hold.
    struct Greedy;

    impl Agent for Greedy {
        fn name(&self) -> &str {
            "greedy"
        }

        fn kind(&self) -> &str {
            "greedy"
        }

        fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
            Ok(Decision::buy(u64::MAX))
        }
    }

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default(), vec!["AAPL".to_string()]).unwrap()
    }

    #[test]
    fn test_requires_symbols() {
        let result = Simulation::new(SimulationConfig::default(), Vec::new());
        assert!(matches!(result, Err(SimulationError::NoSymbols)));
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let mut sim = sim();
        sim.add_agent(RoundTrip::boxed("a")).unwrap();
        let err = sim.add_agent(RoundTrip::boxed("a")).unwrap_err();
        assert!(matches!(err, SimulationError::DuplicateAgent(name) if name == "a"));
    }

    #[test]
    fn test_round_trip_with_fees() {
        let mut sim = sim();
        sim.add_agent(RoundTrip::boxed("a")).unwrap();

        let first = sim.step(&Snapshot::new(0).with_price("AAPL", 100.0));
        assert_eq!(first.trades, 1);
        assert_eq!(sim.agents()[0].ledger().cash(), dec!(4899));

        sim.step(&Snapshot::new(1).with_price("AAPL", 110.0));
        let slot = &sim.agents()[0];
        assert_eq!(slot.ledger().cash(), dec!(5008));
        assert!(slot.ledger().positions().is_empty());
        assert_eq!(slot.ledger().trade_count(), 2);
        assert_eq!(slot.curve(), &[dec!(4999), dec!(5008)]);
        assert_eq!(sim.trades().len(), 2);
    }

    #[test]
    fn test_bid_ask_fills() {
        let mut sim = sim();
        sim.add_agent(RoundTrip::boxed("a")).unwrap();

        sim.step(&Snapshot::new(0).with("AAPL", Observation::fresh(Quote::bid_ask(99.0, 101.0))));
        sim.step(&Snapshot::new(1).with("AAPL", Observation::fresh(Quote::bid_ask(104.0, 106.0))));

        let trades = sim.trades();
        assert_eq!(trades[0].trade.price, dec!(101));
        assert_eq!(trades[1].trade.price, dec!(104));
        assert_eq!(sim.history("AAPL").unwrap().prices(), &[100.0, 105.0]);
    }

    #[test]
    fn test_stale_and_unavailable_skip_decisions() {
        let mut sim = sim();
        sim.add_agent(RoundTrip::boxed("a")).unwrap();

        sim.step(&Snapshot::new(0).with("AAPL", Observation::stale(Quote::last(100.0))));
        sim.step(&Snapshot::new(1));

        assert!(sim.history("AAPL").unwrap().is_empty());
        assert_eq!(sim.unavailable_observations(), 2);
        assert_eq!(sim.agents()[0].decisions(), 0);
        assert_eq!(sim.agents()[0].curve(), &[dec!(5000), dec!(5000)]);
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut sim = sim();
        sim.add_agent(Box::new(Failing)).unwrap();
        sim.add_agent(RoundTrip::boxed("ok")).unwrap();

        let outcome = sim.step(&Snapshot::new(0).with_price("AAPL", 100.0));
        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.trades, 1);

        let failing = sim.agent("failing").unwrap();
        assert_eq!(failing.failures(), 1);
        assert_eq!(failing.curve(), &[dec!(5000)]);
        assert_eq!(sim.agent("ok").unwrap().ledger().get_position("AAPL"), 1);
    }

    #[test]
    fn test_oversized_order_is_rejected_not_fatal() {
        let mut sim = sim();
        sim.add_agent(Box::new(Greedy)).unwrap();
        sim.add_agent(RoundTrip::boxed("ok")).unwrap();

        let outcome = sim.step(&Snapshot::new(0).with_price("AAPL", 1.0e10));
        assert_eq!(outcome.rejections, 2);
        assert_eq!(outcome.trades, 0);

        let greedy = sim.agent("greedy").unwrap();
        assert_eq!(greedy.rejections(), 1);
        assert_eq!(greedy.ledger().cash(), dec!(5000));
        assert_eq!(greedy.curve(), &[dec!(5000)]);

        sim.step(&Snapshot::new(1).with_price("AAPL", 100.0));
        assert_eq!(sim.steps(), 2);
        assert_eq!(sim.agent("greedy").unwrap().rejections(), 2);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("bad");
        assert_eq!(panic_message(payload.as_ref()), "bad");
        let payload: Box<dyn Any + Send> = Box::new(String::from("worse"));
        assert_eq!(panic_message(payload.as_ref()), "worse");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_stop_handle_shared() {
        let sim = sim();
        let handle = sim.stop_handle();
        assert!(!sim.stop_handle().is_stopped());
        handle.stop();
        assert!(sim.stop_handle().is_stopped());
    }
}
