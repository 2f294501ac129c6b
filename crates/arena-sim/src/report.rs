//! Run report generation.

use arena_core::types::{Position, SymbolSummary};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use uuid::Uuid;

use crate::engine::{AgentSlot, Simulation, SimulationConfig, StopReason, TradeEvent};
use crate::metrics::{evaluate, rank, CurveStats, Evaluation, Standing};

/// Ledger state at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub cash: Decimal,
    /// Open positions, sorted by symbol
    pub positions: Vec<Position>,
    pub trade_count: usize,
}

/// Everything recorded about one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: String,
    pub evaluation: Evaluation,
    pub stats: CurveStats,
    /// Value after each step
    pub curve: Vec<Decimal>,
    pub final_ledger: LedgerState,
    pub by_symbol: BTreeMap<String, SymbolSummary>,
    pub decisions: u64,
    pub failures: u64,
    pub rejections: u64,
}

impl AgentReport {
    fn from_slot(slot: &AgentSlot, sim: &Simulation) -> Self {
        let ledger = slot.ledger();
        let mut positions: Vec<Position> = ledger.positions().values().cloned().collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        Self {
            name: slot.name().to_string(),
            kind: slot.kind().to_string(),
            evaluation: evaluate(ledger, sim.histories()),
            stats: CurveStats::from_curve(ledger.initial_cash(), slot.curve()),
            curve: slot.curve().to_vec(),
            final_ledger: LedgerState {
                cash: ledger.cash(),
                positions,
                trade_count: ledger.trade_count(),
            },
            by_symbol: ledger.summarize_by_symbol(Some(sim.last_prices())),
            decisions: slot.decisions(),
            failures: slot.failures(),
            rejections: slot.rejections(),
        }
    }
}

/// Complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Configuration used
    pub config: SimulationConfig,
    pub symbols: Vec<String>,
    /// Steps processed
    pub steps: u64,
    pub stop_reason: StopReason,
    /// Per-agent results, in registration order
    pub agents: Vec<AgentReport>,
    /// Agents ranked by final value
    pub standings: Vec<Standing>,
    /// Every committed trade
    pub trades: Vec<TradeEvent>,
    pub unavailable_observations: u64,
    pub source_errors: u64,
}

impl RunReport {
    /// Build a report from the current state of a simulation.
    pub fn new(sim: &Simulation, stop_reason: StopReason) -> Self {
        let agents: Vec<AgentReport> = sim
            .agents()
            .iter()
            .map(|slot| AgentReport::from_slot(slot, sim))
            .collect();
        let standings = rank(agents.iter().map(|a| (a.name.as_str(), a.kind.as_str(), &a.stats)));

        Self {
            run_id: Uuid::new_v4(),
            started_at: sim.started_at(),
            finished_at: Utc::now(),
            config: sim.config().clone(),
            symbols: sim.symbols().to_vec(),
            steps: sim.steps(),
            stop_reason,
            agents,
            standings,
            trades: sim.trades().to_vec(),
            unavailable_observations: sim.unavailable_observations(),
            source_errors: sim.source_errors(),
        }
    }

    /// The top-ranked agent, if any.
    pub fn winner(&self) -> Option<&Standing> {
        self.standings.first()
    }

    /// Look up an agent's report by name.
    pub fn agent(&self, name: &str) -> Option<&AgentReport> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                       ARENA REPORT                         \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("RUN\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        let _ = writeln!(s, "  Run ID:              {}", self.run_id);
        let _ = writeln!(s, "  Symbols:             {}", self.symbols.join(", "));
        let _ = writeln!(s, "  Steps:               {}", self.steps);
        let _ = writeln!(s, "  Stopped:             {}", self.stop_reason);
        let _ = writeln!(s, "  Initial Cash:        ${:.2}", self.config.initial_cash);
        let _ = writeln!(s, "  Trades:              {}", self.trades.len());
        let _ = writeln!(s, "  Missing Quotes:      {}", self.unavailable_observations);
        let _ = writeln!(s, "  Source Errors:       {}", self.source_errors);
        if let Some(oracle) = self.agents.first().map(|a| a.evaluation.oracle_edge) {
            let _ = writeln!(s, "  Oracle Edge:         ${:.2}", oracle);
        }
        s.push('\n');

        s.push_str("STANDINGS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        for standing in &self.standings {
            let _ = writeln!(
                s,
                "  {:>2}. {:<20} ${:>10.2}  {:>+8.2}%",
                standing.rank, standing.agent, standing.final_value, standing.return_pct
            );
        }
        s.push('\n');

        s.push_str("AGENTS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        for agent in &self.agents {
            let _ = writeln!(s, "  {} ({})", agent.name, agent.kind);
            let _ = writeln!(
                s,
                "    Value ${:.2} | Cash ${:.2} | Trades {} | Max DD {:.2}%",
                agent.evaluation.final_value,
                agent.evaluation.cash,
                agent.evaluation.trades,
                agent.stats.max_drawdown_pct
            );
            if agent.failures > 0 || agent.rejections > 0 {
                let _ = writeln!(
                    s,
                    "    Failures {} | Rejections {}",
                    agent.failures, agent.rejections
                );
            }
        }
        s.push('\n');

        if let Some(winner) = self.winner() {
            let _ = writeln!(
                s,
                "  WINNER: {} with ${:.2} (profit ${:.2}, {:.2}%)",
                winner.agent, winner.final_value, winner.profit, winner.return_pct
            );
            s.push('\n');
        }

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export value curves as CSV, one column per agent.
    pub fn curves_to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let header = std::iter::once("step").chain(self.agents.iter().map(|a| a.name.as_str()));
        writer.write_record(header)?;

        let len = self.agents.iter().map(|a| a.curve.len()).max().unwrap_or(0);
        for step in 0..len {
            let mut row = vec![step.to_string()];
            row.extend(self.agents.iter().map(|agent| {
                agent
                    .curve
                    .get(step)
                    .map(|value| format!("{:.2}", value))
                    .unwrap_or_default()
            }));
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Human-readable trade log followed by each agent's final holdings.
    pub fn trades_log(&self) -> String {
        let mut log = String::new();

        for event in &self.trades {
            let _ = writeln!(
                log,
                "Step {:>4} | {:<20} | {:<4} {:>4} {:<5} @ ${:>8.2}",
                event.step,
                event.agent,
                event.trade.side.to_string(),
                event.trade.qty,
                event.trade.symbol,
                event.trade.price
            );
        }

        log.push_str("\nFINAL PORTFOLIOS\n");
        for agent in &self.agents {
            let ledger = &agent.final_ledger;
            let _ = writeln!(log, "{}:", agent.name);
            let _ = writeln!(
                log,
                "  Value: ${:.2} | Cash: ${:.2} | Positions: {} | Trades: {}",
                agent.evaluation.final_value,
                ledger.cash,
                ledger.positions.len(),
                ledger.trade_count
            );
            for position in &ledger.positions {
                let _ = writeln!(
                    log,
                    "    {}: {} @ ${:.2}",
                    position.symbol, position.qty, position.avg_price
                );
            }
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::error::AgentError;
    use arena_core::traits::{Agent, DecisionContext};
    use arena_core::types::{Decision, Snapshot};
    use rust_decimal_macros::dec;

    struct BuyOnce {
        name: &'static str,
        done: bool,
    }

    impl Agent for BuyOnce {
        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> &str {
            "buy_once"
        }

        fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
            if self.done {
                return Ok(Decision::HOLD);
            }
            self.done = true;
            Ok(Decision::buy(2))
        }
    }

    struct Idle;

    impl Agent for Idle {
        fn name(&self) -> &str {
            "idle"
        }

        fn kind(&self) -> &str {
            "idle"
        }

        fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
            Ok(Decision::HOLD)
        }
    }

    fn report() -> RunReport {
        let mut sim = Simulation::new(SimulationConfig::default(), vec!["AAPL".into()]).unwrap();
        sim.add_agent(Box::new(Idle)).unwrap();
        sim.add_agent(Box::new(BuyOnce {
            name: "buyer",
            done: false,
        }))
        .unwrap();

        sim.step(&Snapshot::new(0).with_price("AAPL", 100.0));
        sim.step(&Snapshot::new(1).with_price("AAPL", 120.0));
        sim.report(StopReason::Exhausted)
    }

    #[test]
    fn test_report_contents() {
        let report = report();
        assert_eq!(report.steps, 2);
        assert_eq!(report.trades.len(), 1);

        let buyer = report.agent("buyer").unwrap();
        assert_eq!(buyer.final_ledger.cash, dec!(4799));
        assert_eq!(buyer.final_ledger.positions[0].qty, 2);
        assert_eq!(buyer.evaluation.final_value, dec!(5039));
        assert_eq!(buyer.evaluation.oracle_edge, dec!(20));
        assert_eq!(buyer.by_symbol["AAPL"].unrealized_pnl, Some(dec!(40)));

        let winner = report.winner().unwrap();
        assert_eq!(winner.agent, "buyer");
        assert_eq!(report.standings[1].agent, "idle");
    }

    #[test]
    fn test_report_summary() {
        let summary = report().summary();
        assert!(summary.contains("STANDINGS"));
        assert!(summary.contains("WINNER: buyer"));
        assert!(summary.contains("$5039.00"));
    }

    #[test]
    fn test_curves_csv() {
        let csv = report().curves_to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "step,idle,buyer");
        assert_eq!(lines[1], "0,5000.00,4999.00");
        assert_eq!(lines[2], "1,5000.00,5039.00");
    }

    #[test]
    fn test_curves_csv_quotes_agent_names() {
        let mut report = report();
        report.agents[1].name = "buyer, cautious".to_string();

        let csv = report.curves_to_csv().unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 3);
        assert_eq!(&headers[2], "buyer, cautious");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 3));
        assert_eq!(&rows[1][2], "5039.00");
    }

    #[test]
    fn test_trades_log() {
        let log = report().trades_log();
        assert!(log.starts_with("Step    0 | buyer"));
        assert!(log.contains("BUY     2 AAPL  @ $  100.00"));
        assert!(log.contains("AAPL: 2 @ $100.00"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = report();
        let json = report.to_json().unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.agents.len(), 2);
    }
}
