//! List agents command.

use anyhow::Result;
use arena_agents::AgentRegistry;

pub fn run() -> Result<()> {
    let registry = AgentRegistry::new();

    println!("Available Agents");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ({})", info.name, info.kind);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  defaults: {}", serde_json::to_string(&info.default_config)?);
        println!();
    }

    println!("Add agents to the config as [[agents]] entries with kind, name and params.");

    Ok(())
}
