//! `protochain status` — show configuration, protocols, and
//! working-memory state.

use protochain_chain::{ReservoirStore, WorkingMemoryLog};
use protochain_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!();
    println!("  Model:          {}", config.default_model);
    println!("  Temperature:    {}", config.default_temperature);
    println!("  Max tokens:     {}", config.default_max_tokens);
    println!(
        "  API key:        {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );
    println!("  Patterns dir:   {}", config.paths.patterns_dir.display());
    println!("  Reservoir dir:  {}", config.paths.reservoir_dir.display());
    println!(
        "  Working memory: {}",
        config.paths.working_memory_file.display()
    );

    println!();
    println!("  Protocols:");
    for protocol in &config.protocols {
        let instructions = config.paths.patterns_dir.join(&protocol.instructions_file);
        let mut flags = Vec::new();
        if !protocol.included {
            flags.push("skipped");
        }
        if protocol.requires_commentary {
            flags.push("commentary");
        }
        if !instructions.exists() {
            flags.push("instructions missing!");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(", "))
        };

        println!("    {}{}", protocol.name, flags);
        for access in &protocol.accesses {
            println!("      - {} <- {}", access.label, access.source);
        }
    }

    let reservoirs = ReservoirStore::new(&config.paths.reservoir_dir);
    let available = reservoirs.list();
    println!();
    println!("  Reservoir documents ({}):", available.len());
    for name in available {
        println!("    {name}");
    }

    let memory = WorkingMemoryLog::new(&config.paths.working_memory_file);
    let titles = memory.section_titles();
    println!();
    if titles.is_empty() {
        println!("  Working memory: empty");
    } else {
        println!("  Working memory sections:");
        for title in titles {
            println!("    {title}");
        }
    }
    println!();

    Ok(())
}
