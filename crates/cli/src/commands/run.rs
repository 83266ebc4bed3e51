//! `protochain run` — execute the protocol chain against user input.

use crate::input::EditorInput;
use protochain_chain::{
    ChainRunner, ProtocolDefinition, ReservoirStore, StepOutcome, WorkingMemoryLog,
};
use protochain_config::AppConfig;
use protochain_core::input::InputCollaborator;
use protochain_core::provider::Provider;
use protochain_providers::ScriptedProvider;
use std::sync::Arc;

pub async fn run(input: Option<String>, offline: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for an API key early — give a clear error before any editor opens
    if !offline && !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ANTHROPIC_API_KEY  = 'sk-ant-...'");
        eprintln!("    PROTOCHAIN_API_KEY = 'sk-ant-...'");
        eprintln!();
        eprintln!("  Or add `api_key` to protochain.toml.");
        eprintln!("  (Use `protochain run --offline` to exercise the chain without a backend.)");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider: Arc<dyn Provider> = if offline {
        Arc::new(ScriptedProvider::new())
    } else {
        protochain_providers::from_config(&config)?
    };

    let memory = WorkingMemoryLog::new(&config.paths.working_memory_file);
    let reservoirs = ReservoirStore::new(&config.paths.reservoir_dir);
    let protocols = ProtocolDefinition::load_all(&config.protocols, &config.paths.patterns_dir)?;

    let collaborator = Arc::new(EditorInput::new(memory.clone()));
    let user_input = match input {
        Some(text) => text,
        None => collaborator.user_input().await?,
    };

    let runner = ChainRunner::new(
        provider,
        &config.default_model,
        memory.clone(),
        reservoirs,
        collaborator,
    )
    .with_temperature(config.default_temperature)
    .with_max_tokens(config.default_max_tokens);

    let result = runner.run_chain(&user_input, &protocols).await?;

    println!();
    println!("=== Protocol Results ===");
    for entry in result.iter() {
        println!();
        match &entry.outcome {
            StepOutcome::Skipped => println!("[{}]: (skipped)", entry.protocol),
            StepOutcome::Completed { output } => println!("[{}]:\n{output}", entry.protocol),
            StepOutcome::Failed { error } => println!("[{}]: Error: {error}", entry.protocol),
        }
    }

    println!();
    println!(
        "=== Final Working Memory ({}) ===",
        memory.path().display()
    );
    println!("{}", memory.read());

    println!(
        "  {} completed, {} failed, {} skipped",
        result.completed(),
        result.failed(),
        result.skipped()
    );

    Ok(())
}
