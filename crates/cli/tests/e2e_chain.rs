//! End-to-end integration tests for the Protochain orchestrator.
//!
//! These exercise the full pipeline from configuration to chain result:
//! config parsing, protocol construction from instruction files, prompt
//! assembly, provider invocation, and working-memory accumulation.

use protochain_chain::{ChainRunner, ProtocolDefinition, ReservoirStore, WorkingMemoryLog};
use protochain_config::AppConfig;
use protochain_core::input::StaticInput;
use protochain_providers::ScriptedProvider;
use std::sync::Arc;

const CONFIG_TOML: &str = r#"
default_model = "claude-3-5-sonnet-20241022"
default_temperature = 0.0
default_max_tokens = 8096

[paths]
patterns_dir = "patterns"
reservoir_dir = "reservoir"
working_memory_file = "instance.md"

[[protocols]]
name = "Extract"
instructions_file = "Extract.md"
accesses = [
    { label = "Intuition Reservoir", source = "Intuition_Reservoir.md" },
]

[[protocols]]
name = "Atomize"
instructions_file = "Atomize.md"
included = false

[[protocols]]
name = "Reflect"
instructions_file = "Reflect.md"
accesses = [
    { label = "Newly Atomized Abstractions", source = "working-memory" },
    { label = "Missing Theory", source = "Absent.md" },
]
"#;

struct Workspace {
    _tmp: tempfile::TempDir,
    config: AppConfig,
    protocols: Vec<ProtocolDefinition>,
    memory: WorkingMemoryLog,
    reservoirs: ReservoirStore,
}

fn workspace() -> Workspace {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    std::fs::write(root.join("protochain.toml"), CONFIG_TOML).unwrap();

    let patterns = root.join("patterns");
    std::fs::create_dir_all(&patterns).unwrap();
    std::fs::write(patterns.join("Extract.md"), "Extract the key ideas.").unwrap();
    std::fs::write(patterns.join("Atomize.md"), "Atomize the extractions.").unwrap();
    std::fs::write(patterns.join("Reflect.md"), "Reflect on the abstractions.").unwrap();

    let reservoir = root.join("reservoir");
    std::fs::create_dir_all(&reservoir).unwrap();
    std::fs::write(reservoir.join("Intuition_Reservoir.md"), "Trust the source text.").unwrap();

    let config = AppConfig::load_from(&root.join("protochain.toml")).unwrap();
    let protocols =
        ProtocolDefinition::load_all(&config.protocols, &root.join(&config.paths.patterns_dir))
            .unwrap();
    let memory = WorkingMemoryLog::new(root.join(&config.paths.working_memory_file));
    let reservoirs = ReservoirStore::new(root.join(&config.paths.reservoir_dir));

    Workspace {
        config,
        protocols,
        memory,
        reservoirs,
        _tmp: tmp,
    }
}

fn runner(ws: &Workspace, provider: Arc<ScriptedProvider>) -> ChainRunner {
    ChainRunner::new(
        provider,
        &ws.config.default_model,
        ws.memory.clone(),
        ws.reservoirs.clone(),
        Arc::new(StaticInput::new("unused")),
    )
    .with_temperature(ws.config.default_temperature)
    .with_max_tokens(ws.config.default_max_tokens)
}

#[tokio::test]
async fn e2e_full_chain_from_config() {
    let ws = workspace();
    let provider = Arc::new(ScriptedProvider::with_responses(vec![
        "extracted ideas".into(),
        "reflections".into(),
    ]));

    let result = runner(&ws, provider.clone())
        .run_chain("the raw source text", &ws.protocols)
        .await
        .unwrap();

    // One entry per declared protocol, in order
    assert_eq!(result.len(), 3);
    let names: Vec<&str> = result.iter().map(|e| e.protocol.as_str()).collect();
    assert_eq!(names, vec!["Extract", "Atomize", "Reflect"]);

    // Skipped protocol produced an empty result and no model call for it
    assert_eq!(result.get("Atomize").unwrap().output(), Some(""));
    assert_eq!(provider.calls(), 2);

    // Outputs recorded under protocol names
    assert_eq!(result.get("Extract").unwrap().output(), Some("extracted ideas"));
    assert_eq!(result.get("Reflect").unwrap().output(), Some("reflections"));

    // Working memory: header, user input, one section per completed step
    let content = ws.memory.read();
    assert!(content.starts_with("# Working Memory"));
    assert!(content.contains("the raw source text"));
    assert_eq!(
        ws.memory.section_titles(),
        vec!["Extract Output".to_string(), "Reflect Output".to_string()]
    );
}

#[tokio::test]
async fn e2e_prompts_carry_declared_context() {
    let ws = workspace();
    let provider = Arc::new(ScriptedProvider::with_responses(vec![
        "extracted ideas".into(),
        "reflections".into(),
    ]));

    runner(&ws, provider.clone())
        .run_chain("the raw source text", &ws.protocols)
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests[0].model, "claude-3-5-sonnet-20241022");
    assert_eq!(requests[0].max_tokens, Some(8096));

    // Extract sees its reservoir and its instructions
    let extract_prompt = &requests[0].prompt;
    assert!(extract_prompt.starts_with("Protocol: Extract"));
    assert!(extract_prompt.contains("Extract the key ideas."));
    assert!(extract_prompt.contains("### Intuition Reservoir:\nTrust the source text."));

    // Reflect sees Extract's output via its working-memory access, and the
    // missing reservoir is omitted without failing the step
    let reflect_prompt = &requests[1].prompt;
    assert!(reflect_prompt.contains("### Newly Atomized Abstractions (Working Memory):"));
    assert!(reflect_prompt.contains("extracted ideas"));
    assert!(!reflect_prompt.contains("### Missing Theory:"));
}

#[tokio::test]
async fn e2e_offline_echo_provider() {
    let ws = workspace();
    let provider = Arc::new(ScriptedProvider::new());

    let result = runner(&ws, provider)
        .run_chain("source", &ws.protocols)
        .await
        .unwrap();

    let output = result.get("Extract").unwrap().output().unwrap();
    assert!(output.starts_with("[offline]"));
    // Echoed output flows into the next step's working memory
    assert!(ws.memory.read().contains("[offline]"));
}

#[test]
fn e2e_missing_instruction_file_fails_construction() {
    let ws = workspace();
    let patterns = ws.memory.path().parent().unwrap().join("patterns");
    std::fs::remove_file(patterns.join("Reflect.md")).unwrap();

    let err = ProtocolDefinition::load_all(&ws.config.protocols, &patterns).unwrap_err();
    assert!(err.to_string().contains("Reflect"));
}
