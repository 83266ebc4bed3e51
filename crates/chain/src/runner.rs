//! The sequential chain runner.
//!
//! Iterates an ordered list of protocol definitions; for each one
//! assembles a prompt, invokes the completion provider, appends the
//! result to working memory, and records per-step success or failure
//! without aborting the chain.
//!
//! Per-step state machine:
//! `Pending → (Skipped | CommentaryCollection → PromptAssembly →
//! ModelInvocation → Appended) | Failed`. `Skipped` and `Failed` are
//! terminal per-step states that do not block subsequent steps;
//! `Appended` is the only state that mutates working memory.

use crate::assembler::{PromptParts, ResolvedAccess, render_access_context, render_prompt};
use crate::protocol::{AccessSource, ProtocolDefinition};
use crate::reservoir::ReservoirStore;
use crate::working_memory::WorkingMemoryLog;
use chrono::{DateTime, Utc};
use protochain_core::error::Error;
use protochain_core::event::{ChainEvent, EventBus};
use protochain_core::input::InputCollaborator;
use protochain_core::provider::{CompletionRequest, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// The terminal state of one protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Inclusion flag was off; no side effects, no model call
    Skipped,
    /// The model responded and the output was appended to working memory
    Completed { output: String },
    /// Something failed during the step; the chain continued
    Failed { error: String },
}

impl StepOutcome {
    /// The produced text: the model output for completed steps, empty for
    /// skipped steps, `None` for failures.
    pub fn output(&self) -> Option<&str> {
        match self {
            StepOutcome::Skipped => Some(""),
            StepOutcome::Completed { output } => Some(output),
            StepOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StepOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped)
    }
}

/// One (protocol, outcome) pair in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntry {
    pub protocol: String,
    pub outcome: StepOutcome,
}

/// The result of one chain run: one entry per declared protocol, in
/// execution order, whether skipped, completed, or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResult {
    run_id: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    entries: Vec<ChainEntry>,
}

impl ChainResult {
    fn new(run_id: String) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            started_at: now,
            finished_at: now,
            entries: Vec::new(),
        }
    }

    fn record(&mut self, protocol: &str, outcome: StepOutcome) {
        self.entries.push(ChainEntry {
            protocol: protocol.to_string(),
            outcome,
        });
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a protocol's outcome by name.
    pub fn get(&self, protocol: &str) -> Option<&StepOutcome> {
        self.entries
            .iter()
            .find(|e| e.protocol == protocol)
            .map(|e| &e.outcome)
    }

    /// Entries in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainEntry> {
        self.entries.iter()
    }

    pub fn completed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, StepOutcome::Completed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, StepOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_skipped())
            .count()
    }
}

/// Runs protocols strictly sequentially against one working-memory log.
///
/// The runner owns the log for the duration of a chain execution. Each
/// step's prompt depends on working memory mutated by the previous step,
/// so there is a hard ordering dependency — no two steps' model calls
/// overlap.
pub struct ChainRunner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    memory: WorkingMemoryLog,
    reservoirs: ReservoirStore,
    input: Arc<dyn InputCollaborator>,
    events: Arc<EventBus>,
}

impl ChainRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        memory: WorkingMemoryLog,
        reservoirs: ReservoirStore,
        input: Arc<dyn InputCollaborator>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            memory,
            reservoirs,
            input,
            events: Arc::new(EventBus::default()),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn memory(&self) -> &WorkingMemoryLog {
        &self.memory
    }

    /// Run the full chain against one user input.
    ///
    /// Re-initializes working memory with the user input, then attempts
    /// every protocol in list order. A single step's failure never aborts
    /// the remaining chain; the returned result carries one entry per
    /// protocol. Only a working-memory reset failure is a hard error — no
    /// chain can start without it.
    pub async fn run_chain(
        &self,
        user_input: &str,
        protocols: &[ProtocolDefinition],
    ) -> Result<ChainResult, Error> {
        let run_id = Uuid::new_v4().to_string();
        self.memory.reset(user_input)?;

        info!(run_id = %run_id, protocols = protocols.len(), "Chain started");
        self.events.publish(ChainEvent::ChainStarted {
            run_id: run_id.clone(),
            protocols: protocols.len(),
            timestamp: Utc::now(),
        });

        let mut result = ChainResult::new(run_id.clone());

        for protocol in protocols {
            if !protocol.included() {
                info!(protocol = %protocol.name(), "Skipping protocol (inclusion flag off)");
                self.events.publish(ChainEvent::StepSkipped {
                    protocol: protocol.name().to_string(),
                    timestamp: Utc::now(),
                });
                result.record(protocol.name(), StepOutcome::Skipped);
                continue;
            }

            let started = Instant::now();
            match self.run_step(user_input, protocol).await {
                Ok((output, tokens_used)) => {
                    info!(protocol = %protocol.name(), "Protocol executed successfully");
                    self.events.publish(ChainEvent::StepCompleted {
                        protocol: protocol.name().to_string(),
                        tokens_used,
                        duration_ms: started.elapsed().as_millis() as u64,
                        timestamp: Utc::now(),
                    });
                    result.record(protocol.name(), StepOutcome::Completed { output });
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(protocol = %protocol.name(), error = %message, "Protocol failed; chain continues");
                    self.events.publish(ChainEvent::StepFailed {
                        protocol: protocol.name().to_string(),
                        error_message: message.clone(),
                        timestamp: Utc::now(),
                    });
                    result.record(protocol.name(), StepOutcome::Failed { error: message });
                }
            }
        }

        result.finished_at = Utc::now();
        self.events.publish(ChainEvent::ChainFinished {
            run_id,
            completed: result.completed(),
            failed: result.failed(),
            skipped: result.skipped(),
            timestamp: Utc::now(),
        });

        Ok(result)
    }

    /// Execute one included protocol: collect commentary if required,
    /// assemble the prompt, invoke the provider, and append the response
    /// to working memory.
    async fn run_step(
        &self,
        user_input: &str,
        protocol: &ProtocolDefinition,
    ) -> Result<(String, Option<u32>), Error> {
        let commentary = if protocol.requires_commentary() {
            self.input.commentary(protocol.name()).await?
        } else {
            String::new()
        };

        let access_parts = self.resolve_accesses(protocol);
        let access_context = render_access_context(&access_parts);

        // Working memory is read again here so the prompt always carries
        // the latest accumulated context, even when the protocol declares
        // no explicit working-memory access.
        let working_memory = self.memory.read();

        let prompt = render_prompt(&PromptParts {
            protocol: protocol.name(),
            instructions: protocol.instructions(),
            access_context: &access_context,
            commentary: if commentary.is_empty() {
                None
            } else {
                Some(&commentary)
            },
            user_input,
            working_memory: &working_memory,
        });

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        let output = response.text.trim().to_string();
        let tokens_used = response.usage.map(|u| u.total_tokens);

        self.memory
            .append(&format!("{} Output", protocol.name()), &output)?;

        Ok((output, tokens_used))
    }

    /// Resolve a protocol's access bindings in declared order.
    ///
    /// The working-memory sentinel reads the *current* log, so later
    /// steps see prior steps' outputs. A reservoir that fails to load is
    /// logged and omitted — fail-soft, never aborting the step.
    fn resolve_accesses(&self, protocol: &ProtocolDefinition) -> Vec<ResolvedAccess> {
        let mut parts = Vec::with_capacity(protocol.accesses().len());

        for binding in protocol.accesses() {
            match &binding.source {
                AccessSource::WorkingMemory => parts.push(ResolvedAccess {
                    label: binding.label.clone(),
                    from_working_memory: true,
                    content: self.memory.read(),
                }),
                AccessSource::Reservoir(filename) => match self.reservoirs.load(filename) {
                    Ok(content) => parts.push(ResolvedAccess {
                        label: binding.label.clone(),
                        from_working_memory: false,
                        content,
                    }),
                    Err(err) => {
                        warn!(
                            protocol = %protocol.name(),
                            label = %binding.label,
                            file = %filename,
                            error = %err,
                            "Could not load reservoir; omitting access subsection"
                        );
                    }
                },
            }
        }

        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AccessBinding;
    use async_trait::async_trait;
    use protochain_core::error::{InputError, ProviderError};
    use protochain_core::input::StaticInput;
    use protochain_core::provider::{CompletionResponse, Usage};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ── Mocks ──────────────────────────────────────────────────────────

    /// Returns scripted responses in sequence and records every request.
    struct RecordingProvider {
        responses: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingProvider {
        fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn texts(responses: &[&str]) -> Self {
            Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> CompletionRequest {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok("default output".into()));
            next.map(|text| CompletionResponse {
                text,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock".into(),
            })
        }
    }

    /// Counts commentary requests.
    struct CountingInput {
        commentary: String,
        commentary_calls: AtomicUsize,
    }

    impl CountingInput {
        fn new(commentary: &str) -> Self {
            Self {
                commentary: commentary.into(),
                commentary_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InputCollaborator for CountingInput {
        async fn user_input(&self) -> Result<String, InputError> {
            Ok("unused".into())
        }

        async fn commentary(&self, _protocol_name: &str) -> Result<String, InputError> {
            self.commentary_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.commentary.clone())
        }
    }

    // ── Fixtures ───────────────────────────────────────────────────────

    fn protocol(name: &str, accesses: Vec<AccessBinding>) -> ProtocolDefinition {
        ProtocolDefinition::new(name, format!("{name} instructions"), accesses, true, false)
    }

    fn excluded(name: &str) -> ProtocolDefinition {
        ProtocolDefinition::new(name, format!("{name} instructions"), vec![], false, false)
    }

    fn reservoir_binding(label: &str, file: &str) -> AccessBinding {
        AccessBinding {
            label: label.into(),
            source: AccessSource::Reservoir(file.into()),
        }
    }

    fn memory_binding(label: &str) -> AccessBinding {
        AccessBinding {
            label: label.into(),
            source: AccessSource::WorkingMemory,
        }
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        memory: WorkingMemoryLog,
        reservoirs: ReservoirStore,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let reservoir_dir = tmp.path().join("reservoir");
        std::fs::create_dir_all(&reservoir_dir).unwrap();
        std::fs::write(reservoir_dir.join("Guidance.md"), "guidance content").unwrap();

        Fixture {
            memory: WorkingMemoryLog::new(tmp.path().join("instance.md")),
            reservoirs: ReservoirStore::new(reservoir_dir),
            _tmp: tmp,
        }
    }

    fn runner(fx: &Fixture, provider: Arc<dyn Provider>) -> ChainRunner {
        ChainRunner::new(
            provider,
            "mock-model",
            fx.memory.clone(),
            fx.reservoirs.clone(),
            Arc::new(StaticInput::new("unused")),
        )
    }

    // ── Tests ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn one_entry_per_protocol_in_list_order() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["one", "two", "three"]));
        let protocols = vec![
            protocol("Extract", vec![]),
            excluded("Atomize"),
            protocol("Reflect", vec![]),
            protocol("Integrate", vec![]),
        ];

        let result = runner(&fx, provider).run_chain("hello", &protocols).await.unwrap();

        assert_eq!(result.len(), protocols.len());
        let names: Vec<&str> = result.iter().map(|e| e.protocol.as_str()).collect();
        assert_eq!(names, vec!["Extract", "Atomize", "Reflect", "Integrate"]);
    }

    #[tokio::test]
    async fn excluded_protocol_yields_empty_and_never_calls_provider() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&[]));
        let protocols = vec![excluded("Extract"), excluded("Atomize")];

        let result = runner(&fx, provider.clone())
            .run_chain("hello", &protocols)
            .await
            .unwrap();

        assert_eq!(provider.calls(), 0);
        assert_eq!(result.get("Extract").unwrap().output(), Some(""));
        assert_eq!(result.get("Atomize").unwrap().output(), Some(""));
        assert_eq!(result.skipped(), 2);
        // Skipping has no side effects on working memory
        assert!(fx.memory.section_titles().is_empty());
    }

    #[tokio::test]
    async fn working_memory_accumulates_one_section_per_completed_step() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["first", "second"]));
        let protocols = vec![
            protocol("Extract", vec![]),
            excluded("Atomize"),
            protocol("Reflect", vec![]),
        ];

        runner(&fx, provider).run_chain("raw input", &protocols).await.unwrap();

        assert_eq!(
            fx.memory.section_titles(),
            vec!["Extract Output".to_string(), "Reflect Output".to_string()]
        );
        let content = fx.memory.read();
        assert!(content.starts_with(crate::working_memory::MEMORY_HEADER));
        assert!(content.contains("raw input"));
        assert!(content.contains("first"));
        assert!(content.contains("second"));
    }

    #[tokio::test]
    async fn missing_reservoir_fails_soft_and_step_still_runs() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["output"]));
        let protocols = vec![protocol(
            "Extract",
            vec![
                reservoir_binding("Absent", "Missing.md"),
                reservoir_binding("Present", "Guidance.md"),
            ],
        )];

        let result = runner(&fx, provider.clone())
            .run_chain("hello", &protocols)
            .await
            .unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(result.get("Extract").unwrap().output(), Some("output"));

        let prompt = provider.request(0).prompt;
        assert!(!prompt.contains("### Absent:"));
        assert!(prompt.contains("### Present:\nguidance content"));
    }

    #[tokio::test]
    async fn step_failure_does_not_abort_remaining_chain() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::new(vec![
            Ok("one".into()),
            Err(ProviderError::Network("connection refused".into())),
            Ok("three".into()),
            Ok("four".into()),
        ]));
        let protocols = vec![
            protocol("Extract", vec![]),
            protocol("Atomize", vec![]),
            protocol("Reflect", vec![]),
            protocol("Integrate", vec![]),
        ];

        let result = runner(&fx, provider.clone())
            .run_chain("hello", &protocols)
            .await
            .unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.get("Extract").unwrap().output(), Some("one"));
        assert!(
            result
                .get("Atomize")
                .unwrap()
                .error()
                .unwrap()
                .contains("connection refused")
        );
        assert_eq!(result.get("Reflect").unwrap().output(), Some("three"));
        assert_eq!(result.get("Integrate").unwrap().output(), Some("four"));
        assert_eq!(result.completed(), 3);
        assert_eq!(result.failed(), 1);

        // The failed step appended nothing
        assert_eq!(
            fx.memory.section_titles(),
            vec![
                "Extract Output".to_string(),
                "Reflect Output".to_string(),
                "Integrate Output".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn scenario_included_with_access_and_excluded() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["model output"]));
        let protocols = vec![
            protocol("A", vec![reservoir_binding("R", "Guidance.md")]),
            excluded("B"),
        ];

        let result = runner(&fx, provider)
            .run_chain("hello", &protocols)
            .await
            .unwrap();

        assert_eq!(result.get("A").unwrap().output(), Some("model output"));
        assert_eq!(result.get("B").unwrap().output(), Some(""));
        assert_eq!(fx.memory.section_titles(), vec!["A Output".to_string()]);
    }

    #[tokio::test]
    async fn later_steps_see_prior_outputs() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["alpha finding", "beta finding"]));
        let protocols = vec![
            protocol("Extract", vec![]),
            protocol("Reflect", vec![memory_binding("Prior Output")]),
        ];

        runner(&fx, provider.clone())
            .run_chain("hello", &protocols)
            .await
            .unwrap();

        let second_prompt = provider.request(1).prompt;
        // Through the declared working-memory access...
        assert!(second_prompt.contains("### Prior Output (Working Memory):"));
        // ...and through the trailing working-memory section, both carrying
        // the first step's output.
        let occurrences = second_prompt.matches("alpha finding").count();
        assert!(occurrences >= 2, "expected prior output in both sections");
    }

    #[tokio::test]
    async fn prompt_carries_working_memory_without_explicit_access() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["one", "two"]));
        let protocols = vec![protocol("Extract", vec![]), protocol("Atomize", vec![])];

        runner(&fx, provider.clone())
            .run_chain("the raw input", &protocols)
            .await
            .unwrap();

        let second_prompt = provider.request(1).prompt;
        assert!(second_prompt.contains("Working Memory:"));
        assert!(second_prompt.contains("one"));
        assert!(second_prompt.contains("the raw input"));
    }

    #[tokio::test]
    async fn commentary_collected_only_when_required_and_inserted_into_prompt() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["one", "two"]));
        let input = Arc::new(CountingInput::new("a human note"));
        let protocols = vec![
            ProtocolDefinition::new("Extract", "instructions", vec![], true, false),
            ProtocolDefinition::new("Reflect", "instructions", vec![], true, true),
        ];

        let runner = ChainRunner::new(
            provider.clone(),
            "mock-model",
            fx.memory.clone(),
            fx.reservoirs.clone(),
            input.clone(),
        );
        runner.run_chain("hello", &protocols).await.unwrap();

        assert_eq!(input.commentary_calls.load(Ordering::SeqCst), 1);
        assert!(!provider.request(0).prompt.contains("Commentary for"));
        assert!(
            provider
                .request(1)
                .prompt
                .contains("Commentary for Reflect:\na human note")
        );
        // Commentary is never persisted to working memory
        assert!(!fx.memory.read().contains("a human note"));
    }

    #[tokio::test]
    async fn provider_receives_configured_sampling_settings() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["out"]));
        let protocols = vec![protocol("Extract", vec![])];

        let runner = runner(&fx, provider.clone())
            .with_temperature(0.3)
            .with_max_tokens(8096);
        runner.run_chain("hello", &protocols).await.unwrap();

        let request = provider.request(0);
        assert_eq!(request.model, "mock-model");
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, Some(8096));
    }

    #[tokio::test]
    async fn response_text_is_trimmed_before_recording() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::texts(&["  padded output \n\n"]));
        let protocols = vec![protocol("Extract", vec![])];

        let result = runner(&fx, provider)
            .run_chain("hello", &protocols)
            .await
            .unwrap();

        assert_eq!(result.get("Extract").unwrap().output(), Some("padded output"));
    }

    #[tokio::test]
    async fn events_published_in_execution_order() {
        let fx = fixture();
        let provider = Arc::new(RecordingProvider::new(vec![
            Ok("one".into()),
            Err(ProviderError::Network("down".into())),
        ]));
        let events = Arc::new(EventBus::new(64));
        let mut rx = events.subscribe();

        let protocols = vec![
            protocol("Extract", vec![]),
            protocol("Atomize", vec![]),
            excluded("Reflect"),
        ];

        let runner = runner(&fx, provider).with_events(events);
        runner.run_chain("hello", &protocols).await.unwrap();

        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }
        assert_eq!(received.len(), 5);
        assert!(matches!(received[0].as_ref(), ChainEvent::ChainStarted { protocols: 3, .. }));
        assert!(matches!(
            received[1].as_ref(),
            ChainEvent::StepCompleted { protocol, .. } if protocol == "Extract"
        ));
        assert!(matches!(
            received[2].as_ref(),
            ChainEvent::StepFailed { protocol, .. } if protocol == "Atomize"
        ));
        assert!(matches!(
            received[3].as_ref(),
            ChainEvent::StepSkipped { protocol, .. } if protocol == "Reflect"
        ));
        assert!(matches!(
            received[4].as_ref(),
            ChainEvent::ChainFinished { completed: 1, failed: 1, skipped: 1, .. }
        ));
    }

    #[tokio::test]
    async fn reset_failure_is_hard_error() {
        let tmp = tempfile::tempdir().unwrap();
        let memory = WorkingMemoryLog::new("/nonexistent-dir/instance.md");
        let reservoirs = ReservoirStore::new(tmp.path());
        let provider = Arc::new(RecordingProvider::texts(&[]));

        let runner = ChainRunner::new(
            provider.clone(),
            "mock-model",
            memory,
            reservoirs,
            Arc::new(StaticInput::new("unused")),
        );
        let err = runner
            .run_chain("hello", &[protocol("Extract", vec![])])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Store(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn chain_result_serialization_tags_outcomes() {
        let mut result = ChainResult::new("run-1".into());
        result.record("Extract", StepOutcome::Completed { output: "text".into() });
        result.record("Atomize", StepOutcome::Skipped);
        result.record("Reflect", StepOutcome::Failed { error: "boom".into() });

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"kind\":\"completed\""));
        assert!(json.contains("\"kind\":\"skipped\""));
        assert!(json.contains("\"kind\":\"failed\""));

        let back: ChainResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.get("Reflect").unwrap().error(), Some("boom"));
    }
}
