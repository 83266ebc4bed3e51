//! The protocol chain engine — the heart of Protochain.
//!
//! A chain is one ordered, sequential execution of protocol steps against
//! one user input:
//!
//! 1. **Reset** working memory with the raw user input
//! 2. For each protocol: **assemble** a prompt from its instructions, its
//!    declared access bindings (reservoir documents or the working memory
//!    itself), optional commentary, the user input, and the current
//!    working memory
//! 3. **Invoke** the completion provider with the assembled prompt
//! 4. **Append** the response to working memory for later steps to consume
//!
//! Steps execute strictly in order — each prompt depends on working memory
//! mutated by the previous step. A step's failure is recorded and the
//! chain continues; it never aborts the remaining steps.

pub mod assembler;
pub mod protocol;
pub mod reservoir;
pub mod runner;
pub mod working_memory;

pub use assembler::{PromptParts, ResolvedAccess, render_access_context, render_prompt};
pub use protocol::{AccessBinding, AccessSource, ProtocolDefinition};
pub use reservoir::ReservoirStore;
pub use runner::{ChainResult, ChainRunner, StepOutcome};
pub use working_memory::WorkingMemoryLog;
