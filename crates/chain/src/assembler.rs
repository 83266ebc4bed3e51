//! Prompt assembly — pure, deterministic rendering of the per-step prompt.
//!
//! The full prompt concatenates, in fixed order: protocol name header,
//! instructions, the access-context block, the optional commentary block,
//! the raw user input, and the working-memory content as of just before
//! the step's own output is appended. Identical inputs always produce
//! identical output; no time-dependent or random logic is used here.

/// One resolved access binding, ready to render.
#[derive(Debug, Clone)]
pub struct ResolvedAccess {
    /// The binding's declared label
    pub label: String,
    /// Whether the content came from the working-memory log
    pub from_working_memory: bool,
    /// The resolved text
    pub content: String,
}

/// All inputs for one prompt.
#[derive(Debug, Clone)]
pub struct PromptParts<'a> {
    pub protocol: &'a str,
    pub instructions: &'a str,
    pub access_context: &'a str,
    pub commentary: Option<&'a str>,
    pub user_input: &'a str,
    pub working_memory: &'a str,
}

/// Render the access-context block: one titled subsection per resolved
/// binding, in declared order, joined with blank-line separation.
pub fn render_access_context(parts: &[ResolvedAccess]) -> String {
    parts
        .iter()
        .map(|part| {
            if part.from_working_memory {
                format!("### {} (Working Memory):\n{}", part.label, part.content)
            } else {
                format!("### {}:\n{}", part.label, part.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the full prompt for one protocol step.
pub fn render_prompt(parts: &PromptParts<'_>) -> String {
    let mut prompt = String::with_capacity(
        parts.instructions.len()
            + parts.access_context.len()
            + parts.user_input.len()
            + parts.working_memory.len()
            + 256,
    );

    prompt.push_str(&format!("Protocol: {}\n", parts.protocol));
    prompt.push_str(&format!("Instructions:\n{}\n\n", parts.instructions));
    prompt.push_str(&format!("Access Contexts:\n{}\n", parts.access_context));

    if let Some(commentary) = parts.commentary.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!(
            "\nCommentary for {}:\n{}\n",
            parts.protocol, commentary
        ));
    }

    prompt.push_str(&format!("\nUser Input:\n{}\n\n", parts.user_input));
    prompt.push_str(&format!("Working Memory:\n{}\n", parts.working_memory));

    prompt
}
