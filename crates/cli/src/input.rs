//! Editor-based interactive input.
//!
//! Opens the user's editor (`$VISUAL`, `$EDITOR`, falling back to `vi`) on
//! a temp file, then filters out lines starting with `#`. A pre-seeded
//! `[User Input]:` section in the working-memory file takes precedence
//! over opening the editor.

use async_trait::async_trait;
use protochain_chain::WorkingMemoryLog;
use protochain_core::error::InputError;
use protochain_core::input::InputCollaborator;
use std::io::Write;
use std::process::Command;
use tracing::debug;

pub struct EditorInput {
    memory: WorkingMemoryLog,
}

impl EditorInput {
    pub fn new(memory: WorkingMemoryLog) -> Self {
        Self { memory }
    }

    fn editor_command() -> String {
        std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".into())
    }

    /// Open the editor on a temp file seeded with `template`; return the
    /// saved text with `#`-comment lines removed, or `None` when nothing
    /// real was entered.
    fn capture(template: &str) -> Result<Option<String>, InputError> {
        let mut file = tempfile::Builder::new()
            .suffix(".md")
            .tempfile()
            .map_err(|e| InputError::EditorFailed(format!("temp file: {e}")))?;
        file.write_all(template.as_bytes())
            .map_err(|e| InputError::EditorFailed(format!("temp file: {e}")))?;
        file.flush()
            .map_err(|e| InputError::EditorFailed(format!("temp file: {e}")))?;

        let editor = Self::editor_command();
        debug!(editor = %editor, "Opening editor for input capture");

        let status = Command::new(&editor)
            .arg(file.path())
            .status()
            .map_err(|e| InputError::EditorFailed(format!("{editor}: {e}")))?;
        if !status.success() {
            return Err(InputError::EditorFailed(format!(
                "{editor} exited with {status}"
            )));
        }

        let edited = std::fs::read_to_string(file.path())
            .map_err(|e| InputError::EditorFailed(format!("read back: {e}")))?;

        let filtered = filter_comment_lines(&edited);
        if filtered.is_empty() {
            Ok(None)
        } else {
            Ok(Some(filtered))
        }
    }
}

/// Remove lines starting with `#` and strip surrounding whitespace.
fn filter_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[async_trait]
impl InputCollaborator for EditorInput {
    async fn user_input(&self) -> Result<String, InputError> {
        // A pre-seeded input section wins over opening an editor
        if let Some(existing) = self.memory.user_input() {
            debug!("Reusing pre-seeded user input from working memory");
            return Ok(existing);
        }

        println!(
            "No user input found.\n\
             An editor will open for you to paste/type your raw input text. \
             Save and close the editor when done."
        );

        let template = "# input text:\n\n".to_string();
        let captured = tokio::task::spawn_blocking(move || Self::capture(&template))
            .await
            .map_err(|e| InputError::EditorFailed(e.to_string()))??;

        captured.ok_or_else(|| {
            InputError::Aborted("editor was closed without saving any content".into())
        })
    }

    async fn commentary(&self, protocol_name: &str) -> Result<String, InputError> {
        println!(
            "Protocol '{protocol_name}' requires commentary.\n\
             An editor will open for you to paste/type your commentary. \
             Save and close the editor when done."
        );

        let template = format!("# Commentary for protocol {protocol_name}:\n\n");
        let captured = tokio::task::spawn_blocking(move || Self::capture(&template))
            .await
            .map_err(|e| InputError::EditorFailed(e.to_string()))??;

        // Cancelled commentary is not an error; the step proceeds without it
        Ok(captured.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_comment_lines() {
        let text = "# a template comment\n\nreal content\n  # indented comment\nmore\n";
        assert_eq!(filter_comment_lines(text), "real content\n\nmore");
    }

    #[test]
    fn all_comments_is_empty() {
        assert_eq!(filter_comment_lines("# one\n# two\n"), "");
    }

    #[tokio::test]
    async fn preseeded_input_skips_editor() {
        let tmp = tempfile::tempdir().unwrap();
        let memory = WorkingMemoryLog::new(tmp.path().join("instance.md"));
        memory.reset("already provided").unwrap();

        let input = EditorInput::new(memory);
        assert_eq!(input.user_input().await.unwrap(), "already provided");
    }
}
