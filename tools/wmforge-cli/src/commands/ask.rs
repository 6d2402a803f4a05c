//! Ask the assistant one question about a settings file.

use std::path::PathBuf;

use wmforge_assistant::{ContextGeneration, Conversation, GeminiAssistant};
use wmforge_common::{AppConfig, WmforgeError};

use super::load_settings;

pub async fn run(config: &AppConfig, path: PathBuf, question: String) -> anyhow::Result<()> {
    let settings = load_settings(&path)?.sanitized();
    let assistant = GeminiAssistant::from_env(&config.assistant).map_err(WmforgeError::from)?;

    let generation = ContextGeneration::new();
    let mut conversation = Conversation::new();
    let pending = conversation
        .begin(&question, &settings, generation.current())
        .map_err(WmforgeError::from)?;

    let outcome = pending.run(&assistant).await;
    let failed = outcome.result.is_err();
    let answer = conversation.finish(outcome, generation.current());

    println!("{}", answer.text);
    if failed {
        anyhow::bail!("assistant request failed");
    }
    Ok(())
}
