//! Prompt construction for completion requests
//!
//! Both builders are pure: the same goal, objective and history always give
//! the same prompt text.

use crate::state_machine::{
    ConvContext, ConvState, ConversationLog, ObjectiveList, Speaker, TurnMode,
};
use std::fmt::Write;

/// Reply contract appended to every scripted prompt
const SCRIPTED_REPLY_FORMAT: &str = r#"Respond in a way that accomplishes the current objective.

Return your response and a flag:
- "continue" to keep working on this objective
- "shift" to move to the next objective
- "conclude" to end the conversation

Format strictly as a single JSON object and nothing else:
{ "res": "<response>", "flag": "<continue|shift|conclude>" }"#;

const FREEFORM_CLOSING: &str = "Please respond in a natural and helpful tone. Keep the goal in mind, but do not repeat it unless necessary.";

/// Prompt for an objective-driven turn
pub fn scripted_prompt(goal: &str, objective: &str, history: &str) -> String {
    format!(
        "You are an autonomous agent working towards a goal.\n\n\
         Goal: {goal}\n\
         Current Objective: {objective}\n\n\
         Conversation History:\n{history}\n\n\
         {SCRIPTED_REPLY_FORMAT}\n"
    )
}

/// Prompt for a goal-only turn; objectives are offered as loose guidance
pub fn freeform_prompt(goal: &str, objectives: &ObjectiveList, history: &str) -> String {
    let mut prompt = format!(
        "You are an intelligent assistant acting on behalf of the user to help accomplish the following goal:\n\n\
         Goal: {goal}\n\n\
         Guide the discussion in a friendly, natural, and persuasive way that supports the user's objective.\n\n\
         To achieve this goal, follow these key tasks (but adapt naturally to the flow of conversation):\n\n"
    );
    for (i, objective) in objectives.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {objective}", i + 1);
    }
    let _ = write!(
        prompt,
        "\nHere is the current conversation history:\n{history}\n\n{FREEFORM_CLOSING}\n"
    );
    prompt
}

/// Prompt for the next completion request of a session
pub fn build_prompt(
    context: &ConvContext,
    state: &ConvState,
    log: &ConversationLog,
    mode: TurnMode,
) -> String {
    let script = &context.script;
    let history = match state.pending_message() {
        Some(pending) => log.rendered_with(Speaker::User, pending),
        None => log.rendered(),
    };
    match mode {
        TurnMode::Scripted => scripted_prompt(
            script.goal(),
            state.cursor.label(script.objectives()),
            &history,
        ),
        TurnMode::Freeform => freeform_prompt(script.goal(), script.objectives(), &history),
    }
}
