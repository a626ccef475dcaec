//! Persona framings for each role.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever a framing changes so
//! logged runs and run records can be traced back to the wording that
//! produced them.

use super::state::{RoleId, Turn};
use crate::generation::Prompt;

/// Prompt version. Bump on any framing change.
pub const PROMPT_VERSION: &str = "1.0.0";

/// Rendered history for a debate that has no turns yet.
pub const EMPTY_HISTORY: &str = "The debate has not started yet.";

const SCIENTIST_PERSONA: &str = "\
You are a Scientist debating a topic. Your arguments are evidence-based, logical, \
and grounded in scientific principles. Avoid emotional language; rely on data, \
research, and established theories.";

const PHILOSOPHER_PERSONA: &str = "\
You are a Philosopher debating a topic. Your arguments draw on logic, ethics, and \
philosophical frameworks. Explore the abstract, moral, and societal implications \
of the topic.";

/// Fixed persona description for a role.
pub fn persona(role: RoleId) -> &'static str {
    match role {
        RoleId::Scientist => SCIENTIST_PERSONA,
        RoleId::Philosopher => PHILOSOPHER_PERSONA,
        RoleId::Judge => "You are a neutral Judge evaluating a debate.",
    }
}

/// Render the transcript as `[Round N] Speaker: content` lines.
pub fn format_history(transcript: &[Turn]) -> String {
    if transcript.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    transcript
        .iter()
        .map(|turn| format!("[Round {}] {}: {}", turn.round(), turn.speaker, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Framing for a debater's next argument.
pub fn debater_prompt(role: RoleId, opponent: RoleId, topic: &str, transcript: &[Turn]) -> Prompt {
    let opening = if transcript.is_empty() {
        "You open the debate.".to_string()
    } else {
        format!("The {} just made their argument. Now it is your turn.", opponent)
    };
    let system = format!(
        "{persona}\n\
         You are debating the topic: {topic}.\n\
         Your opponent is the {opponent}.\n\
         The debate history is as follows:\n\
         {history}\n\
         {opening}\n\
         You are the {role}. Make your next argument concisely (in 1-2 sentences). \
         Do not repeat previous points. Directly state your argument without \
         introductory phrases like \"As a {lower}...\".",
        persona = persona(role),
        topic = topic,
        opponent = opponent,
        history = format_history(transcript),
        opening = opening,
        role = role,
        lower = role.to_string().to_lowercase(),
    );
    Prompt::new(system, format!("Your turn, {}.", role))
}

/// Framing for the judge's verdict.
pub fn judge_prompt(topic: &str, transcript: &[Turn]) -> Prompt {
    let [first, second] = RoleId::DEBATERS;
    let system = format!(
        "{persona} The debate is between a {first} and a {second} on the topic: '{topic}'.\n\
         Below is the full transcript of the debate.\n\n\
         {history}\n\n\
         Your task is to perform the following three actions:\n\
         1. Provide a neutral, one-paragraph summary of the entire debate.\n\
         2. Declare a winner. The winner must be either \"{first}\" or \"{second}\". \
         A draw is not allowed.\n\
         3. Provide a clear, logical justification for your decision, explaining why \
         the winner's arguments were more persuasive, coherent, or well-supported.\n\n\
         Structure your output EXACTLY as follows, with each section on a new line:\n\
         SUMMARY: [Your summary here]\n\
         WINNER: [{first} or {second}]\n\
         JUSTIFICATION: [Your justification here]",
        persona = persona(RoleId::Judge),
        first = first,
        second = second,
        topic = topic,
        history = format_history(transcript),
    );
    Prompt::new(system, "Deliver your verdict.")
}
