//! Mermaid export of the debate workflow.

use std::fmt::Write as _;

use debate_coordination::{EnginePhase, RoleId};

fn edge_label(from: EnginePhase, to: EnginePhase) -> &'static str {
    match (from, to) {
        (EnginePhase::Init, EnginePhase::Debating) => "inputs valid",
        (EnginePhase::Debating, EnginePhase::Debating) => "next speaker",
        (EnginePhase::Debating, EnginePhase::Judging) => "turn budget spent",
        (EnginePhase::Judging, EnginePhase::Done) => "verdict recorded",
        (_, EnginePhase::Failed) => "error or cancel",
        _ => "",
    }
}

fn node_id(phase: EnginePhase) -> String {
    format!("phase_{}", phase)
}

/// Render the engine's phase machine and the speaker rotation as a
/// Mermaid flowchart.
pub fn render_mermaid() -> String {
    let mut out = String::from("flowchart TD\n");

    out.push_str("    subgraph engine[Engine phases]\n");
    for phase in EnginePhase::ALL {
        let shape = if phase.is_terminal() {
            format!("(({}))", phase)
        } else {
            format!("[{}]", phase)
        };
        let _ = writeln!(out, "        {}{}", node_id(phase), shape);
    }
    for from in EnginePhase::ALL {
        for &to in from.valid_transitions() {
            let _ = writeln!(
                out,
                "        {} -->|{}| {}",
                node_id(from),
                edge_label(from, to),
                node_id(to)
            );
        }
    }
    out.push_str("    end\n");

    out.push_str("    subgraph speakers[Speaker rotation]\n");
    out.push_str("        start((start))\n");
    for role in RoleId::DEBATERS {
        let _ = writeln!(out, "        start -.->|first speaker| {}", role_id(role));
    }
    for role in RoleId::DEBATERS {
        if let Some(opponent) = role.opponent() {
            let _ = writeln!(
                out,
                "        {} -->|turns remain| {}",
                role_id(role),
                role_id(opponent)
            );
        }
        let _ = writeln!(
            out,
            "        {} -->|turn budget spent| {}",
            role_id(role),
            role_id(RoleId::Judge)
        );
    }
    let _ = writeln!(out, "        {} --> finish((end))", role_id(RoleId::Judge));
    out.push_str("    end\n");
    out
}

fn role_id(role: RoleId) -> String {
    role.to_string().to_lowercase()
}
