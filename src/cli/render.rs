//! Plain-text rendering of session results.

use std::fmt::Write;

use crate::session::{
    AcceptedRound, ActivityLog, AnalystResult, CreatorContent, Debater, FlagKind, InterviewPrompt,
    ProgressTracker, SubTask, Turn, TurnRole, VibeReport,
};
use crate::utils::{one_line, truncate_str};

const BAR_WIDTH: usize = 20;

fn bar(value: f64) -> String {
    let filled = ((value / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

fn list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading}");
    for item in items {
        let _ = writeln!(out, "  • {item}");
    }
}

pub fn analysis(result: &AnalystResult) -> String {
    let mut out = String::new();
    let score = result.overall_score.map_or_else(|| "?".to_string(), number);
    let _ = writeln!(
        out,
        "Vibe score: {}/100  {}",
        score,
        result.score_label.as_deref().unwrap_or("")
    );
    if let Some(summary) = &result.summary {
        let _ = writeln!(out, "\n{summary}");
    }

    if let Some(meter) = &result.vibe_meter {
        let _ = writeln!(out, "\nVibe meter");
        for (name, value) in meter.axes() {
            let _ = writeln!(out, "  {:<14} {} {:>3}", name, bar(value), number(value));
        }
    }

    if !result.findings.is_empty() {
        let _ = writeln!(out, "\nFindings");
        for finding in &result.findings {
            let marker = match finding.flag() {
                FlagKind::Green => "[green]",
                FlagKind::Red => "[red]",
                FlagKind::Yellow => "[yellow]",
                FlagKind::Other => "[note]",
            };
            let _ = writeln!(
                out,
                "  {} {} ({}/10)",
                marker,
                finding.title.as_deref().unwrap_or("Untitled"),
                number(finding.severity())
            );
            if let Some(description) = &finding.description {
                let _ = writeln!(out, "      {description}");
            }
            if let Some(evidence) = &finding.evidence {
                let _ = writeln!(out, "      > {}", truncate_str(&one_line(evidence), 90));
            }
        }
    }

    if let Some(verdict) = &result.verdict {
        let _ = writeln!(out, "\nVerdict: {verdict}");
    }
    list(&mut out, "Recommendations", &result.recommendations);
    out
}

fn debater(out: &mut String, label: &str, d: &Debater) {
    let _ = writeln!(
        out,
        "\n  {} ({}) emotion {}/10",
        d.name.as_deref().unwrap_or(label),
        label,
        number(d.emotion())
    );
    if let Some(argument) = &d.argument {
        let _ = writeln!(out, "    {argument}");
    }
    for point in d.key_points.iter().chain(&d.rebuttals) {
        let _ = writeln!(out, "    - {point}");
    }
}

pub fn debate_round(accepted: &AcceptedRound) -> String {
    let round = &accepted.round;
    let mut out = String::new();
    let total = round
        .total_rounds
        .map(|t| format!(" of {t}"))
        .unwrap_or_default();
    let _ = writeln!(out, "── Round {}{} ──", accepted.index, total);
    if let Some(intro) = &round.introduction {
        let _ = writeln!(out, "{intro}");
    }
    if let Some(a) = &round.debater_a {
        debater(&mut out, "A", a);
    }
    if let Some(b) = &round.debater_b {
        debater(&mut out, "B", b);
    }
    if let Some(summary) = &round.round_summary {
        let _ = writeln!(out, "\n  Summary: {summary}");
    }
    if let Some(verdict) = &round.verdict {
        if let Some(winner) = verdict.winner.as_deref().filter(|w| !w.is_empty()) {
            let _ = writeln!(out, "  Winner: {winner}");
        }
        if let Some(score) = &verdict.final_score {
            let _ = writeln!(out, "  Score: {score}");
        }
        if let Some(reasoning) = &verdict.reasoning {
            let _ = writeln!(out, "  {reasoning}");
        }
    }
    out
}

pub fn turn(turn: &Turn) -> String {
    match turn.role {
        TurnRole::Agent => format!("Creator: {}", turn.text),
        TurnRole::User => format!("You: {}", turn.text),
    }
}

/// `(question 2 of 3)` when the agent numbered its question.
pub fn question_counter(prompt: &InterviewPrompt) -> Option<String> {
    let number = prompt.question_number?;
    Some(match prompt.total_questions {
        Some(total) => format!("(question {number} of {total})"),
        None => format!("(question {number})"),
    })
}

pub fn creation(content: &CreatorContent) -> String {
    let mut out = String::new();
    let kind = content.content_type.as_deref().unwrap_or("content");
    let _ = writeln!(
        out,
        "{} ({})",
        content.title.as_deref().unwrap_or("Untitled"),
        kind
    );
    if let Some(dedication) = &content.dedication {
        let _ = writeln!(out, "{dedication}");
    }
    if let Some(body) = &content.content {
        let _ = writeln!(out, "\n{body}");
    }
    if !content.mood_tags.is_empty() {
        let _ = writeln!(out, "\nMood: {}", content.mood_tags.join(", "));
    }
    out
}

pub fn report(report: &VibeReport) -> String {
    let mut out = String::new();
    let score = report.vibe_score.map_or_else(|| "?".to_string(), number);
    let _ = writeln!(out, "ULTIMATE VIBE REPORT");
    let _ = writeln!(out, "Vibe score: {score}/100");
    if let Some(kind) = &report.personality_type {
        let _ = writeln!(out, "You are: {kind}");
    }
    if let Some(b) = &report.score_breakdown {
        let rows = [
            ("Romance", b.romance_quotient),
            ("Independence", b.independence_index),
            ("Creativity", b.creativity_spark),
            ("Debate", b.debate_prowess),
        ];
        let _ = writeln!(out);
        for (name, value) in rows {
            let value = value.unwrap_or(0.0).clamp(0.0, 100.0);
            let _ = writeln!(out, "  {:<13} {} {:>3}", name, bar(value), number(value));
        }
    }
    list(&mut out, "Insights", &report.insights);
    list(&mut out, "Recommendations", &report.recommendations);
    let extras = [
        ("Spirit animal", &report.spirit_animal),
        ("Playlist mood", &report.playlist_mood),
        ("Caption", &report.viral_caption),
    ];
    let mut first = true;
    for (label, value) in extras {
        if let Some(value) = value {
            if first {
                let _ = writeln!(out);
                first = false;
            }
            let _ = writeln!(out, "{label}: {value}");
        }
    }
    if let Some(verdict) = &report.final_verdict {
        let _ = writeln!(out, "\n{verdict}");
    }
    out
}

pub fn progress(progress: &ProgressTracker) -> String {
    let mut out = String::from("\nProgress ");
    for task in SubTask::ALL {
        let mark = if progress.is_complete(task) { "x" } else { " " };
        let _ = write!(out, " [{mark}] {}", task.label());
    }
    let _ = writeln!(out, "  ({}/{})", progress.completed_count(), ProgressTracker::TOTAL);
    out
}

pub fn activity(log: &ActivityLog) -> String {
    let mut out = String::from("\nActivity\n");
    for entry in log.iter() {
        let _ = writeln!(out, "  {} {}", entry.at.format("%H:%M:%S"), entry.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixtures;

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0).chars().filter(|c| *c == '█').count(), 0);
        assert_eq!(bar(100.0).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(bar(50.0).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn test_progress_and_counter() {
        let mut tracker = ProgressTracker::default();
        tracker.complete(SubTask::Duelist);
        assert_eq!(
            progress(&tracker),
            "\nProgress  [ ] Analyst [x] Duelist [ ] Creator  (1/3)\n"
        );

        let prompt = InterviewPrompt {
            question: Some("Who?".into()),
            question_number: Some(2),
            total_questions: Some(3),
        };
        assert_eq!(question_counter(&prompt).as_deref(), Some("(question 2 of 3)"));
        assert_eq!(question_counter(&InterviewPrompt::default()), None);
    }

    #[test]
    fn test_reference_results_render() {
        let text = analysis(&fixtures::analyst());
        assert!(text.starts_with("Vibe score: 90/100  Strong Connection"));
        assert!(text.contains("[green] Reciprocal Enthusiasm (9/10)"));

        let round = AcceptedRound {
            index: 1,
            round: fixtures::debate_round(),
        };
        let text = debate_round(&round);
        assert!(text.starts_with("── Round 1 of 3 ──"));
        assert!(text.contains("The Hopeless Romantic (A) emotion 8/10"));
        assert!(!text.contains("Winner:"));

        let text = creation(&fixtures::creator());
        assert!(text.starts_with("Love Brewed at First Sight (poem)"));

        let text = report(&fixtures::report());
        assert!(text.contains("You are: The Passionate Dreamer"));
        assert!(text.contains("Spirit animal: Phoenix"));
    }
}
