//! Normalized result shapes, one family per interaction.
//!
//! Every field is optional: agents are untrusted. Each interaction applies its
//! own acceptance predicate on the raw payload before decoding into these.

use serde::{Deserialize, Serialize};

use super::lenient;

// ─── Analyst ─────────────────────────────────────────────────

/// Chat analysis result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystResult {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub analysis_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub overall_score: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub score_label: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient::object_list")]
    pub findings: Vec<Finding>,
    #[serde(deserialize_with = "lenient::opt_object")]
    pub vibe_meter: Option<VibeMeter>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub verdict: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub receipts: Option<String>,
}

/// Kind of a finding, from its `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Green,
    Red,
    Yellow,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    #[serde(rename = "type", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub severity: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub evidence: Option<String>,
}

impl Finding {
    pub fn flag(&self) -> FlagKind {
        match self.kind.as_deref().map(str::trim) {
            Some("green_flag") => FlagKind::Green,
            Some("red_flag") => FlagKind::Red,
            Some("yellow_flag") => FlagKind::Yellow,
            _ => FlagKind::Other,
        }
    }

    /// Severity clamped to 0-10.
    pub fn severity(&self) -> f64 {
        self.severity.unwrap_or(0.0).clamp(0.0, 10.0)
    }
}

/// Five relationship axes, each 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeMeter {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub romance: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub toxicity: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub communication: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub effort: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub compatibility: Option<f64>,
}

impl VibeMeter {
    /// Axis values clamped to 0-100, missing axes read as 0.
    pub fn axes(&self) -> [(&'static str, f64); 5] {
        let v = |x: Option<f64>| x.unwrap_or(0.0).clamp(0.0, 100.0);
        [
            ("Romance", v(self.romance)),
            ("Toxicity", v(self.toxicity)),
            ("Communication", v(self.communication)),
            ("Effort", v(self.effort)),
            ("Compatibility", v(self.compatibility)),
        ]
    }
}

// ─── Debate ──────────────────────────────────────────────────

/// One round as returned by the debate coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateRound {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub topic: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub round: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub total_rounds: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub introduction: Option<String>,
    #[serde(deserialize_with = "lenient::opt_object")]
    pub debater_a: Option<Debater>,
    #[serde(deserialize_with = "lenient::opt_object")]
    pub debater_b: Option<Debater>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub round_summary: Option<String>,
    #[serde(deserialize_with = "lenient::opt_object")]
    pub verdict: Option<DebateVerdict>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub shareable_receipt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Debater {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub argument: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub key_points: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub rebuttals: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub emotion_level: Option<f64>,
}

impl Debater {
    /// Emotion level clamped to 0-10.
    pub fn emotion(&self) -> f64 {
        self.emotion_level.unwrap_or(0.0).clamp(0.0, 10.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateVerdict {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub winner: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub reasoning: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub final_score: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub audience_takeaway: Option<String>,
}

// ─── Creator ─────────────────────────────────────────────────

/// Raw creator reply before phase classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorPayload {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub phase: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub question: Option<String>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub question_number: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub total_questions: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub content_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub content: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub mood_tags: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub dedication: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub shareable_quote: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub image_prompt: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub mood: Option<String>,
    /// Prose wrapper produced by the normalizer.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub text: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

impl CreatorPayload {
    fn phase_is(&self, phase: &str) -> bool {
        self.phase
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case(phase))
    }

    pub fn is_generation(&self) -> bool {
        self.phase_is("generation")
    }

    pub fn is_interview(&self) -> bool {
        present(&self.question) || self.phase_is("interview")
    }

    /// Untagged payload that still carries generated content.
    pub fn has_content(&self) -> bool {
        present(&self.content) || present(&self.title)
    }

    pub fn into_prompt(self) -> InterviewPrompt {
        InterviewPrompt {
            question: self.question.filter(|q| !q.is_empty()),
            question_number: self.question_number,
            total_questions: self.total_questions,
        }
    }

    pub fn into_content(self) -> CreatorContent {
        CreatorContent {
            mode: self.mode,
            content_type: self.content_type,
            title: self.title,
            content: self.content,
            mood_tags: self.mood_tags,
            dedication: self.dedication,
            shareable_quote: self.shareable_quote,
            image_prompt: self.image_prompt,
            mood: self.mood,
        }
    }
}

/// Interview turn requested by the creator agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewPrompt {
    pub question: Option<String>,
    pub question_number: Option<u32>,
    pub total_questions: Option<u32>,
}

/// Final generated content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorContent {
    pub mode: Option<String>,
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood_tags: Vec<String>,
    pub dedication: Option<String>,
    pub shareable_quote: Option<String>,
    pub image_prompt: Option<String>,
    pub mood: Option<String>,
}

// ─── Report ──────────────────────────────────────────────────

/// The finale report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeReport {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub vibe_score: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_object")]
    pub score_breakdown: Option<ScoreBreakdown>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub personality_type: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub insights: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub viral_caption: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub spirit_animal: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub playlist_mood: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub final_verdict: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub romance_quotient: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub independence_index: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub creativity_spark: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub debate_prowess: Option<f64>,
}
