//! Reference results substituted for live agent output in replay mode.

use serde_json::json;

use super::lenient::decode;
use super::models::{AnalystResult, CreatorContent, CreatorPayload, DebateRound, VibeReport};

/// Narration that replaces the activity log when replay is switched on.
pub const REPLAY_NARRATION: [&str; 6] = [
    "Initializing VibeSplit experience...",
    "Valentine mode activated -- loading romantic energy...",
    "Analyst Agent: Chat analysis complete. Score: 90/100.",
    "Debate Coordinator: Round 1 sparked a fiery exchange!",
    "Creator Agent: Poetry generation complete. A masterpiece awaits.",
    "All apps complete! Finale unlocked.",
];

pub fn analyst() -> AnalystResult {
    decode(&json!({
        "mode": "valentine",
        "analysis_type": "vibe_check",
        "overall_score": 90,
        "score_label": "Strong Connection",
        "summary": "This conversation overflows with warmth, attentiveness, and mutual enthusiasm. Both parties demonstrate genuine interest, playful rapport, and thoughtful effort.",
        "findings": [
            {
                "type": "green_flag",
                "title": "Reciprocal Enthusiasm",
                "description": "Both display equal excitement to engage and propose plans.",
                "severity": 9,
                "evidence": "'I would love that! I was actually about to ask you the same thing'"
            },
            {
                "type": "green_flag",
                "title": "Thoughtful Personalization",
                "description": "Person A shows attentive care by reflecting knowledge of preferences.",
                "severity": 8,
                "evidence": "'I found this cute Italian place'"
            },
            {
                "type": "green_flag",
                "title": "Emotional Availability",
                "description": "Kind words and appreciation are exchanged freely.",
                "severity": 7,
                "evidence": "'Of course I do, you are important to me'"
            },
            {
                "type": "green_flag",
                "title": "Playful Rapport",
                "description": "Light mirroring creates effortless chemistry.",
                "severity": 7,
                "evidence": "'Great minds think alike!'"
            }
        ],
        "vibe_meter": {
            "romance": 93,
            "toxicity": 2,
            "communication": 95,
            "effort": 90,
            "compatibility": 92
        },
        "verdict": "Sweet conversation energy -- the affection here could light up an entire Italian restaurant.",
        "recommendations": [
            "Keep up the thoughtful gestures.",
            "Continue creating shared experiences.",
            "Express genuine appreciation -- it is clearly working!"
        ],
        "receipts": "This convo radiates chemistry -- attentive, playful, and warm."
    }))
}

pub fn debate_round() -> DebateRound {
    decode(&json!({
        "mode": "valentine",
        "topic": "Is it worth risking a friendship for a romantic relationship?",
        "status": "introduction",
        "round": 1,
        "total_rounds": 3,
        "introduction": "Welcome to tonight's heart-pounding showdown! The Hopeless Romantic faces off against The Practical Partner.",
        "debater_a": {
            "name": "The Hopeless Romantic",
            "argument": "Love often blossoms from genuine friendships. Taking the leap can deepen your connection beyond what friendship alone can offer.",
            "key_points": [
                "Strongest relationships start as friendships",
                "Regret from never acting may haunt you more"
            ],
            "emotion_level": 8
        },
        "debater_b": {
            "name": "The Practical Partner",
            "argument": "A true friendship can last a lifetime. If things go awry, not only is the romance lost, but so is a cherished confidant.",
            "rebuttals": [
                "Romantic attempts jeopardize years of trust",
                "Not every spark should be a flame"
            ],
            "emotion_level": 6
        },
        "round_summary": "Both debaters set a passionate and thoughtful stage.",
        "verdict": {
            "winner": "",
            "reasoning": "The debate is just getting started!",
            "final_score": "0-0",
            "audience_takeaway": "Stay tuned for more fireworks!"
        },
        "shareable_receipt": "VibeSplit Valentine Debate: Should you risk a friendship for romance?"
    }))
}

pub fn creator() -> CreatorContent {
    decode::<CreatorPayload>(&json!({
        "phase": "generation",
        "mode": "valentine",
        "content_type": "poem",
        "title": "Love Brewed at First Sight",
        "content": "Two years ago, the world paused in a coffee shop,\nSteam curled in the air as my heartbeat rose and stopped.\nYou -- Alex, a page-turner in hand, sunlight on your face --\nA moment ordinary, transformed into fate's embrace.\n\nA nervous hello, the hush of porcelain and laughter,\nFingers brushing accidental, time tumbling ever after.\nHazelnut and hope blended in your smile so rare,\nI tasted forever in the sweetness lingering there.",
        "mood_tags": ["sweet", "passionate", "nostalgic"],
        "dedication": "For Alex",
        "shareable_quote": "I tasted forever in the sweetness lingering there.",
        "image_prompt": "A sunlit coffee shop scene, cozy and inviting, with two people gazing at each other over steaming mugs."
    }))
    .into_content()
}

pub fn report() -> VibeReport {
    decode(&json!({
        "vibe_score": 85,
        "score_breakdown": {
            "romance_quotient": 80,
            "independence_index": 70,
            "creativity_spark": 90,
            "debate_prowess": 85
        },
        "personality_type": "The Passionate Dreamer",
        "insights": [
            "Your romantic energy runs deep and true.",
            "You value both connection and independence.",
            "Your creativity shines through in how you express love."
        ],
        "recommendations": [
            "Lean into vulnerability more often.",
            "Balance passion with patience.",
            "Keep expressing yourself creatively."
        ],
        "viral_caption": "Hopeless romantic with a strategic mind -- chaotic good energy",
        "spirit_animal": "Phoenix",
        "playlist_mood": "Late Night Lo-Fi Romance",
        "final_verdict": "You are a rare blend of passion and wisdom. The kind of lover who writes poetry and builds futures."
    }))
}
