//! Transient views of backend-owned entities.
//!
//! The backend owns and persists all of these; the client decodes them per request and never
//! caches them. Unknown fields are ignored and most fields default so older backends still decode.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordBook {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub icon_color: Option<String>,
    pub total_words: u32,
    pub linked_plans: u32,
    pub status: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Word {
    pub id: i64,
    pub word: String,
    pub meaning: Option<String>,
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
    pub example: Option<String>,
    pub word_book_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPage {
    pub words: Vec<Word>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyPlan {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub lifecycle_status: Option<String>,
    pub intensity_level: Option<String>,
    pub study_period_days: Option<u32>,
    pub review_frequency: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_words: u32,
    pub mastered_words: u32,
    pub progress_percentage: f64,
    pub wordbook_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyPlanStatusChange {
    pub id: i64,
    pub plan_id: i64,
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_at: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeWordState {
    pub word_id: i64,
    pub word: Option<String>,
    pub current_step: u8,
    pub step_results: Vec<bool>,
    pub completed: bool,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSession {
    pub session_id: String,
    pub plan_id: i64,
    pub schedule_id: i64,
    pub schedule_date: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub completed: bool,
    pub total_time: u64,
    pub active_time: u64,
    pub pause_count: u32,
    pub word_states: Vec<PracticeWordState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsVoice {
    pub id: String,
    pub name: String,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub provider: Option<String>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsProvider {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub requires_api_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsAudio {
    pub audio_data: Option<String>,
    pub audio_path: Option<String>,
    pub content_type: Option<String>,
    pub cached: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevenLabsConfig {
    pub api_key: Option<String>,
    pub model_id: Option<String>,
    pub default_voice_id: Option<String>,
    pub enabled: bool,
}

/// Word extracted from free text, ready for batch analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedWord {
    pub word: String,
    pub frequency: u32,
    pub context: Option<String>,
}
