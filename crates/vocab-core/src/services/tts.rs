use serde::Serialize;
use serde_json::Value;

use super::{CommandSpec, LoadingObserver, NoParams, ServiceContext, ensure_range};
use crate::envelope::Envelope;
use crate::models::{ElevenLabsConfig, TtsAudio, TtsProvider, TtsVoice};

pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;

const TTS_FIELDS: &[(&str, &str)] = &[
    ("voiceId", "voice_id"),
    ("apiKey", "api_key"),
    ("modelId", "model_id"),
    ("defaultVoiceId", "default_voice_id"),
];

const TEXT_TO_SPEECH: CommandSpec = CommandSpec::new("text_to_speech")
    .require(&["text"])
    .rename(TTS_FIELDS);
const GET_VOICES: CommandSpec = CommandSpec::new("get_tts_voices");
const GET_DEFAULT_VOICE: CommandSpec = CommandSpec::new("get_default_tts_voice");
const GET_PROVIDERS: CommandSpec = CommandSpec::new("get_tts_providers");
const SET_DEFAULT_VOICE: CommandSpec = CommandSpec::new("set_default_tts_voice")
    .require(&["voiceId"])
    .rename(TTS_FIELDS);
const CLEAR_CACHE: CommandSpec = CommandSpec::new("clear_tts_cache");
const GET_ELEVENLABS: CommandSpec = CommandSpec::new("get_elevenlabs_config");
const UPDATE_ELEVENLABS: CommandSpec = CommandSpec::new("update_elevenlabs_config")
    .require(&["apiKey"])
    .rename(TTS_FIELDS);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevenLabsUpdate {
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Serialize)]
struct ProviderFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceRef<'a> {
    voice_id: &'a str,
}

/// Text-to-speech synthesis and voice settings.
#[derive(Debug, Clone)]
pub struct TtsService {
    ctx: ServiceContext,
}

impl TtsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn text_to_speech(&self, request: &SpeechRequest) -> Envelope<TtsAudio> {
        self.ctx
            .execute(async {
                if let Some(speed) = request.speed {
                    ensure_range("speed", speed, MIN_SPEED, MAX_SPEED)?;
                }
                self.ctx.call(&TEXT_TO_SPEECH, request).await
            })
            .await
    }

    pub async fn get_tts_voices(&self, provider: Option<&str>) -> Envelope<Vec<TtsVoice>> {
        self.ctx
            .dispatch(&GET_VOICES, &ProviderFilter { provider })
            .await
    }

    pub async fn get_default_tts_voice(&self) -> Envelope<Option<TtsVoice>> {
        self.ctx.dispatch(&GET_DEFAULT_VOICE, &NoParams {}).await
    }

    pub async fn get_tts_providers(&self) -> Envelope<Vec<TtsProvider>> {
        self.ctx.dispatch(&GET_PROVIDERS, &NoParams {}).await
    }

    pub async fn set_default_tts_voice(&self, voice_id: &str) -> Envelope<Value> {
        self.ctx
            .dispatch(&SET_DEFAULT_VOICE, &VoiceRef { voice_id })
            .await
    }

    pub async fn clear_tts_cache(&self) -> Envelope<Value> {
        self.ctx.dispatch(&CLEAR_CACHE, &NoParams {}).await
    }

    pub async fn get_elevenlabs_config(&self) -> Envelope<ElevenLabsConfig> {
        self.ctx.dispatch(&GET_ELEVENLABS, &NoParams {}).await
    }

    pub async fn update_elevenlabs_config(&self, update: &ElevenLabsUpdate) -> Envelope<Value> {
        self.ctx.dispatch(&UPDATE_ELEVENLABS, update).await
    }
}
