use serde::Serialize;
use serde_json::Value;

use super::{CommandSpec, LoadingObserver, NoParams, ServiceContext, ensure_range};
use crate::envelope::Envelope;
use crate::models::PracticeSession;

/// Steps a word goes through in one practice session.
pub const PRACTICE_STEPS: u8 = 4;

const SESSION_FIELDS: &[(&str, &str)] = &[
    ("sessionId", "session_id"),
    ("planId", "plan_id"),
    ("scheduleId", "schedule_id"),
    ("wordId", "word_id"),
    ("userAnswer", "user_answer"),
    ("isCorrect", "is_correct"),
    ("timeSpent", "time_spent"),
    ("activeTime", "active_time"),
    ("totalTime", "total_time"),
    ("pauseCount", "pause_count"),
];

const START: CommandSpec = CommandSpec::new("start_practice_session")
    .require(&["planId", "scheduleId"])
    .rename(SESSION_FIELDS);
const SUBMIT_STEP: CommandSpec = CommandSpec::new("submit_step_result")
    .require(&["sessionId", "wordId", "step", "isCorrect"])
    .rename(SESSION_FIELDS);
const PAUSE: CommandSpec = CommandSpec::new("pause_practice_session")
    .require(&["sessionId"])
    .rename(SESSION_FIELDS);
const RESUME: CommandSpec = CommandSpec::new("resume_practice_session")
    .require(&["sessionId"])
    .rename(SESSION_FIELDS);
const COMPLETE: CommandSpec = CommandSpec::new("complete_practice_session")
    .require(&["sessionId", "activeTime"])
    .rename(SESSION_FIELDS);
const CANCEL: CommandSpec = CommandSpec::new("cancel_practice_session")
    .require(&["sessionId"])
    .rename(SESSION_FIELDS);
const INCOMPLETE: CommandSpec = CommandSpec::new("get_incomplete_practice_sessions");
const DETAIL: CommandSpec = CommandSpec::new("get_practice_session_detail")
    .require(&["sessionId"])
    .rename(SESSION_FIELDS);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub session_id: String,
    pub word_id: i64,
    pub step: u8,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    /// Milliseconds spent on the step.
    pub time_spent: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompletion {
    pub session_id: String,
    pub active_time: u64,
    pub total_time: u64,
    pub pause_count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRef<'a> {
    session_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRef {
    plan_id: i64,
    schedule_id: i64,
}

/// Practice session flow. Session truth stays in the backend.
#[derive(Debug, Clone)]
pub struct PracticeService {
    ctx: ServiceContext,
}

impl PracticeService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn start_practice_session(
        &self,
        plan_id: i64,
        schedule_id: i64,
    ) -> Envelope<PracticeSession> {
        self.ctx
            .dispatch(
                &START,
                &ScheduleRef {
                    plan_id,
                    schedule_id,
                },
            )
            .await
    }

    pub async fn submit_step_result(&self, result: &StepResult) -> Envelope<Value> {
        self.ctx
            .execute(async {
                ensure_range("step", result.step, 1, PRACTICE_STEPS)?;
                self.ctx.call(&SUBMIT_STEP, result).await
            })
            .await
    }

    pub async fn pause_practice_session(&self, session_id: &str) -> Envelope<Value> {
        self.ctx.dispatch(&PAUSE, &SessionRef { session_id }).await
    }

    pub async fn resume_practice_session(&self, session_id: &str) -> Envelope<Value> {
        self.ctx.dispatch(&RESUME, &SessionRef { session_id }).await
    }

    pub async fn complete_practice_session(
        &self,
        completion: &SessionCompletion,
    ) -> Envelope<Value> {
        self.ctx.dispatch(&COMPLETE, completion).await
    }

    pub async fn cancel_practice_session(&self, session_id: &str) -> Envelope<Value> {
        self.ctx.dispatch(&CANCEL, &SessionRef { session_id }).await
    }

    pub async fn get_incomplete_practice_sessions(&self) -> Envelope<Vec<PracticeSession>> {
        self.ctx.dispatch(&INCOMPLETE, &NoParams {}).await
    }

    pub async fn get_practice_session_detail(&self, session_id: &str) -> Envelope<PracticeSession> {
        self.ctx.dispatch(&DETAIL, &SessionRef { session_id }).await
    }
}
