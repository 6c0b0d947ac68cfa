use serde::Serialize;
use serde_json::Value;

use super::{
    CommandSpec, LoadingObserver, ServiceContext, ensure_one_of, ensure_range, to_args,
    validate_required,
};
use crate::envelope::Envelope;
use crate::error::ServiceError;
use crate::models::{StudyPlan, StudyPlanStatusChange};

/// Accepted plan lengths in days.
pub const STUDY_PERIOD_DAYS: &[u32] = &[7, 14, 21, 30, 60, 90];
/// Accepted intensity levels.
pub const INTENSITY_LEVELS: &[&str] = &["low", "medium", "high"];
pub const MIN_REVIEW_FREQUENCY: u32 = 1;
pub const MAX_REVIEW_FREQUENCY: u32 = 7;

const PLAN_FIELDS: &[(&str, &str)] = &[
    ("planId", "plan_id"),
    ("wordbookIds", "wordbook_ids"),
    ("intensityLevel", "intensity_level"),
    ("studyPeriodDays", "study_period_days"),
    ("reviewFrequency", "review_frequency"),
    ("startDate", "start_date"),
    ("endDate", "end_date"),
    ("totalWords", "total_words"),
    ("aiPlanData", "ai_plan_data"),
];
const PLAN_ID: &[(&str, &str)] = &[("planId", "plan_id")];

const GET_STUDY_PLANS: CommandSpec = CommandSpec::new("get_study_plans");
const CREATE_STUDY_PLAN: CommandSpec = CommandSpec::new("create_study_plan")
    .require(&["name", "wordbookIds"])
    .rename(PLAN_FIELDS);
const GENERATE_SCHEDULE: CommandSpec = CommandSpec::new("generate_study_plan_schedule")
    .require(&["wordbookIds", "intensityLevel", "studyPeriodDays", "reviewFrequency"])
    .rename(PLAN_FIELDS);
const CREATE_WITH_SCHEDULE: CommandSpec = CommandSpec::new("create_study_plan_with_schedule")
    .require(&["name", "wordbookIds", "intensityLevel", "studyPeriodDays", "aiPlanData"])
    .rename(PLAN_FIELDS);
const EDIT_STUDY_PLAN: CommandSpec = CommandSpec::new("edit_study_plan")
    .require(&["planId"])
    .rename(PLAN_FIELDS);
const STATUS_HISTORY: CommandSpec = CommandSpec::new("get_study_plan_status_history")
    .require(&["planId"])
    .rename(PLAN_ID);

/// Lifecycle transitions that take only a plan id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTransition {
    Start,
    Complete,
    Terminate,
    Restart,
    Publish,
    Delete,
}

impl PlanTransition {
    pub const fn command(self) -> &'static str {
        match self {
            Self::Start => "start_study_plan",
            Self::Complete => "complete_study_plan",
            Self::Terminate => "terminate_study_plan",
            Self::Restart => "restart_study_plan",
            Self::Publish => "publish_study_plan",
            Self::Delete => "delete_study_plan",
        }
    }

    const fn spec(self) -> CommandSpec {
        CommandSpec::new(self.command())
            .require(&["planId"])
            .rename(PLAN_ID)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Parameters shared by plan creation and schedule generation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSettings {
    pub wordbook_ids: Vec<i64>,
    pub intensity_level: String,
    pub study_period_days: u32,
    pub review_frequency: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub settings: PlanSettings,
}

/// Plan created from an AI-generated schedule.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPlanDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub settings: PlanSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_words: Option<u32>,
    /// JSON document produced by schedule generation.
    pub ai_plan_data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanEdit {
    pub plan_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_period_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordbook_ids: Option<Vec<i64>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanRef {
    plan_id: i64,
}

/// Study plan lifecycle and schedule generation.
#[derive(Debug, Clone)]
pub struct StudyPlanService {
    ctx: ServiceContext,
}

impl StudyPlanService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn get_study_plans(&self, filter: &StudyPlanFilter) -> Envelope<Vec<StudyPlan>> {
        self.ctx.dispatch(&GET_STUDY_PLANS, filter).await
    }

    pub async fn create_study_plan(&self, draft: &StudyPlanDraft) -> Envelope<i64> {
        self.ctx
            .execute(async {
                validate_required(&to_args(draft)?, CREATE_STUDY_PLAN.required)?;
                validate_settings(&draft.settings)?;
                self.ctx.call(&CREATE_STUDY_PLAN, draft).await
            })
            .await
    }

    pub async fn generate_study_plan_schedule(&self, settings: &PlanSettings) -> Envelope<Value> {
        self.ctx
            .execute(async {
                validate_required(&to_args(settings)?, GENERATE_SCHEDULE.required)?;
                validate_settings(settings)?;
                self.ctx.call(&GENERATE_SCHEDULE, settings).await
            })
            .await
    }

    pub async fn create_study_plan_with_schedule(
        &self,
        draft: &ScheduledPlanDraft,
    ) -> Envelope<i64> {
        self.ctx
            .execute(async {
                validate_required(&to_args(draft)?, CREATE_WITH_SCHEDULE.required)?;
                validate_settings(&draft.settings)?;
                validate_plan_data(&draft.ai_plan_data)?;
                self.ctx.call(&CREATE_WITH_SCHEDULE, draft).await
            })
            .await
    }

    pub async fn transition(&self, plan_id: i64, transition: PlanTransition) -> Envelope<Value> {
        self.ctx
            .dispatch(&transition.spec(), &PlanRef { plan_id })
            .await
    }

    pub async fn start_study_plan(&self, plan_id: i64) -> Envelope<Value> {
        self.transition(plan_id, PlanTransition::Start).await
    }

    pub async fn complete_study_plan(&self, plan_id: i64) -> Envelope<Value> {
        self.transition(plan_id, PlanTransition::Complete).await
    }

    pub async fn terminate_study_plan(&self, plan_id: i64) -> Envelope<Value> {
        self.transition(plan_id, PlanTransition::Terminate).await
    }

    pub async fn restart_study_plan(&self, plan_id: i64) -> Envelope<Value> {
        self.transition(plan_id, PlanTransition::Restart).await
    }

    pub async fn publish_study_plan(&self, plan_id: i64) -> Envelope<Value> {
        self.transition(plan_id, PlanTransition::Publish).await
    }

    pub async fn delete_study_plan(&self, plan_id: i64) -> Envelope<Value> {
        self.transition(plan_id, PlanTransition::Delete).await
    }

    pub async fn edit_study_plan(&self, edit: &StudyPlanEdit) -> Envelope<Value> {
        self.ctx
            .execute(async {
                if let Some(name) = edit.name.as_deref() {
                    if name.trim().is_empty() {
                        return Err(ServiceError::MissingField("name".into()));
                    }
                }
                if let Some(level) = edit.intensity_level.as_deref() {
                    ensure_one_of("intensityLevel", level, INTENSITY_LEVELS)?;
                }
                if let Some(days) = edit.study_period_days {
                    ensure_one_of("studyPeriodDays", days, STUDY_PERIOD_DAYS)?;
                }
                if let Some(frequency) = edit.review_frequency {
                    ensure_range(
                        "reviewFrequency",
                        frequency,
                        MIN_REVIEW_FREQUENCY,
                        MAX_REVIEW_FREQUENCY,
                    )?;
                }
                if edit.wordbook_ids.as_ref().is_some_and(Vec::is_empty) {
                    return Err(ServiceError::MissingField("wordbookIds".into()));
                }
                self.ctx.call(&EDIT_STUDY_PLAN, edit).await
            })
            .await
    }

    pub async fn get_study_plan_status_history(
        &self,
        plan_id: i64,
    ) -> Envelope<Vec<StudyPlanStatusChange>> {
        self.ctx
            .dispatch(&STATUS_HISTORY, &PlanRef { plan_id })
            .await
    }
}

fn validate_settings(settings: &PlanSettings) -> Result<(), ServiceError> {
    if settings.wordbook_ids.is_empty() {
        return Err(ServiceError::MissingField("wordbookIds".into()));
    }
    ensure_one_of(
        "intensityLevel",
        settings.intensity_level.as_str(),
        INTENSITY_LEVELS,
    )?;
    ensure_one_of(
        "studyPeriodDays",
        settings.study_period_days,
        STUDY_PERIOD_DAYS,
    )?;
    ensure_range(
        "reviewFrequency",
        settings.review_frequency,
        MIN_REVIEW_FREQUENCY,
        MAX_REVIEW_FREQUENCY,
    )
}

fn validate_plan_data(raw: &str) -> Result<(), ServiceError> {
    if raw.trim().is_empty() {
        return Err(ServiceError::MissingField("aiPlanData".into()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(_)) | Ok(Value::Array(_)) => Ok(()),
        Ok(_) => Err(ServiceError::MalformedJson {
            field: "aiPlanData".into(),
            reason: "expected an object or array".into(),
        }),
        Err(err) => Err(ServiceError::MalformedJson {
            field: "aiPlanData".into(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InvocationClient;
    use crate::transport::MemoryTransport;
    use serde_json::json;

    fn service(transport: &MemoryTransport) -> StudyPlanService {
        StudyPlanService::new(ServiceContext::new(InvocationClient::with_transport(
            transport.clone(),
        )))
    }

    fn settings() -> PlanSettings {
        PlanSettings {
            wordbook_ids: vec![1, 2],
            intensity_level: "medium".into(),
            study_period_days: 30,
            review_frequency: 3,
            start_date: Some("2026-11-01".into()),
        }
    }

    #[tokio::test]
    async fn create_without_name_fails_before_transport() {
        let transport = MemoryTransport::new();
        let envelope = service(&transport)
            .create_study_plan(&StudyPlanDraft {
                settings: settings(),
                ..Default::default()
            })
            .await;
        assert_eq!(
            envelope,
            Envelope::failure("Required field 'name' is missing or empty")
        );
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn create_translates_every_plan_field() {
        let transport = MemoryTransport::new();
        transport.respond("create_study_plan", json!(5));
        let envelope = service(&transport)
            .create_study_plan(&StudyPlanDraft {
                name: "Autumn".into(),
                description: None,
                settings: settings(),
            })
            .await;
        assert_eq!(envelope, Envelope::Success(5));
        assert_eq!(
            Value::Object(transport.calls()[0].args.clone()),
            json!({
                "name": "Autumn",
                "wordbook_ids": [1, 2],
                "intensity_level": "medium",
                "study_period_days": 30,
                "review_frequency": 3,
                "start_date": "2026-11-01",
            })
        );
    }

    #[tokio::test]
    async fn rejects_values_outside_enumerations() {
        let transport = MemoryTransport::new();
        let svc = service(&transport);

        let mut bad = settings();
        bad.study_period_days = 10;
        let envelope = svc.generate_study_plan_schedule(&bad).await;
        assert_eq!(
            envelope.error(),
            Some("Field 'studyPeriodDays' must be one of [7, 14, 21, 30, 60, 90], got 10")
        );

        let mut bad = settings();
        bad.intensity_level = "extreme".into();
        assert!(svc.generate_study_plan_schedule(&bad).await.error().unwrap().contains("intensityLevel"));

        let mut bad = settings();
        bad.review_frequency = 0;
        assert!(svc.generate_study_plan_schedule(&bad).await.error().unwrap().contains("reviewFrequency"));

        let mut bad = settings();
        bad.wordbook_ids.clear();
        assert_eq!(
            svc.generate_study_plan_schedule(&bad).await.error(),
            Some("Required field 'wordbookIds' is missing or empty")
        );
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_plan_data_is_rejected_locally() {
        let transport = MemoryTransport::new();
        let envelope = service(&transport)
            .create_study_plan_with_schedule(&ScheduledPlanDraft {
                name: "Plan".into(),
                settings: settings(),
                ai_plan_data: "{not json".into(),
                ..Default::default()
            })
            .await;
        let message = envelope.error().unwrap();
        assert!(message.starts_with("Field 'aiPlanData' must contain valid JSON"));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn transitions_use_their_own_commands() {
        let transport = MemoryTransport::new();
        transport.respond("terminate_study_plan", Value::Null);
        transport.respond("publish_study_plan", Value::Null);
        let svc = service(&transport);

        assert!(svc.terminate_study_plan(4).await.is_success());
        assert!(svc.publish_study_plan(4).await.is_success());
        let calls = transport.calls();
        assert_eq!(calls[0].command, "terminate_study_plan");
        assert_eq!(calls[1].command, "publish_study_plan");
        assert_eq!(Value::Object(calls[1].args.clone()), json!({ "plan_id": 4 }));
    }

    #[tokio::test]
    async fn edit_validates_only_provided_fields() {
        let transport = MemoryTransport::new();
        transport.respond("edit_study_plan", Value::Null);
        let svc = service(&transport);

        let ok = svc
            .edit_study_plan(&StudyPlanEdit {
                plan_id: 2,
                review_frequency: Some(7),
                ..Default::default()
            })
            .await;
        assert!(ok.is_success());
        assert_eq!(
            Value::Object(transport.calls()[0].args.clone()),
            json!({ "plan_id": 2, "review_frequency": 7 })
        );

        let bad = svc
            .edit_study_plan(&StudyPlanEdit {
                plan_id: 2,
                review_frequency: Some(8),
                ..Default::default()
            })
            .await;
        assert!(!bad.is_success());
        assert_eq!(transport.call_count("edit_study_plan"), 1);
    }
}
