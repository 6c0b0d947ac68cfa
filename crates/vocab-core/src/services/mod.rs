//! Per-domain service façades.
//!
//! Every façade follows the same three steps: validate the caller's arguments, translate field
//! names to what the backend expects, then delegate to the [`InvocationClient`]. The whole
//! operation runs inside [`execute_with_loading`], so every outcome (validation failure, backend
//! rejection, success) reaches the caller as an [`Envelope`].

pub mod calendar;
pub mod data_management;
pub mod practice;
pub mod statistics;
pub mod study_plans;
pub mod tts;
pub mod word_analysis;
pub mod word_books;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::InvocationClient;
use crate::envelope::Envelope;
use crate::error::ServiceError;
use crate::transport::Args;

pub use calendar::CalendarService;
pub use data_management::DataManagementService;
pub use practice::PracticeService;
pub use statistics::StatisticsService;
pub use study_plans::StudyPlanService;
pub use tts::TtsService;
pub use word_analysis::WordAnalysisService;
pub use word_books::WordBookService;

/// Side-channel status reported around every service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub loading: bool,
    pub error: Option<String>,
}

impl LoadingState {
    pub fn started() -> Self {
        Self {
            loading: true,
            error: None,
        }
    }

    pub fn finished() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(error.into()),
        }
    }
}

/// Receives [`LoadingState`] transitions.
pub type LoadingObserver = Arc<dyn Fn(&LoadingState) + Send + Sync>;

/// Run `operation`, reporting loading transitions to `observer`.
///
/// The observer sees `loading: true` exactly once before the operation is polled and
/// `loading: false` exactly once after it settles, carrying the error when it failed.
pub async fn execute_with_loading<T, Fut>(
    operation: Fut,
    observer: Option<&LoadingObserver>,
) -> Envelope<T>
where
    Fut: Future<Output = Result<T, ServiceError>>,
{
    if let Some(observer) = observer {
        observer(&LoadingState::started());
    }

    match operation.await {
        Ok(data) => {
            if let Some(observer) = observer {
                observer(&LoadingState::finished());
            }
            Envelope::Success(data)
        }
        Err(err) => {
            let message = err.to_string();
            debug!(kind = ?err.kind(), error = %message, "Service operation failed");
            if let Some(observer) = observer {
                observer(&LoadingState::failed(message.clone()));
            }
            Envelope::Failure(message)
        }
    }
}

/// Reject any named field that is absent, `null` or an empty string.
///
/// `0` and `false` are present values.
pub fn validate_required(params: &Args, required: &[&str]) -> Result<(), ServiceError> {
    for field in required {
        let missing = match params.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(ServiceError::MissingField((*field).to_string()));
        }
    }
    Ok(())
}

/// Rename caller-side keys to backend keys. Unlisted keys pass through unchanged.
pub fn translate_fields(params: Args, renames: &[(&str, &str)]) -> Args {
    params
        .into_iter()
        .map(|(key, value)| {
            let renamed = renames
                .iter()
                .find(|(from, _)| *from == key)
                .map(|(_, to)| (*to).to_string())
                .unwrap_or(key);
            (renamed, value)
        })
        .collect()
}

/// Static description of one backend command: its name, required caller fields and the
/// caller-to-backend field name table.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub command: &'static str,
    pub required: &'static [&'static str],
    pub renames: &'static [(&'static str, &'static str)],
}

impl CommandSpec {
    pub const fn new(command: &'static str) -> Self {
        Self {
            command,
            required: &[],
            renames: &[],
        }
    }

    pub const fn require(mut self, required: &'static [&'static str]) -> Self {
        self.required = required;
        self
    }

    pub const fn rename(mut self, renames: &'static [(&'static str, &'static str)]) -> Self {
        self.renames = renames;
        self
    }

    /// Validate required fields (caller names) and translate to backend names.
    pub fn prepare(&self, params: Args) -> Result<Args, ServiceError> {
        validate_required(&params, self.required)?;
        Ok(translate_fields(params, self.renames))
    }
}

/// Serialize a request value into command arguments.
pub fn to_args<P: Serialize + ?Sized>(params: &P) -> Result<Args, ServiceError> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Args::new()),
        _ => Err(ServiceError::NotAnObject),
    }
}

/// State shared by every façade: the client plus an optional loading observer.
#[derive(Clone)]
pub struct ServiceContext {
    client: InvocationClient,
    observer: Option<LoadingObserver>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("client", &self.client)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ServiceContext {
    pub fn new(client: InvocationClient) -> Self {
        Self {
            client,
            observer: None,
        }
    }

    pub fn client(&self) -> &InvocationClient {
        &self.client
    }

    /// Copy of this context reporting to `observer`.
    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self {
            client: self.client.clone(),
            observer: Some(observer),
        }
    }

    /// Run a service operation under the loading contract.
    pub async fn execute<T, Fut>(&self, operation: Fut) -> Envelope<T>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        execute_with_loading(operation, self.observer.as_ref()).await
    }

    /// Validate, translate and invoke. Backend failures surface as [`ServiceError::Backend`].
    pub async fn call<T, P>(&self, spec: &CommandSpec, params: &P) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let args = spec.prepare(to_args(params)?)?;
        self.client
            .invoke::<T>(spec.command, args)
            .await
            .into_result()
            .map_err(ServiceError::Backend)
    }

    /// [`ServiceContext::call`] wrapped in [`ServiceContext::execute`].
    pub async fn dispatch<T, P>(&self, spec: &CommandSpec, params: &P) -> Envelope<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.execute(self.call(spec, params)).await
    }
}

/// Parameter-less request.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoParams {}

/// Every domain façade, built from one client.
#[derive(Debug, Clone)]
pub struct Services {
    pub word_books: WordBookService,
    pub study_plans: StudyPlanService,
    pub practice: PracticeService,
    pub statistics: StatisticsService,
    pub calendar: CalendarService,
    pub data: DataManagementService,
    pub tts: TtsService,
    pub word_analysis: WordAnalysisService,
}

impl Services {
    pub fn new(client: InvocationClient) -> Self {
        let ctx = ServiceContext::new(client);
        Self {
            word_books: WordBookService::new(ctx.clone()),
            study_plans: StudyPlanService::new(ctx.clone()),
            practice: PracticeService::new(ctx.clone()),
            statistics: StatisticsService::new(ctx.clone()),
            calendar: CalendarService::new(ctx.clone()),
            data: DataManagementService::new(ctx.clone()),
            tts: TtsService::new(ctx.clone()),
            word_analysis: WordAnalysisService::new(ctx),
        }
    }
}

pub(crate) fn ensure_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), ServiceError>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if !(min..=max).contains(&value) {
        return Err(ServiceError::out_of_range(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_one_of<T>(field: &str, value: T, allowed: &[T]) -> Result<(), ServiceError>
where
    T: PartialEq + std::fmt::Display + Copy,
{
    if allowed.contains(&value) {
        return Ok(());
    }
    let options = allowed
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ServiceError::out_of_range(
        field,
        format!("must be one of [{options}], got {value}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use serde_json::json;
    use std::sync::Mutex;

    fn recording_observer() -> (LoadingObserver, Arc<Mutex<Vec<LoadingState>>>) {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = states.clone();
        let observer: LoadingObserver = Arc::new(move |state: &LoadingState| {
            sink.lock().unwrap().push(state.clone());
        });
        (observer, states)
    }

    fn args(value: Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn required_rejects_null_missing_and_empty() {
        let params = args(json!({ "name": "", "plan": null }));
        assert!(matches!(
            validate_required(&params, &["name"]),
            Err(ServiceError::MissingField(f)) if f == "name"
        ));
        assert!(validate_required(&params, &["plan"]).is_err());
        assert!(validate_required(&params, &["absent"]).is_err());
    }

    #[test]
    fn required_accepts_falsy_present_values() {
        let params = args(json!({ "count": 0, "flag": false, "list": [], "text": " " }));
        assert!(validate_required(&params, &["count", "flag", "list", "text"]).is_ok());
    }

    #[test]
    fn translation_is_exact_and_passes_unknown_keys() {
        let params = args(json!({ "wordbookIds": [1], "intensityLevel": "low", "name": "x" }));
        let translated = translate_fields(
            params,
            &[("wordbookIds", "wordbook_ids"), ("intensityLevel", "intensity_level")],
        );
        assert_eq!(
            Value::Object(translated),
            json!({ "wordbook_ids": [1], "intensity_level": "low", "name": "x" })
        );
    }

    #[tokio::test]
    async fn loading_brackets_success() {
        let (observer, states) = recording_observer();
        let envelope = execute_with_loading(async { Ok::<_, ServiceError>(5) }, Some(&observer)).await;
        assert_eq!(envelope, Envelope::Success(5));
        assert_eq!(
            *states.lock().unwrap(),
            vec![LoadingState::started(), LoadingState::finished()]
        );
    }

    #[tokio::test]
    async fn loading_brackets_failure_with_error() {
        let (observer, states) = recording_observer();
        let envelope: Envelope<()> = execute_with_loading(
            async { Err(ServiceError::MissingField("name".into())) },
            Some(&observer),
        )
        .await;
        assert_eq!(
            envelope,
            Envelope::failure("Required field 'name' is missing or empty")
        );
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                LoadingState::started(),
                LoadingState::failed("Required field 'name' is missing or empty"),
            ]
        );
    }

    #[tokio::test]
    async fn backend_failure_and_validation_failure_look_the_same() {
        let transport = MemoryTransport::new();
        transport.reject("delete_word", json!({ "message": "Word not found" }));
        let (observer, states) = recording_observer();
        let ctx = ServiceContext::new(InvocationClient::with_transport(transport.clone()))
            .with_loading(observer);

        const SPEC: CommandSpec = CommandSpec::new("delete_word")
            .require(&["wordId"])
            .rename(&[("wordId", "word_id")]);

        let envelope: Envelope<Value> = ctx.dispatch(&SPEC, &json!({ "wordId": 9 })).await;
        assert_eq!(envelope, Envelope::failure("Word not found"));
        assert_eq!(transport.calls()[0].args, args(json!({ "word_id": 9 })));

        let envelope: Envelope<Value> = ctx.dispatch(&SPEC, &json!({})).await;
        assert_eq!(
            envelope,
            Envelope::failure("Required field 'wordId' is missing or empty")
        );
        assert_eq!(transport.call_count("delete_word"), 1);

        let recorded = states.lock().unwrap();
        assert_eq!(recorded.len(), 4);
        assert!(recorded.iter().step_by(2).all(|s| s.loading));
        assert!(recorded.iter().skip(1).step_by(2).all(|s| !s.loading && s.error.is_some()));
    }

    #[test]
    fn non_object_params_are_rejected() {
        assert!(matches!(to_args(&json!([1, 2])), Err(ServiceError::NotAnObject)));
        assert!(to_args(&NoParams {}).unwrap().is_empty());
    }

    #[test]
    fn range_helpers_report_field_and_bounds() {
        assert!(ensure_range("month", 12, 1, 12).is_ok());
        let err = ensure_range("month", 13, 1, 12).unwrap_err();
        assert_eq!(err.to_string(), "Field 'month' must be between 1 and 12, got 13");
        let err = ensure_one_of("studyPeriodDays", 10, &[7, 14]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'studyPeriodDays' must be one of [7, 14], got 10"
        );
    }

    #[test]
    fn range_rejects_nan() {
        let err = ensure_range("speed", f32::NAN, 0.5, 2.0).unwrap_err();
        assert_eq!(err.to_string(), "Field 'speed' must be between 0.5 and 2, got NaN");
        assert!(ensure_range("speed", 2.0_f32, 0.5, 2.0).is_ok());
    }
}
