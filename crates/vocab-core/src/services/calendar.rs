use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::{CommandSpec, LoadingObserver, NoParams, ServiceContext, ensure_range};
use crate::envelope::Envelope;
use crate::error::ServiceError;

pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 9999;

const MONTH_DATA: CommandSpec = CommandSpec::new("get_calendar_month_data").require(&["year", "month"]);
const MONTHLY_STATS: CommandSpec =
    CommandSpec::new("get_calendar_monthly_stats").require(&["year", "month"]);
const DAY_DETAIL: CommandSpec = CommandSpec::new("get_calendar_day_detail").require(&["date"]);
const TODAY: CommandSpec = CommandSpec::new("get_today_study_schedules");
const STREAK: CommandSpec = CommandSpec::new("get_study_streak");

#[derive(Serialize)]
struct MonthRef {
    year: i32,
    month: u32,
}

#[derive(Serialize)]
struct DayRef<'a> {
    date: &'a str,
}

/// Calendar views over the study schedule.
#[derive(Debug, Clone)]
pub struct CalendarService {
    ctx: ServiceContext,
}

impl CalendarService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn get_calendar_month_data(&self, year: i32, month: u32) -> Envelope<Value> {
        self.month_call(&MONTH_DATA, year, month).await
    }

    pub async fn get_calendar_monthly_stats(&self, year: i32, month: u32) -> Envelope<Value> {
        self.month_call(&MONTHLY_STATS, year, month).await
    }

    /// `date` must be `YYYY-MM-DD`.
    pub async fn get_calendar_day_detail(&self, date: &str) -> Envelope<Value> {
        self.ctx
            .execute(async {
                validate_date("date", date)?;
                self.ctx.call(&DAY_DETAIL, &DayRef { date }).await
            })
            .await
    }

    pub async fn get_today_study_schedules(&self) -> Envelope<Value> {
        self.ctx.dispatch(&TODAY, &NoParams {}).await
    }

    pub async fn get_study_streak(&self) -> Envelope<Value> {
        self.ctx.dispatch(&STREAK, &NoParams {}).await
    }

    async fn month_call(&self, spec: &CommandSpec, year: i32, month: u32) -> Envelope<Value> {
        self.ctx
            .execute(async {
                ensure_range("year", year, MIN_YEAR, MAX_YEAR)?;
                ensure_range("month", month, 1, 12)?;
                self.ctx.call(spec, &MonthRef { year, month }).await
            })
            .await
    }
}

fn validate_date(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.is_empty() {
        return Err(ServiceError::MissingField(field.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|err| {
            ServiceError::out_of_range(field, format!("must be a YYYY-MM-DD date ({err})"))
        })
}
