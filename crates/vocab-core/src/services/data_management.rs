use serde::Serialize;
use serde_json::Value;

use super::{CommandSpec, LoadingObserver, NoParams, ServiceContext};
use crate::envelope::Envelope;
use crate::error::ServiceError;

const DATABASE_STATISTICS: CommandSpec = CommandSpec::new("get_database_statistics");
const RESET_USER_DATA: CommandSpec = CommandSpec::new("reset_user_data");
const RESET_SELECTED_TABLES: CommandSpec = CommandSpec::new("reset_selected_tables")
    .require(&["tableNames"])
    .rename(&[("tableNames", "table_names")]);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableSelection<'a> {
    table_names: &'a [String],
}

/// Database inspection and reset.
#[derive(Debug, Clone)]
pub struct DataManagementService {
    ctx: ServiceContext,
}

impl DataManagementService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn get_database_statistics(&self) -> Envelope<Value> {
        self.ctx.dispatch(&DATABASE_STATISTICS, &NoParams {}).await
    }

    pub async fn reset_user_data(&self) -> Envelope<Value> {
        self.ctx.dispatch(&RESET_USER_DATA, &NoParams {}).await
    }

    pub async fn reset_selected_tables(&self, table_names: &[String]) -> Envelope<Value> {
        self.ctx
            .execute(async {
                if table_names.is_empty() || table_names.iter().any(|t| t.trim().is_empty()) {
                    return Err(ServiceError::MissingField("tableNames".into()));
                }
                self.ctx
                    .call(&RESET_SELECTED_TABLES, &TableSelection { table_names })
                    .await
            })
            .await
    }
}
