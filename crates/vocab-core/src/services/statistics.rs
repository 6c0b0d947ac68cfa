use serde_json::Value;

use super::word_books::{BookRef, GET_WORD_BOOK_STATISTICS};
use super::{CommandSpec, LoadingObserver, NoParams, ServiceContext};
use crate::envelope::Envelope;

const GET_STUDY_STATISTICS: CommandSpec = CommandSpec::new("get_study_statistics");

/// Aggregate study statistics.
#[derive(Debug, Clone)]
pub struct StatisticsService {
    ctx: ServiceContext,
}

impl StatisticsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn get_study_statistics(&self) -> Envelope<Value> {
        self.ctx.dispatch(&GET_STUDY_STATISTICS, &NoParams {}).await
    }

    pub async fn get_word_book_statistics(&self, book_id: i64) -> Envelope<Value> {
        self.ctx
            .dispatch(&GET_WORD_BOOK_STATISTICS, &BookRef { book_id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InvocationClient;
    use crate::transport::MemoryTransport;
    use serde_json::json;

    #[tokio::test]
    async fn book_statistics_share_the_word_book_command() {
        let transport = MemoryTransport::new();
        transport.respond("get_word_book_statistics", json!({ "mastered": 10 }));
        let svc = StatisticsService::new(ServiceContext::new(InvocationClient::with_transport(
            transport.clone(),
        )));

        let envelope = svc.get_word_book_statistics(8).await;
        assert_eq!(envelope, Envelope::Success(json!({ "mastered": 10 })));
        assert_eq!(
            Value::Object(transport.calls()[0].args.clone()),
            json!({ "book_id": 8 })
        );
    }
}
