use serde::Serialize;
use serde_json::Value;

use super::{CommandSpec, LoadingObserver, ServiceContext, ensure_range};
use crate::envelope::Envelope;
use crate::error::ServiceError;
use crate::models::{Word, WordBook, WordPage};

pub const MAX_PAGE_SIZE: u32 = 200;

const BOOK_ID: &[(&str, &str)] = &[("bookId", "book_id")];
const WORD_FIELDS: &[(&str, &str)] = &[
    ("bookId", "book_id"),
    ("wordId", "word_id"),
    ("partOfSpeech", "part_of_speech"),
];
const BOOK_FIELDS: &[(&str, &str)] = &[
    ("bookId", "book_id"),
    ("iconName", "icon_name"),
    ("iconColor", "icon_color"),
];

const GET_WORD_BOOKS: CommandSpec = CommandSpec::new("get_word_books");
const GET_WORD_BOOK_DETAIL: CommandSpec = CommandSpec::new("get_word_book_detail")
    .require(&["bookId"])
    .rename(BOOK_ID);
const CREATE_WORD_BOOK: CommandSpec = CommandSpec::new("create_word_book")
    .require(&["title"])
    .rename(BOOK_FIELDS);
const UPDATE_WORD_BOOK: CommandSpec = CommandSpec::new("update_word_book")
    .require(&["bookId"])
    .rename(BOOK_FIELDS);
const DELETE_WORD_BOOK: CommandSpec = CommandSpec::new("delete_word_book")
    .require(&["bookId"])
    .rename(BOOK_ID);
pub(crate) const GET_WORD_BOOK_STATISTICS: CommandSpec =
    CommandSpec::new("get_word_book_statistics")
        .require(&["bookId"])
        .rename(BOOK_ID);
const GET_WORDS_BY_BOOK: CommandSpec = CommandSpec::new("get_words_by_book")
    .require(&["bookId"])
    .rename(&[
        ("bookId", "book_id"),
        ("pageSize", "page_size"),
        ("partOfSpeech", "part_of_speech"),
    ]);
const ADD_WORD_TO_BOOK: CommandSpec = CommandSpec::new("add_word_to_book")
    .require(&["bookId", "word"])
    .rename(WORD_FIELDS);
const UPDATE_WORD: CommandSpec = CommandSpec::new("update_word")
    .require(&["wordId"])
    .rename(WORD_FIELDS);
const DELETE_WORD: CommandSpec = CommandSpec::new("delete_word")
    .require(&["wordId"])
    .rename(WORD_FIELDS);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordBookFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordBookDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordBookUpdate {
    pub book_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordQuery {
    pub book_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDraft {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordUpdate {
    pub word_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookRef {
    pub(crate) book_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WordRef {
    word_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewWord<'a> {
    book_id: i64,
    #[serde(flatten)]
    draft: &'a WordDraft,
}

/// Word book and word CRUD.
#[derive(Debug, Clone)]
pub struct WordBookService {
    ctx: ServiceContext,
}

impl WordBookService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn with_loading(&self, observer: LoadingObserver) -> Self {
        Self::new(self.ctx.with_loading(observer))
    }

    pub async fn get_word_books(&self, filter: &WordBookFilter) -> Envelope<Vec<WordBook>> {
        self.ctx.dispatch(&GET_WORD_BOOKS, filter).await
    }

    pub async fn get_word_book_detail(&self, book_id: i64) -> Envelope<WordBook> {
        self.ctx
            .dispatch(&GET_WORD_BOOK_DETAIL, &BookRef { book_id })
            .await
    }

    pub async fn create_word_book(&self, draft: &WordBookDraft) -> Envelope<i64> {
        self.ctx.dispatch(&CREATE_WORD_BOOK, draft).await
    }

    pub async fn update_word_book(&self, update: &WordBookUpdate) -> Envelope<Value> {
        self.ctx.dispatch(&UPDATE_WORD_BOOK, update).await
    }

    pub async fn delete_word_book(&self, book_id: i64) -> Envelope<Value> {
        self.ctx
            .dispatch(&DELETE_WORD_BOOK, &BookRef { book_id })
            .await
    }

    pub async fn get_word_book_statistics(&self, book_id: i64) -> Envelope<Value> {
        self.ctx
            .dispatch(&GET_WORD_BOOK_STATISTICS, &BookRef { book_id })
            .await
    }

    pub async fn get_words_by_book(&self, query: &WordQuery) -> Envelope<WordPage> {
        self.ctx
            .execute(async {
                if let Some(page) = query.page {
                    ensure_range("page", page, 1, u32::MAX)?;
                }
                if let Some(page_size) = query.page_size {
                    ensure_range("pageSize", page_size, 1, MAX_PAGE_SIZE)?;
                }
                self.ctx.call(&GET_WORDS_BY_BOOK, query).await
            })
            .await
    }

    pub async fn add_word_to_book(&self, book_id: i64, draft: &WordDraft) -> Envelope<i64> {
        self.ctx
            .dispatch(&ADD_WORD_TO_BOOK, &NewWord { book_id, draft })
            .await
    }

    pub async fn update_word(&self, update: &WordUpdate) -> Envelope<Word> {
        self.ctx
            .execute(async {
                if update.word.as_deref().is_some_and(|w| w.trim().is_empty()) {
                    return Err(ServiceError::MissingField("word".into()));
                }
                self.ctx.call(&UPDATE_WORD, update).await
            })
            .await
    }

    pub async fn delete_word(&self, word_id: i64) -> Envelope<Value> {
        self.ctx.dispatch(&DELETE_WORD, &WordRef { word_id }).await
    }
}
