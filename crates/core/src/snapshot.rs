//! Answer snapshot builder.
//!
//! Turns a raw client submission into the immutable, denormalized answer
//! sequence stored on a reservation. Question and option text are copied
//! into the snapshot so later edits to the live definitions never rewrite
//! what the client actually answered.
//!
//! Validation happens in a fixed order so the reported error is stable:
//!
//! 1. every required choice question must have at least one active option
//! 2. every submitted question id must belong to the active form
//! 3. every required question must have a non-empty value
//! 4. each value is resolved (choice) or coerced (free text) in form order

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{
    CoreError, ValidationError, INVALID_ANSWER_OPTION, INVALID_FORMAT, INVALID_VALUE,
    MISSING_REQUIRED_ANSWER, QUESTION_WITHOUT_OPTIONS, UNKNOWN_QUESTION,
};
use crate::forms::{OptionDef, QuestionDef, QuestionType, SectionType};
use crate::types::DbId;

/// Maximum length of a single free-text answer, in characters.
pub const MAX_ANSWER_LENGTH: usize = 10_000;

/// Loose RFC 5322-ish shape: something@something.tld, no whitespace.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Digits with optional leading `+` and common separators.
pub const PHONE_PATTERN: &str = r"^\+?[0-9][0-9()\-.\s]*$";

/// Minimum and maximum digit counts accepted for a phone number.
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Scalar values allowed in a snapshot's metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

/// Free-form key/value annotations on an answer, sorted by key.
pub type AnswerMetadata = BTreeMap<String, MetadataValue>;

/// One option picked for a choice question, frozen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub answer_id: DbId,
    pub answer_text: String,
    pub answer_value: String,
}

/// A question and its answer as they were when the reservation was submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestionSnapshot {
    pub question_id: DbId,
    pub question_text: String,
    pub question_type: QuestionType,
    pub section_type: SectionType,
    pub service_id: Option<DbId>,
    pub service_name: Option<String>,
    /// `null`, a string, or (for checkbox questions) an array of strings.
    pub value: Value,
    pub answer_id: Option<DbId>,
    pub answer_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<SelectedOption>,
    #[serde(default)]
    pub answer_metadata: AnswerMetadata,
}

/// A single raw answer from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: DbId,
    #[serde(default)]
    pub value: Value,
}

/// The active question set a submission is validated against, in display
/// order: the general section first, then each requested service's section
/// in the order the services were requested.
#[derive(Debug, Clone, Default)]
pub struct ActiveForm {
    questions: Vec<QuestionDef>,
}

impl ActiveForm {
    pub fn assemble(general: Vec<QuestionDef>, service_sections: Vec<Vec<QuestionDef>>) -> Self {
        let mut questions = Vec::new();
        for mut section in std::iter::once(general).chain(service_sections) {
            section.sort_by_key(|q| (q.order, q.id));
            for question in &mut section {
                question.options.sort_by_key(|o| (o.order, o.id));
            }
            questions.extend(section);
        }
        Self { questions }
    }

    pub fn questions(&self) -> &[QuestionDef] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Validate `answers` against `form` and freeze one snapshot per active
/// question, in form order. Optional questions left blank are included with
/// `value = null`.
pub fn build_snapshot(
    form: &ActiveForm,
    answers: &[SubmittedAnswer],
) -> Result<Vec<AnsweredQuestionSnapshot>, CoreError> {
    for question in form.questions() {
        if question.required && question.question_type.is_choice() && question.options.is_empty() {
            return Err(ValidationError::new(
                QUESTION_WITHOUT_OPTIONS,
                "Required choice question has no active answer options",
            )
            .with_field(question.id)
            .into());
        }
    }

    let known: HashSet<DbId> = form.questions().iter().map(|q| q.id).collect();
    let mut submitted: HashMap<DbId, RawValue> = HashMap::with_capacity(answers.len());

    let mut ordered: Vec<&SubmittedAnswer> = answers.iter().collect();
    ordered.sort_by_key(|a| a.question_id);

    for answer in &ordered {
        if !known.contains(&answer.question_id) {
            return Err(ValidationError::new(
                UNKNOWN_QUESTION,
                "Answer references a question that is not part of this form",
            )
            .with_field(answer.question_id)
            .into());
        }
    }
    for answer in ordered {
        let raw = RawValue::from_json(answer.question_id, &answer.value)?;
        if submitted.insert(answer.question_id, raw).is_some() {
            return Err(ValidationError::new(
                INVALID_VALUE,
                "Question answered more than once",
            )
            .with_field(answer.question_id)
            .into());
        }
    }

    for question in form.questions() {
        let answered = submitted.get(&question.id).is_some_and(|v| !v.is_empty());
        if question.required && !answered {
            return Err(ValidationError::new(
                MISSING_REQUIRED_ANSWER,
                format!("'{}' is required", question.question_text),
            )
            .with_field(question.id)
            .into());
        }
    }

    form.questions()
        .iter()
        .map(|question| {
            let raw = submitted.remove(&question.id).unwrap_or(RawValue::Empty);
            snapshot_question(question, raw)
        })
        .collect()
}

fn snapshot_question(
    question: &QuestionDef,
    raw: RawValue,
) -> Result<AnsweredQuestionSnapshot, CoreError> {
    let mut snapshot = AnsweredQuestionSnapshot {
        question_id: question.id,
        question_text: question.question_text.clone(),
        question_type: question.question_type,
        section_type: question.section_type,
        service_id: question.service_id,
        service_name: question.service_name.clone(),
        value: Value::Null,
        answer_id: None,
        answer_text: None,
        selections: Vec::new(),
        answer_metadata: AnswerMetadata::new(),
    };

    if raw.is_empty() {
        return Ok(snapshot);
    }

    if question.question_type.is_multi_select() {
        let values = raw.into_many();
        let selected = values
            .iter()
            .map(|v| resolve_option(question, v))
            .collect::<Result<Vec<_>, _>>()?;

        if let [only] = selected.as_slice() {
            snapshot.answer_id = Some(only.id);
        }
        snapshot.answer_text = Some(
            selected
                .iter()
                .map(|o| o.answer_text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );
        snapshot.answer_metadata.insert(
            "selected_count".to_string(),
            MetadataValue::Number(selected.len() as f64),
        );
        snapshot.selections = selected.iter().map(|o| selection(o)).collect();
        snapshot.value = Value::Array(values.into_iter().map(Value::String).collect());
        return Ok(snapshot);
    }

    let value = raw.into_single(question.id)?;

    if question.question_type.is_choice() {
        let option = resolve_option(question, &value)?;
        snapshot.answer_id = Some(option.id);
        snapshot.answer_text = Some(option.answer_text.clone());
        if let Some(url) = &option.image_url {
            snapshot
                .answer_metadata
                .insert("image_url".to_string(), url.as_str().into());
        }
        snapshot.selections = vec![selection(option)];
        snapshot.value = Value::String(value);
        return Ok(snapshot);
    }

    let coerced = coerce_free_text(question, value)?;
    if question.question_type == QuestionType::Date {
        snapshot
            .answer_metadata
            .insert("iso_date".to_string(), coerced.as_str().into());
    }
    snapshot.value = Value::String(coerced);
    Ok(snapshot)
}

fn selection(option: &OptionDef) -> SelectedOption {
    SelectedOption {
        answer_id: option.id,
        answer_text: option.answer_text.clone(),
        answer_value: option.answer_value.clone(),
    }
}

fn resolve_option<'a>(question: &'a QuestionDef, value: &str) -> Result<&'a OptionDef, CoreError> {
    question
        .options
        .iter()
        .find(|o| o.answer_value == value)
        .ok_or_else(|| {
            ValidationError::new(
                INVALID_ANSWER_OPTION,
                format!("'{value}' is not a valid option for '{}'", question.question_text),
            )
            .with_field(question.id)
            .into()
        })
}

/// Apply the per-type format rules to a free-text answer.
fn coerce_free_text(question: &QuestionDef, value: String) -> Result<String, CoreError> {
    let invalid = |message: &str| -> CoreError {
        ValidationError::new(INVALID_FORMAT, message)
            .with_field(question.id)
            .into()
    };

    if value.chars().count() > MAX_ANSWER_LENGTH {
        return Err(invalid("Answer exceeds the maximum length"));
    }

    match question.question_type {
        QuestionType::Email if !is_valid_email(&value) => Err(invalid("Invalid email address")),
        QuestionType::Phone if !is_valid_phone(&value) => Err(invalid("Invalid phone number")),
        QuestionType::Date => parse_date(&value)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .ok_or_else(|| invalid("Invalid date, expected YYYY-MM-DD")),
        _ => Ok(value),
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
        && PHONE_DIGITS.contains(&value.chars().filter(char::is_ascii_digit).count())
}

/// Accept a calendar date (`2024-05-01`) or an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

// ---------------------------------------------------------------------------
// Raw value normalization
// ---------------------------------------------------------------------------

/// A submitted JSON value after trimming, before type-specific handling.
#[derive(Debug)]
enum RawValue {
    Empty,
    Single(String),
    Many(Vec<String>),
}

impl RawValue {
    fn from_json(question_id: DbId, value: &Value) -> Result<Self, CoreError> {
        let scalar = |v: &Value| -> Result<Option<String>, CoreError> {
            match v {
                Value::Null => Ok(None),
                Value::String(s) => {
                    let trimmed = s.trim();
                    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
                }
                Value::Number(n) => Ok(Some(n.to_string())),
                Value::Bool(b) => Ok(Some(b.to_string())),
                Value::Array(_) | Value::Object(_) => Err(ValidationError::new(
                    INVALID_FORMAT,
                    "Answer values must be text or a list of text",
                )
                .with_field(question_id)
                .into()),
            }
        };

        match value {
            Value::Array(items) => {
                let mut seen = HashSet::new();
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(v) = scalar(item)? {
                        if seen.insert(v.clone()) {
                            values.push(v);
                        }
                    }
                }
                Ok(if values.is_empty() {
                    RawValue::Empty
                } else {
                    RawValue::Many(values)
                })
            }
            other => Ok(scalar(other)?.map_or(RawValue::Empty, RawValue::Single)),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }

    fn into_many(self) -> Vec<String> {
        match self {
            RawValue::Empty => Vec::new(),
            RawValue::Single(v) => vec![v],
            RawValue::Many(vs) => vs,
        }
    }

    fn into_single(self, question_id: DbId) -> Result<String, CoreError> {
        match self {
            RawValue::Single(v) => Ok(v),
            RawValue::Many(mut vs) if vs.len() == 1 => Ok(vs.remove(0)),
            _ => Err(ValidationError::new(
                INVALID_FORMAT,
                "This question accepts a single value",
            )
            .with_field(question_id)
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn question(id: DbId, order: i32, qtype: QuestionType, required: bool) -> QuestionDef {
        QuestionDef {
            id,
            section_type: SectionType::General,
            service_id: None,
            service_name: None,
            question_text: format!("Question {id}"),
            question_type: qtype,
            required,
            order,
            options: Vec::new(),
        }
    }

    fn option(id: DbId, order: i32, value: &str) -> OptionDef {
        OptionDef {
            id,
            answer_text: value.to_uppercase(),
            answer_value: value.to_string(),
            image_url: None,
            order,
        }
    }

    fn answer(question_id: DbId, value: Value) -> SubmittedAnswer {
        SubmittedAnswer { question_id, value }
    }

    fn podcast_form() -> ActiveForm {
        let mut source = question(6, 4, QuestionType::Select, false);
        source.options = vec![option(61, 2, "google"), option(60, 1, "social_media")];
        ActiveForm::assemble(
            vec![
                question(2, 2, QuestionType::Email, true),
                question(1, 1, QuestionType::Text, true),
                question(3, 3, QuestionType::Phone, false),
                source,
            ],
            Vec::new(),
        )
    }

    fn validation_code(err: CoreError) -> (&'static str, Option<String>) {
        match err {
            CoreError::Validation(v) => (v.code, v.field),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_covers_every_active_question_in_order() {
        let form = podcast_form();
        let snapshot = build_snapshot(
            &form,
            &[answer(1, json!("Jane Doe")), answer(2, json!("jane@x.com"))],
        )
        .unwrap();

        assert_eq!(snapshot.len(), form.len());
        let ids: Vec<DbId> = snapshot.iter().map(|s| s.question_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 6]);
        assert_eq!(snapshot[0].value, json!("Jane Doe"));
        assert_eq!(snapshot[1].value, json!("jane@x.com"));
        assert_eq!(snapshot[2].value, Value::Null);
        assert_eq!(snapshot[3].value, Value::Null);
        assert!(snapshot[0].answer_id.is_none());
        assert!(snapshot[0].answer_text.is_none());
    }

    #[test]
    fn missing_required_answer_is_rejected() {
        let err = build_snapshot(&podcast_form(), &[answer(1, json!("Jane"))]).unwrap_err();
        assert_eq!(
            validation_code(err),
            (MISSING_REQUIRED_ANSWER, Some("2".to_string()))
        );
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let err = build_snapshot(
            &podcast_form(),
            &[answer(1, json!("   ")), answer(2, json!("jane@x.com"))],
        )
        .unwrap_err();
        assert_eq!(
            validation_code(err),
            (MISSING_REQUIRED_ANSWER, Some("1".to_string()))
        );
    }

    #[test]
    fn unknown_question_wins_over_missing_required() {
        let err = build_snapshot(&podcast_form(), &[answer(999, json!("x"))]).unwrap_err();
        assert_eq!(validation_code(err), (UNKNOWN_QUESTION, Some("999".to_string())));
    }

    #[test]
    fn choice_answer_resolves_option_text() {
        let snapshot = build_snapshot(
            &podcast_form(),
            &[
                answer(1, json!("Jane")),
                answer(2, json!("jane@x.com")),
                answer(6, json!("google")),
            ],
        )
        .unwrap();
        let source = &snapshot[3];
        assert_eq!(source.answer_id, Some(61));
        assert_eq!(source.answer_text.as_deref(), Some("GOOGLE"));
        assert_eq!(source.value, json!("google"));
        assert_eq!(source.selections.len(), 1);
    }

    #[test]
    fn choice_answer_must_match_an_option() {
        let err = build_snapshot(
            &podcast_form(),
            &[
                answer(1, json!("Jane")),
                answer(2, json!("jane@x.com")),
                answer(6, json!("billboard")),
            ],
        )
        .unwrap_err();
        assert_eq!(
            validation_code(err),
            (INVALID_ANSWER_OPTION, Some("6".to_string()))
        );
    }

    #[test]
    fn checkbox_values_are_validated_element_wise() {
        let mut platforms = question(9, 1, QuestionType::Checkbox, true);
        platforms.options = vec![option(90, 1, "facebook"), option(91, 2, "tiktok")];
        let form = ActiveForm::assemble(vec![platforms], Vec::new());

        let ok = build_snapshot(&form, &[answer(9, json!(["tiktok", "facebook"]))]).unwrap();
        assert_eq!(ok[0].value, json!(["tiktok", "facebook"]));
        assert_eq!(ok[0].answer_id, None);
        assert_eq!(ok[0].answer_text.as_deref(), Some("TIKTOK, FACEBOOK"));
        assert_eq!(ok[0].selections.len(), 2);
        assert_eq!(
            ok[0].answer_metadata.get("selected_count"),
            Some(&MetadataValue::Number(2.0))
        );

        let err = build_snapshot(&form, &[answer(9, json!(["tiktok", "myspace"]))]).unwrap_err();
        assert_eq!(validation_code(err).0, INVALID_ANSWER_OPTION);
    }

    #[test]
    fn checkbox_single_value_is_accepted() {
        let mut platforms = question(9, 1, QuestionType::Checkbox, true);
        platforms.options = vec![option(90, 1, "facebook")];
        let form = ActiveForm::assemble(vec![platforms], Vec::new());

        let snapshot = build_snapshot(&form, &[answer(9, json!("facebook"))]).unwrap();
        assert_eq!(snapshot[0].answer_id, Some(90));
        assert_eq!(snapshot[0].value, json!(["facebook"]));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let err = build_snapshot(
            &podcast_form(),
            &[answer(1, json!("Jane")), answer(2, json!("not-an-email"))],
        )
        .unwrap_err();
        assert_eq!(validation_code(err), (INVALID_FORMAT, Some("2".to_string())));
    }

    #[test]
    fn optional_phone_is_still_format_checked() {
        let err = build_snapshot(
            &podcast_form(),
            &[
                answer(1, json!("Jane")),
                answer(2, json!("jane@x.com")),
                answer(3, json!("call me")),
            ],
        )
        .unwrap_err();
        assert_eq!(validation_code(err), (INVALID_FORMAT, Some("3".to_string())));
    }

    #[test]
    fn phone_patterns() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("0612345678"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("555-CALL-NOW"));
    }

    #[test]
    fn date_is_normalized() {
        let form = ActiveForm::assemble(vec![question(5, 1, QuestionType::Date, true)], Vec::new());
        let snapshot = build_snapshot(&form, &[answer(5, json!("2024-06-01T10:00:00Z"))]).unwrap();
        assert_eq!(snapshot[0].value, json!("2024-06-01"));

        let err = build_snapshot(&form, &[answer(5, json!("2024-02-30"))]).unwrap_err();
        assert_eq!(validation_code(err).0, INVALID_FORMAT);
    }

    #[test]
    fn required_choice_without_options_cannot_be_used() {
        let form = ActiveForm::assemble(
            vec![question(7, 1, QuestionType::Radio, true)],
            Vec::new(),
        );
        let err = build_snapshot(&form, &[answer(7, json!("yes"))]).unwrap_err();
        assert_eq!(
            validation_code(err),
            (QUESTION_WITHOUT_OPTIONS, Some("7".to_string()))
        );
    }

    #[test]
    fn duplicate_answers_are_rejected() {
        let err = build_snapshot(
            &podcast_form(),
            &[answer(1, json!("Jane")), answer(1, json!("Janet"))],
        )
        .unwrap_err();
        assert_eq!(validation_code(err).0, INVALID_VALUE);
    }

    #[test]
    fn object_value_is_malformed() {
        let err = build_snapshot(&podcast_form(), &[answer(1, json!({"first": "Jane"}))]).unwrap_err();
        assert_eq!(validation_code(err).0, INVALID_FORMAT);
    }

    #[test]
    fn service_sections_follow_general_section() {
        let mut specific = question(20, 1, QuestionType::Textarea, false);
        specific.section_type = SectionType::ServiceSpecific;
        specific.service_id = Some(4);
        specific.service_name = Some("Web".to_string());

        let form = ActiveForm::assemble(
            vec![question(10, 1, QuestionType::Text, false)],
            vec![vec![specific]],
        );
        let snapshot = build_snapshot(&form, &[answer(20, json!("A shop"))]).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].service_id, Some(4));
        assert_eq!(snapshot[1].service_name.as_deref(), Some("Web"));
        assert_eq!(snapshot[1].section_type, SectionType::ServiceSpecific);
    }

    #[test]
    fn output_is_deterministic() {
        let form = podcast_form();
        let answers = [
            answer(2, json!("jane@x.com")),
            answer(6, json!("social_media")),
            answer(1, json!("Jane")),
        ];
        let first = build_snapshot(&form, &answers).unwrap();
        let second = build_snapshot(&form, &answers).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let mut meta = AnswerMetadata::new();
        meta.insert("a".into(), MetadataValue::Null);
        meta.insert("b".into(), MetadataValue::Bool(true));
        meta.insert("c".into(), MetadataValue::Number(1.5));
        meta.insert("d".into(), "x".into());
        let encoded = serde_json::to_value(&meta).unwrap();
        assert_eq!(encoded, json!({"a": null, "b": true, "c": 1.5, "d": "x"}));
        let decoded: AnswerMetadata = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, meta);
    }
}
