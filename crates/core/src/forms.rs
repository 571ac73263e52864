//! Dynamic form definitions: form/section/question types, question groups,
//! and the ordering rules shared by questions and their answer options.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError, INVALID_VALUE, REORDER_MISMATCH};
use crate::types::DbId;

/// Maximum length of a question's text.
pub const MAX_QUESTION_TEXT_LENGTH: usize = 1_000;

/// Maximum length of an answer option's text or value.
pub const MAX_ANSWER_TEXT_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Top-level submission category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    Podcast,
    Services,
}

/// Sub-grouping of questions within a form type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    General,
    ServiceSpecific,
}

/// Input widget / value kind of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Email,
    Phone,
    Textarea,
    Date,
    Select,
    Checkbox,
    Radio,
}

impl FormType {
    pub fn as_str(self) -> &'static str {
        match self {
            FormType::Podcast => "podcast",
            FormType::Services => "services",
        }
    }
}

impl SectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::General => "general",
            SectionType::ServiceSpecific => "service_specific",
        }
    }
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Email => "email",
            QuestionType::Phone => "phone",
            QuestionType::Textarea => "textarea",
            QuestionType::Date => "date",
            QuestionType::Select => "select",
            QuestionType::Checkbox => "checkbox",
            QuestionType::Radio => "radio",
        }
    }

    /// Choice questions resolve their value against answer options.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            QuestionType::Select | QuestionType::Checkbox | QuestionType::Radio
        )
    }

    /// Checkbox questions accept several options at once.
    pub fn is_multi_select(self) -> bool {
        self == QuestionType::Checkbox
    }
}

macro_rules! impl_str_enum {
    ($ty:ty, $field:literal, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                const ALL: &[$ty] = &[$($variant),+];
                ALL.iter().copied().find(|v| v.as_str() == s).ok_or_else(|| {
                    let names: Vec<&str> = ALL.iter().map(|v| v.as_str()).collect();
                    CoreError::invalid_field(
                        INVALID_VALUE,
                        $field,
                        format!("Invalid {} '{s}'. Must be one of: {}", $field, names.join(", ")),
                    )
                })
            }
        }
    };
}

impl_str_enum!(FormType, "form_type", [FormType::Podcast, FormType::Services]);
impl_str_enum!(
    SectionType,
    "section_type",
    [SectionType::General, SectionType::ServiceSpecific]
);
impl_str_enum!(
    QuestionType,
    "question_type",
    [
        QuestionType::Text,
        QuestionType::Email,
        QuestionType::Phone,
        QuestionType::Textarea,
        QuestionType::Date,
        QuestionType::Select,
        QuestionType::Checkbox,
        QuestionType::Radio,
    ]
);

// ---------------------------------------------------------------------------
// Question groups
// ---------------------------------------------------------------------------

/// The (form type, section type, service) triple that scopes question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionGroup {
    pub form_type: FormType,
    pub section_type: SectionType,
    pub service_id: Option<DbId>,
}

impl QuestionGroup {
    /// Build a group, checking that the service scope matches the section.
    ///
    /// - `general` sections never carry a service id.
    /// - `service_specific` sections always carry one, and only exist on the
    ///   `services` form.
    pub fn new(
        form_type: FormType,
        section_type: SectionType,
        service_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        match (form_type, section_type, service_id) {
            (_, SectionType::General, Some(_)) => Err(CoreError::invalid_field(
                INVALID_VALUE,
                "service_id",
                "General questions cannot be scoped to a service",
            )),
            (FormType::Podcast, SectionType::ServiceSpecific, _) => Err(CoreError::invalid_field(
                INVALID_VALUE,
                "section_type",
                "The podcast form has no service-specific section",
            )),
            (FormType::Services, SectionType::ServiceSpecific, None) => {
                Err(CoreError::invalid_field(
                    INVALID_VALUE,
                    "service_id",
                    "Service-specific questions require a service_id",
                ))
            }
            _ => Ok(Self {
                form_type,
                section_type,
                service_id,
            }),
        }
    }

    pub fn general(form_type: FormType) -> Self {
        Self {
            form_type,
            section_type: SectionType::General,
            service_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Definitions consumed by the snapshot builder
// ---------------------------------------------------------------------------

/// An active answer option as seen at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    pub id: DbId,
    pub answer_text: String,
    pub answer_value: String,
    pub image_url: Option<String>,
    pub order: i32,
}

/// An active question, with its active options, as seen at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDef {
    pub id: DbId,
    pub section_type: SectionType,
    pub service_id: Option<DbId>,
    /// Display name of the scoping service, denormalized into snapshots.
    pub service_name: Option<String>,
    pub question_text: String,
    pub question_type: QuestionType,
    pub required: bool,
    pub order: i32,
    pub options: Vec<OptionDef>,
}

// ---------------------------------------------------------------------------
// Text validation
// ---------------------------------------------------------------------------

/// Validate question text: non-blank and within the length limit.
pub fn validate_question_text(text: &str) -> Result<(), CoreError> {
    validate_text("question_text", text, MAX_QUESTION_TEXT_LENGTH)
}

/// Validate an answer option's display text and stored value.
pub fn validate_answer_option(answer_text: &str, answer_value: &str) -> Result<(), CoreError> {
    validate_text("answer_text", answer_text, MAX_ANSWER_TEXT_LENGTH)?;
    validate_text("answer_value", answer_value, MAX_ANSWER_TEXT_LENGTH)
}

fn validate_text(field: &'static str, text: &str, max: usize) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            field,
            format!("{field} cannot be empty"),
        ));
    }
    if text.chars().count() > max {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            field,
            format!("{field} exceeds maximum length of {max} characters"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Compute the new 1-based positions for a reorder request.
///
/// `current` is the set of active ids in the group, `requested` the desired
/// sequence. The request must name every active member exactly once and
/// nothing else; otherwise nothing is reordered.
pub fn plan_reorder(current: &[DbId], requested: &[DbId]) -> Result<Vec<(DbId, i32)>, CoreError> {
    let mut seen = HashSet::with_capacity(requested.len());
    if let Some(dup) = requested.iter().find(|id| !seen.insert(**id)) {
        return Err(ValidationError::new(
            REORDER_MISMATCH,
            "Reorder request lists the same id more than once",
        )
        .with_field(dup)
        .into());
    }

    let active: HashSet<DbId> = current.iter().copied().collect();
    if let Some(foreign) = requested.iter().find(|id| !active.contains(id)) {
        return Err(ValidationError::new(
            REORDER_MISMATCH,
            "Reorder request names an id that is not an active member of the group",
        )
        .with_field(foreign)
        .into());
    }
    if let Some(missing) = current.iter().find(|id| !seen.contains(id)) {
        return Err(ValidationError::new(
            REORDER_MISMATCH,
            "Reorder request omits an active member of the group",
        )
        .with_field(missing)
        .into());
    }

    Ok(requested
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx as i32 + 1))
        .collect())
}

/// Renumber an already-sorted group to `1..=n`, returning only the rows whose
/// position changes. Used after a member leaves the group.
pub fn compact_order(sorted: &[(DbId, i32)]) -> Vec<(DbId, i32)> {
    sorted
        .iter()
        .enumerate()
        .filter_map(|(idx, (id, order))| {
            let wanted = idx as i32 + 1;
            (*order != wanted).then_some((*id, wanted))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_known_values() {
        assert_eq!("podcast".parse::<FormType>().unwrap(), FormType::Podcast);
        assert_eq!(
            "service_specific".parse::<SectionType>().unwrap(),
            SectionType::ServiceSpecific
        );
        assert_eq!("checkbox".parse::<QuestionType>().unwrap(), QuestionType::Checkbox);
    }

    #[test]
    fn parse_unknown_question_type_names_field() {
        assert_matches!(
            "slider".parse::<QuestionType>(),
            Err(CoreError::Validation(v)) if v.field.as_deref() == Some("question_type")
        );
    }

    #[test]
    fn choice_types() {
        assert!(QuestionType::Select.is_choice());
        assert!(QuestionType::Radio.is_choice());
        assert!(QuestionType::Checkbox.is_multi_select());
        assert!(!QuestionType::Email.is_choice());
        assert!(!QuestionType::Select.is_multi_select());
    }

    #[test]
    fn group_requires_service_for_specific_section() {
        assert!(QuestionGroup::new(FormType::Services, SectionType::ServiceSpecific, None).is_err());
        assert!(QuestionGroup::new(FormType::Services, SectionType::ServiceSpecific, Some(3)).is_ok());
    }

    #[test]
    fn group_rejects_service_on_general_section() {
        assert!(QuestionGroup::new(FormType::Services, SectionType::General, Some(3)).is_err());
    }

    #[test]
    fn podcast_form_has_no_service_section() {
        assert!(QuestionGroup::new(FormType::Podcast, SectionType::ServiceSpecific, Some(1)).is_err());
    }

    #[test]
    fn reorder_assigns_one_based_positions() {
        let plan = plan_reorder(&[10, 11, 12], &[12, 10, 11]).unwrap();
        assert_eq!(plan, vec![(12, 1), (10, 2), (11, 3)]);
    }

    #[test]
    fn reorder_missing_member_fails() {
        assert_matches!(
            plan_reorder(&[10, 11, 12], &[12, 10]),
            Err(CoreError::Validation(v)) if v.code == REORDER_MISMATCH && v.field.as_deref() == Some("11")
        );
    }

    #[test]
    fn reorder_foreign_id_fails() {
        assert_matches!(
            plan_reorder(&[10, 11], &[10, 11, 99]),
            Err(CoreError::Validation(v)) if v.field.as_deref() == Some("99")
        );
    }

    #[test]
    fn reorder_duplicate_id_fails() {
        assert_matches!(
            plan_reorder(&[10, 11], &[10, 10]),
            Err(CoreError::Validation(v)) if v.code == REORDER_MISMATCH
        );
    }

    #[test]
    fn compact_order_closes_gaps() {
        let changes = compact_order(&[(5, 1), (7, 3), (9, 4)]);
        assert_eq!(changes, vec![(7, 2), (9, 3)]);
    }

    #[test]
    fn compact_order_is_noop_when_contiguous() {
        assert!(compact_order(&[(1, 1), (2, 2)]).is_empty());
    }

    #[test]
    fn blank_question_text_rejected() {
        assert!(validate_question_text("   ").is_err());
        assert!(validate_question_text("What is your name?").is_ok());
    }

    #[test]
    fn answer_option_requires_text_and_value() {
        assert!(validate_answer_option("Google", "").is_err());
        assert!(validate_answer_option("Google", "google").is_ok());
    }
}
