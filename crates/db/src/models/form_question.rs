//! Dynamic form question model.

use mindak_core::error::CoreError;
use mindak_core::forms::{FormType, OptionDef, QuestionDef, QuestionGroup, QuestionType, SectionType};
use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::form_question_answer::FormQuestionAnswer;

/// A row from the `form_questions` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FormQuestion {
    pub id: DbId,
    pub form_type: String,
    pub section_type: String,
    pub service_id: Option<DbId>,
    pub question_text: String,
    pub question_type: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormQuestion {
    /// The ordering group this question belongs to.
    pub fn group(&self) -> Result<QuestionGroup, CoreError> {
        QuestionGroup::new(
            self.form_type.parse::<FormType>()?,
            self.section_type.parse::<SectionType>()?,
            self.service_id,
        )
    }

    pub fn kind(&self) -> Result<QuestionType, CoreError> {
        self.question_type.parse()
    }

    /// Convert to the definition consumed by the snapshot builder.
    pub fn to_def(
        &self,
        service_name: Option<String>,
        options: Vec<OptionDef>,
    ) -> Result<QuestionDef, CoreError> {
        Ok(QuestionDef {
            id: self.id,
            section_type: self.section_type.parse()?,
            service_id: self.service_id,
            service_name,
            question_text: self.question_text.clone(),
            question_type: self.kind()?,
            required: self.required,
            order: self.display_order,
            options,
        })
    }
}

/// A question together with its answer options, as served to clients and
/// the admin editor.
#[derive(Debug, Clone, Serialize)]
pub struct FormQuestionWithAnswers {
    #[serde(flatten)]
    pub question: FormQuestion,
    pub answers: Vec<FormQuestionAnswer>,
}

/// DTO for creating a question. It is appended at the end of its group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormQuestion {
    pub section_type: Option<SectionType>,
    pub service_id: Option<DbId>,
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[validate(length(max = 500))]
    pub placeholder: Option<String>,
    #[validate(length(max = 2000))]
    pub help_text: Option<String>,
}

/// DTO for updating a question. Absent fields are left unchanged; the
/// question's group is fixed at creation.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFormQuestion {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: Option<String>,
    pub question_type: Option<QuestionType>,
    pub required: Option<bool>,
    #[validate(length(max = 500))]
    pub placeholder: Option<String>,
    #[validate(length(max = 2000))]
    pub help_text: Option<String>,
}

/// Filters for listing the questions of one form.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionListParams {
    pub section_type: Option<SectionType>,
    pub service_id: Option<DbId>,
    pub include_inactive: Option<bool>,
}

/// Body of a reorder request: the complete desired sequence of ids.
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<DbId>,
}

/// Body of a question reorder request. The group defaults to the general
/// section of the form named in the path.
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionReorderRequest {
    pub section_type: Option<SectionType>,
    pub service_id: Option<DbId>,
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<DbId>,
}
