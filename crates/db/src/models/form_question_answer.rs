//! Answer option model for choice questions.

use mindak_core::forms::OptionDef;
use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `form_question_answers` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FormQuestionAnswer {
    pub id: DbId,
    pub question_id: DbId,
    pub answer_text: String,
    pub answer_value: String,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormQuestionAnswer {
    pub fn to_def(&self) -> OptionDef {
        OptionDef {
            id: self.id,
            answer_text: self.answer_text.clone(),
            answer_value: self.answer_value.clone(),
            image_url: self.image_url.clone(),
            order: self.display_order,
        }
    }
}

/// DTO for creating an option. It is appended at the end of its question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormQuestionAnswer {
    #[validate(length(min = 1, max = 500))]
    pub answer_text: String,
    #[validate(length(min = 1, max = 500))]
    pub answer_value: String,
}

/// DTO for updating an option. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFormQuestionAnswer {
    #[validate(length(min = 1, max = 500))]
    pub answer_text: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub answer_value: Option<String>,
}
