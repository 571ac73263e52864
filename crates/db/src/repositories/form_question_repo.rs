//! Repository for the `form_questions` table.
//!
//! Order is unique among the active members of a question group; see
//! [`FormQuestionRepo::apply_order`] for how positions are rewritten without
//! tripping that index.

use mindak_core::forms::{FormType, QuestionGroup};
use mindak_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::form_question::{
    CreateFormQuestion, FormQuestion, QuestionListParams, UpdateFormQuestion,
};

/// Column list for form_questions queries.
const COLUMNS: &str = "id, form_type, section_type, service_id, question_text, question_type, \
    required, placeholder, help_text, display_order, is_active, created_at, updated_at";

/// Predicate selecting the active members of a group bound as `$1..$3`.
const GROUP_FILTER: &str = "form_type = $1 AND section_type = $2 \
    AND service_id IS NOT DISTINCT FROM $3 AND is_active";

/// Provides CRUD and ordering operations for form questions.
pub struct FormQuestionRepo;

impl FormQuestionRepo {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<FormQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_questions WHERE id = $1");
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock a question row for the rest of the transaction.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<FormQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_questions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List the questions of one form, grouped by section then service, each
    /// group in display order.
    pub async fn list(
        pool: &PgPool,
        form_type: FormType,
        params: &QuestionListParams,
    ) -> Result<Vec<FormQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_questions
             WHERE form_type = $1
               AND ($2::TEXT IS NULL OR section_type = $2)
               AND ($3::BIGINT IS NULL OR service_id = $3)
               AND ($4 OR is_active)
             ORDER BY section_type, service_id NULLS FIRST, is_active DESC, display_order, id"
        );
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(form_type.as_str())
            .bind(params.section_type.map(|s| s.as_str()))
            .bind(params.service_id)
            .bind(params.include_inactive.unwrap_or(false))
            .fetch_all(pool)
            .await
    }

    /// Active questions of one group in display order.
    pub async fn list_active_group<'e, E: PgExecutor<'e>>(
        executor: E,
        group: &QuestionGroup,
    ) -> Result<Vec<FormQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_questions
             WHERE {GROUP_FILTER}
             ORDER BY display_order, id"
        );
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(group.form_type.as_str())
            .bind(group.section_type.as_str())
            .bind(group.service_id)
            .fetch_all(executor)
            .await
    }

    /// Active service-specific questions for any of `service_ids`.
    pub async fn list_active_for_services<'e, E: PgExecutor<'e>>(
        executor: E,
        service_ids: &[DbId],
    ) -> Result<Vec<FormQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_questions
             WHERE form_type = 'services' AND section_type = 'service_specific'
               AND service_id = ANY($1) AND is_active
             ORDER BY service_id, display_order, id"
        );
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(service_ids)
            .fetch_all(executor)
            .await
    }

    /// Lock a group and return its active `(id, order)` pairs in display
    /// order.
    ///
    /// A transaction-scoped advisory lock keyed on the group comes first:
    /// row locks alone cannot stop two creates from both reading the same
    /// maximum position, since neither sees the other's uncommitted row.
    pub async fn lock_group(
        conn: &mut PgConnection,
        group: &QuestionGroup,
    ) -> Result<Vec<(DbId, i32)>, sqlx::Error> {
        let key = format!(
            "form_questions:{}:{}:{}",
            group.form_type.as_str(),
            group.section_type.as_str(),
            group.service_id.map(|id| id.to_string()).unwrap_or_default()
        );
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(key)
            .execute(&mut *conn)
            .await?;

        let query = format!(
            "SELECT id, display_order FROM form_questions
             WHERE {GROUP_FILTER}
             ORDER BY display_order, id
             FOR UPDATE"
        );
        sqlx::query_as::<_, (DbId, i32)>(&query)
            .bind(group.form_type.as_str())
            .bind(group.section_type.as_str())
            .bind(group.service_id)
            .fetch_all(conn)
            .await
    }

    /// Insert a question at `display_order`, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        group: &QuestionGroup,
        input: &CreateFormQuestion,
        display_order: i32,
    ) -> Result<FormQuestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_questions
                (form_type, section_type, service_id, question_text, question_type,
                 required, placeholder, help_text, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(group.form_type.as_str())
            .bind(group.section_type.as_str())
            .bind(group.service_id)
            .bind(&input.question_text)
            .bind(input.question_type.as_str())
            .bind(input.required)
            .bind(&input.placeholder)
            .bind(&input.help_text)
            .bind(display_order)
            .fetch_one(conn)
            .await
    }

    /// Patch a question. Returns `None` if no row with `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateFormQuestion,
    ) -> Result<Option<FormQuestion>, sqlx::Error> {
        let query = format!(
            "UPDATE form_questions SET
                question_text = COALESCE($2, question_text),
                question_type = COALESCE($3, question_type),
                required = COALESCE($4, required),
                placeholder = COALESCE($5, placeholder),
                help_text = COALESCE($6, help_text)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormQuestion>(&query)
            .bind(id)
            .bind(&input.question_text)
            .bind(input.question_type.map(|t| t.as_str()))
            .bind(input.required)
            .bind(&input.placeholder)
            .bind(&input.help_text)
            .fetch_optional(conn)
            .await
    }

    /// Whether any stored answer snapshot refers to this question.
    pub async fn is_referenced<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE client_answers @> jsonb_build_array(jsonb_build_object('question_id', $1::BIGINT))
             )",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Take a question out of its group without deleting it.
    pub async fn deactivate(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE form_questions SET is_active = FALSE WHERE id = $1 AND is_active")
                .bind(id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently remove a question and its options.
    pub async fn hard_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_questions WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write new positions for active group members.
    ///
    /// The targets are first moved to their negated positions, which no
    /// active row can hold, so the final assignment never collides with a
    /// position that is still occupied. The caller must hold the group lock.
    pub async fn apply_order(
        conn: &mut PgConnection,
        plan: &[(DbId, i32)],
    ) -> Result<(), sqlx::Error> {
        if plan.is_empty() {
            return Ok(());
        }
        let (ids, orders): (Vec<DbId>, Vec<i32>) = plan.iter().copied().unzip();

        sqlx::query("UPDATE form_questions SET display_order = -display_order WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            "UPDATE form_questions AS q SET display_order = v.display_order
             FROM UNNEST($1::BIGINT[], $2::INT[]) AS v(id, display_order)
             WHERE q.id = v.id",
        )
        .bind(&ids)
        .bind(&orders)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
