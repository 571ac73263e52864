//! Repository for the `form_question_answers` table.

use mindak_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::form_question_answer::{
    CreateFormQuestionAnswer, FormQuestionAnswer, UpdateFormQuestionAnswer,
};

/// Column list for form_question_answers queries.
const COLUMNS: &str = "id, question_id, answer_text, answer_value, image_url, display_order, \
    is_active, created_at, updated_at";

/// Provides CRUD and ordering operations for answer options.
pub struct FormQuestionAnswerRepo;

impl FormQuestionAnswerRepo {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<FormQuestionAnswer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_question_answers WHERE id = $1");
        sqlx::query_as::<_, FormQuestionAnswer>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Options of one question in display order.
    pub async fn list_for_question(
        pool: &PgPool,
        question_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<FormQuestionAnswer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_question_answers
             WHERE question_id = $1 AND ($2 OR is_active)
             ORDER BY is_active DESC, display_order, id"
        );
        sqlx::query_as::<_, FormQuestionAnswer>(&query)
            .bind(question_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Options for any of `question_ids`, grouped by question, active ones
    /// first in display order.
    pub async fn list_for_questions<'e, E: PgExecutor<'e>>(
        executor: E,
        question_ids: &[DbId],
        include_inactive: bool,
    ) -> Result<Vec<FormQuestionAnswer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_question_answers
             WHERE question_id = ANY($1) AND ($2 OR is_active)
             ORDER BY question_id, is_active DESC, display_order, id"
        );
        sqlx::query_as::<_, FormQuestionAnswer>(&query)
            .bind(question_ids)
            .bind(include_inactive)
            .fetch_all(executor)
            .await
    }

    /// Lock the active options of a question, returning `(id, order)` pairs
    /// in display order.
    pub async fn lock_group(
        conn: &mut PgConnection,
        question_id: DbId,
    ) -> Result<Vec<(DbId, i32)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i32)>(
            "SELECT id, display_order FROM form_question_answers
             WHERE question_id = $1 AND is_active
             ORDER BY display_order, id
             FOR UPDATE",
        )
        .bind(question_id)
        .fetch_all(conn)
        .await
    }

    /// Insert an option at `display_order`, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        question_id: DbId,
        input: &CreateFormQuestionAnswer,
        display_order: i32,
    ) -> Result<FormQuestionAnswer, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_question_answers
                (question_id, answer_text, answer_value, display_order)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormQuestionAnswer>(&query)
            .bind(question_id)
            .bind(&input.answer_text)
            .bind(&input.answer_value)
            .bind(display_order)
            .fetch_one(conn)
            .await
    }

    /// Patch an option. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFormQuestionAnswer,
    ) -> Result<Option<FormQuestionAnswer>, sqlx::Error> {
        let query = format!(
            "UPDATE form_question_answers SET
                answer_text = COALESCE($2, answer_text),
                answer_value = COALESCE($3, answer_value)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormQuestionAnswer>(&query)
            .bind(id)
            .bind(&input.answer_text)
            .bind(&input.answer_value)
            .fetch_optional(pool)
            .await
    }

    /// Store the public reference of an uploaded image.
    pub async fn set_image_url(
        pool: &PgPool,
        id: DbId,
        image_url: &str,
    ) -> Result<Option<FormQuestionAnswer>, sqlx::Error> {
        let query = format!(
            "UPDATE form_question_answers SET image_url = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormQuestionAnswer>(&query)
            .bind(id)
            .bind(image_url)
            .fetch_optional(pool)
            .await
    }

    /// Whether any stored snapshot selected this option.
    pub async fn is_referenced<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE client_answers @> jsonb_build_array(jsonb_build_object(
                    'selections', jsonb_build_array(jsonb_build_object('answer_id', $1::BIGINT))
                ))
             )",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    pub async fn deactivate(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE form_question_answers SET is_active = FALSE WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn hard_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_question_answers WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write new positions for active options of one question. Same
    /// two-step scheme as [`super::FormQuestionRepo::apply_order`].
    pub async fn apply_order(
        conn: &mut PgConnection,
        plan: &[(DbId, i32)],
    ) -> Result<(), sqlx::Error> {
        if plan.is_empty() {
            return Ok(());
        }
        let (ids, orders): (Vec<DbId>, Vec<i32>) = plan.iter().copied().unzip();

        sqlx::query(
            "UPDATE form_question_answers SET display_order = -display_order WHERE id = ANY($1)",
        )
        .bind(&ids)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "UPDATE form_question_answers AS a SET display_order = v.display_order
             FROM UNNEST($1::BIGINT[], $2::INT[]) AS v(id, display_order)
             WHERE a.id = v.id",
        )
        .bind(&ids)
        .bind(&orders)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
