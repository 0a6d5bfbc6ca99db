// src/common/db_utils.rs

use sqlx::postgres::PgQueryResult;

use crate::common::error::AppError;

// ---
// Helpers de erro do Postgres
// ---

/// Converte violação de chave estrangeira num erro amigável.
/// Qualquer outro erro do sqlx vira `AppError::DatabaseError`.
pub(crate) fn map_reference_error(e: sqlx::Error, reference: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidReference(reference.to_string());
        }
    }
    e.into()
}

/// UPDATE/DELETE que não afetou nenhuma linha significa id inexistente.
pub(crate) fn ensure_affected(result: PgQueryResult) -> Result<(), AppError> {
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
