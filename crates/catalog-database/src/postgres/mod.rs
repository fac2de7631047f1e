//! PostgreSQL store provider.
//!
//! Products keep their variants as a JSONB array; list filters that look
//! inside variants use `jsonb_array_elements`.

pub mod category;
pub mod collection;
pub mod product;
pub mod user;

pub use category::PgCategoryRepository;
pub use collection::PgCollectionRepository;
pub use product::PgProductRepository;
pub use user::PgUserRepository;

use catalog_core::AppError;
use catalog_core::error::ErrorKind;

/// Map a sqlx error, turning a violation of `constraint` into a conflict.
pub(crate) fn map_unique(
    err: sqlx::Error,
    constraint: &str,
    conflict_message: &str,
    context: &str,
) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(constraint) => {
            AppError::conflict(conflict_message)
        }
        other => AppError::with_source(ErrorKind::Database, context, other),
    }
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("shirt"), "shirt");
    }
}
