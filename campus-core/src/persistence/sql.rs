//! Translation of [`FilterCondition`]s into SQL
//!
//! Conditions are AND-ed into a `WHERE` clause with every value bound as a
//! parameter. Text operators are case-sensitive, matching `=`.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::repository::{
    FilterCondition, FilterOperator, FilterValue, Pagination, RepositoryError,
    RepositoryErrorKind, RepositoryOperation, RepositoryResult,
};

/// Append `WHERE ... AND ...` for `filters`; nothing when there are none
pub(crate) fn push_where(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filters: &[FilterCondition],
) -> RepositoryResult<()> {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(builder, filter)?;
    }
    Ok(())
}

fn push_condition(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filter: &FilterCondition,
) -> RepositoryResult<()> {
    use FilterOperator as Op;

    let column = column(filter)?;
    match (filter.operator, &filter.value) {
        (Op::IsNull, _) => {
            builder.push(column).push(" IS NULL");
        }
        (Op::IsNotNull, _) => {
            builder.push(column).push(" IS NOT NULL");
        }
        (Op::In, FilterValue::StringList(values)) if values.is_empty() => {
            builder.push("0 = 1");
        }
        (Op::In, FilterValue::StringList(values)) => {
            builder.push(column).push(" IN (");
            let mut list = builder.separated(", ");
            for value in values {
                list.push_bind(value.clone());
            }
            list.push_unseparated(")");
        }
        (Op::Contains, FilterValue::String(needle)) => {
            builder
                .push("instr(")
                .push(column)
                .push(", ")
                .push_bind(needle.clone())
                .push(") > 0");
        }
        (Op::StartsWith, FilterValue::String(prefix)) => {
            builder
                .push("instr(")
                .push(column)
                .push(", ")
                .push_bind(prefix.clone())
                .push(") = 1");
        }
        (Op::EndsWith, FilterValue::String(suffix)) => {
            builder
                .push("substr(")
                .push(column)
                .push(", length(")
                .push(column)
                .push(") - length(")
                .push_bind(suffix.clone())
                .push(") + 1) = ")
                .push_bind(suffix.clone());
        }
        (op, value) => match (comparison(op), value) {
            // A comparison with NULL never holds
            (Some(_), FilterValue::Null) => {
                builder.push("0 = 1");
            }
            (Some(sql), FilterValue::String(value)) => {
                builder.push(column).push(sql).push_bind(value.clone());
            }
            (Some(sql), FilterValue::Integer(value)) => {
                builder.push(column).push(sql).push_bind(*value);
            }
            _ => {
                return Err(RepositoryError::new(
                    RepositoryOperation::Query,
                    RepositoryErrorKind::Other,
                    format!("unsupported filter: {filter}"),
                ))
            }
        },
    }
    Ok(())
}

fn comparison(operator: FilterOperator) -> Option<&'static str> {
    match operator {
        FilterOperator::Equal => Some(" = "),
        FilterOperator::NotEqual => Some(" <> "),
        FilterOperator::GreaterThan => Some(" > "),
        FilterOperator::GreaterThanOrEqual => Some(" >= "),
        FilterOperator::LessThan => Some(" < "),
        FilterOperator::LessThanOrEqual => Some(" <= "),
        _ => None,
    }
}

/// Field names are spliced into SQL, so only plain identifiers pass
fn column(filter: &FilterCondition) -> RepositoryResult<&str> {
    let field = filter.field.as_str();
    let plain = field.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Ok(field)
    } else {
        Err(RepositoryError::new(
            RepositoryOperation::Query,
            RepositoryErrorKind::Other,
            format!("not a column name: {field:?}"),
        ))
    }
}

/// Count the matches, then fetch one window of them in primary-key order
///
/// Both statements run on `conn`; pass a transaction so the total and the
/// rows describe the same snapshot.
pub(crate) async fn select_page<R>(
    conn: &mut SqliteConnection,
    table: &str,
    columns: &str,
    filters: &[FilterCondition],
    window: Pagination,
) -> RepositoryResult<(u64, Vec<R>)>
where
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut count = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {table}"));
    push_where(&mut count, filters)?;
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {columns} FROM {table}"));
    push_where(&mut select, filters)?;
    select
        .push(" ORDER BY id LIMIT ")
        .push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
    let rows = select.build_query_as::<R>().fetch_all(&mut *conn).await?;

    Ok((u64::try_from(total).unwrap_or_default(), rows))
}
