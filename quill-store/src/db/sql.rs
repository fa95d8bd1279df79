//! Statement builders
//!
//! Pure functions from a table description to SQL text. Placeholders use the
//! numbered `$N` form understood by both PostgreSQL and SQLite.

/// `INSERT INTO t (a, b) VALUES ($1, $2) RETURNING id`
pub(crate) fn insert_returning_id(table: &str, columns: &[&str]) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING id",
        columns.join(", "),
        placeholders(1, columns.len()),
    )
}

/// `UPDATE t SET a = $1, b = $2 WHERE id = $3`
pub(crate) fn update_by_id(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {assignments} WHERE id = ${}", columns.len() + 1)
}

/// `DELETE FROM t WHERE id = $1`
pub(crate) fn delete_by_id(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = $1")
}

/// `SELECT COUNT(*) FROM t`
pub(crate) fn count(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// Extend a base `SELECT ... FROM ...` with an optional join, equality
/// filters on `$1..$n` joined by `AND` and an ordering by the record id.
pub(crate) fn select_where(
    base: &str,
    join: Option<&str>,
    filters: &[&str],
    order_by: &str,
) -> String {
    let mut sql = String::from(base);
    if let Some(join) = join {
        sql.push(' ');
        sql.push_str(join);
    }
    if !filters.is_empty() {
        let conditions = filters
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(" AND ");
        sql.push_str(&format!(" WHERE {conditions}"));
    }
    sql.push_str(&format!(" ORDER BY {order_by}"));
    sql
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_returning_id() {
        assert_eq!(
            insert_returning_id("label", &["name"]),
            "INSERT INTO label (name) VALUES ($1) RETURNING id"
        );
        assert_eq!(
            insert_returning_id("author", &["user_id", "twitter"]),
            "INSERT INTO author (user_id, twitter) VALUES ($1, $2) RETURNING id"
        );
    }

    #[test]
    fn test_update_binds_id_last() {
        assert_eq!(
            update_by_id("post", &["title", "content"]),
            "UPDATE post SET title = $1, content = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_select_where() {
        let base = "SELECT l.id AS id, l.name AS name FROM label l";
        assert_eq!(select_where(base, None, &[], "l.id"), format!("{base} ORDER BY l.id"));
        assert_eq!(
            select_where(
                base,
                Some("JOIN post_label pl ON pl.label_id = l.id"),
                &["pl.post_id"],
                "l.id"
            ),
            format!("{base} JOIN post_label pl ON pl.label_id = l.id WHERE pl.post_id = $1 ORDER BY l.id")
        );
    }

    #[test]
    fn test_select_where_combines_filters() {
        assert_eq!(
            select_where("SELECT u.id FROM blog_user u", None, &["u.oauth_provider", "u.oauth_id"], "u.id"),
            "SELECT u.id FROM blog_user u WHERE u.oauth_provider = $1 AND u.oauth_id = $2 ORDER BY u.id"
        );
    }

    #[test]
    fn test_delete_and_count() {
        assert_eq!(delete_by_id("comment"), "DELETE FROM comment WHERE id = $1");
        assert_eq!(count("blog_user"), "SELECT COUNT(*) FROM blog_user");
    }
}
