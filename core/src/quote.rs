//! 标识符与字面量转义
//!
//! 语句构建器本身不做任何注入防护，所有拼进 SQL 文本的表名、列名和字面量
//! 都经过这里的 [`Quoter`]。

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::db_pool::DbDriver;
use crate::value::{Value, DATETIME_FORMAT};

// `{{table}}`、`{{%table}}`、`[[column]]`
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{(%?[\w\-\. ]+%?)\}\}|\[\[([\w\-\. ]+)\]\]")
            .expect("invalid built-in quoting token regex")
    })
}

/// 标识符 / 字面量转义器
///
/// 只需要实现 `quote_char`、`quote_string`，其余方法都有默认实现：
///
/// * 表名包含 `(` 或 `{{` 时视为表达式，原样返回
/// * `schema.table` 会逐段转义
/// * 列名包含 `(`、`[[`、`{{` 或等于 `*` 时原样返回
/// * `t.c` 形式的列名会把前缀当作表名转义
///
/// 原样保留的 `{{...}}` / `[[...]]` 在执行前由 [`Quoter::quote_sql`] 展开。
pub trait Quoter {
    /// 标识符的引号字符：MySQL 为 `` ` ``，PostgreSQL/SQLite 为 `"`
    fn quote_char(&self) -> char;

    /// 把字符串转成带引号的字面量
    fn quote_string(&self, s: &str) -> String;

    /// 布尔字面量
    fn quote_bool(&self, b: bool) -> String {
        let s = if b { "1" } else { "0" };
        s.to_string()
    }

    /// 转义不带 schema 前缀的单个标识符
    fn quote_simple_name(&self, name: &str) -> String {
        let q = self.quote_char();
        if name.len() >= 2 && name.starts_with(q) && name.ends_with(q) {
            return name.to_string();
        }
        let doubled: String = [q, q].iter().collect();
        format!("{q}{}{q}", name.replace(q, &doubled))
    }

    fn quote_simple_table_name(&self, name: &str) -> String {
        self.quote_simple_name(name)
    }

    fn quote_simple_column_name(&self, name: &str) -> String {
        if name == "*" {
            return name.to_string();
        }
        self.quote_simple_name(name)
    }

    fn quote_table_name(&self, name: &str) -> String {
        if name.contains('(') || name.contains("{{") {
            return name.to_string();
        }
        if !name.contains('.') {
            return self.quote_simple_table_name(name);
        }
        name.split('.')
            .map(|part| self.quote_simple_table_name(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_column_name(&self, name: &str) -> String {
        if name.contains('(') || name.contains("[[") {
            return name.to_string();
        }
        let (prefix, name) = match name.rfind('.') {
            Some(pos) => (
                format!("{}.", self.quote_table_name(&name[..pos])),
                &name[pos + 1..],
            ),
            None => (String::new(), name),
        };
        if name.contains("{{") {
            return format!("{prefix}{name}");
        }
        format!("{prefix}{}", self.quote_simple_column_name(name))
    }

    /// LIKE 表达式后追加的 ESCAPE 子句
    ///
    /// 通配符统一用反斜杠转义，默认转义字符不是反斜杠的方言需要显式声明。
    fn like_escape_clause(&self) -> &'static str {
        ""
    }

    /// 展开 SQL 中的 `{{table}}`、`{{%table}}` 和 `[[column]]`
    ///
    /// 表名中的 `%` 替换为 `table_prefix`，然后按表名/列名规则转义。
    fn quote_sql(&self, sql: &str, table_prefix: &str) -> String {
        token_re()
            .replace_all(sql, |caps: &Captures| match (caps.get(1), caps.get(2)) {
                (Some(table), _) => self.quote_table_name(&table.as_str().replace('%', table_prefix)),
                (None, Some(column)) => self.quote_column_name(column.as_str()),
                (None, None) => caps[0].to_string(),
            })
            .into_owned()
    }

    /// 把值转成可以直接拼进 SQL 的字面量
    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => self.quote_string(s),
            Value::Int(i) => i.to_string(),
            // NaN / inf 没有对应的 SQL 字面量
            Value::Float(f) if !f.is_finite() => "NULL".to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => self.quote_bool(*b),
            Value::Decimal(d) => d.to_string(),
            Value::DateTime(dt) => self.quote_string(&dt.format(DATETIME_FORMAT).to_string()),
            Value::Null => "NULL".to_string(),
        }
    }
}

impl Quoter for DbDriver {
    fn quote_char(&self) -> char {
        match self {
            DbDriver::MySql => '`',
            DbDriver::Postgres | DbDriver::Sqlite => '"',
        }
    }

    fn quote_string(&self, s: &str) -> String {
        match self {
            // 与 mysql_real_escape_string 转义的字符集保持一致
            DbDriver::MySql => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for ch in s.chars() {
                    match ch {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\x1a' => out.push_str("\\Z"),
                        _ => out.push(ch),
                    }
                }
                out.push('\'');
                out
            }
            DbDriver::Postgres | DbDriver::Sqlite => format!("'{}'", s.replace('\'', "''")),
        }
    }

    fn quote_bool(&self, b: bool) -> String {
        match self {
            DbDriver::Postgres => if b { "TRUE" } else { "FALSE" }.to_string(),
            DbDriver::MySql | DbDriver::Sqlite => if b { "1" } else { "0" }.to_string(),
        }
    }

    fn like_escape_clause(&self) -> &'static str {
        match self {
            // SQLite 的 LIKE 没有默认转义字符
            DbDriver::Sqlite => " ESCAPE '\\'",
            DbDriver::MySql | DbDriver::Postgres => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_quote_table_name() {
        let q = DbDriver::MySql;
        assert_eq!(q.quote_table_name("widgets"), "`widgets`");
        assert_eq!(q.quote_table_name("craft.widgets"), "`craft`.`widgets`");
        assert_eq!(q.quote_table_name("`widgets`"), "`widgets`");
        assert_eq!(q.quote_table_name("{{%widgets}}"), "{{%widgets}}");
        assert_eq!(q.quote_table_name("(SELECT 1)"), "(SELECT 1)");
    }

    #[test]
    fn test_quote_embedded_quote_char() {
        assert_eq!(DbDriver::MySql.quote_table_name("we`ird"), "`we``ird`");
        assert_eq!(DbDriver::Postgres.quote_column_name("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_column_name() {
        let q = DbDriver::MySql;
        assert_eq!(q.quote_column_name("status"), "`status`");
        assert_eq!(q.quote_column_name("a.status"), "`a`.`status`");
        assert_eq!(q.quote_column_name("*"), "*");
        assert_eq!(q.quote_column_name("t.*"), "`t`.*");
        assert_eq!(q.quote_column_name("COUNT(id)"), "COUNT(id)");
        assert_eq!(q.quote_column_name("[[status]]"), "[[status]]");
    }

    #[test]
    fn test_postgres_and_sqlite_quote_identifiers() {
        assert_eq!(DbDriver::Postgres.quote_table_name("public.users"), "\"public\".\"users\"");
        assert_eq!(DbDriver::Sqlite.quote_column_name("name"), "\"name\"");
    }

    #[test]
    fn test_mysql_quote_value() {
        let q = DbDriver::MySql;
        assert_eq!(q.quote_value(&Value::from("b")), "'b'");
        assert_eq!(q.quote_value(&Value::from("it's")), "'it\\'s'");
        assert_eq!(q.quote_value(&Value::from("a\\b")), "'a\\\\b'");
        assert_eq!(q.quote_value(&Value::from("line\nbreak")), "'line\\nbreak'");
        assert_eq!(q.quote_value(&Value::Int(42)), "42");
        assert_eq!(q.quote_value(&Value::Bool(true)), "1");
        assert_eq!(q.quote_value(&Value::Null), "NULL");
    }

    #[test]
    fn test_postgres_quote_value() {
        let q = DbDriver::Postgres;
        assert_eq!(q.quote_value(&Value::from("it's")), "'it''s'");
        assert_eq!(q.quote_value(&Value::Bool(false)), "FALSE");
    }

    #[test]
    fn test_quote_non_finite_float_as_null() {
        let q = DbDriver::MySql;
        assert_eq!(q.quote_value(&Value::Float(1.5)), "1.5");
        assert_eq!(q.quote_value(&Value::Float(f64::NAN)), "NULL");
        assert_eq!(q.quote_value(&Value::Float(f64::INFINITY)), "NULL");
        assert_eq!(q.quote_value(&Value::Float(f64::NEG_INFINITY)), "NULL");
    }

    #[test]
    fn test_quote_sql_expands_tokens() {
        let sql = "DROP TABLE IF EXISTS {{%widgets}}";
        assert_eq!(DbDriver::MySql.quote_sql(sql, "craft_"), "DROP TABLE IF EXISTS `craft_widgets`");
        assert_eq!(DbDriver::Sqlite.quote_sql(sql, ""), "DROP TABLE IF EXISTS \"widgets\"");

        let sql = "SELECT [[w.status]], [[title]] FROM {{widgets}} w WHERE a = '{x}'";
        assert_eq!(
            DbDriver::Postgres.quote_sql(sql, "craft_"),
            "SELECT \"w\".\"status\", \"title\" FROM \"widgets\" w WHERE a = '{x}'"
        );
    }
}
