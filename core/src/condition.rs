//! WHERE 条件构建与编译
//!
//! 条件只描述结构，值在编译时才绑定到 [`Params`]，占位符名称由参数表生成。

use crate::params::Params;
use crate::quote::Quoter;
use crate::value::Value;

/// 条件类型：AND 或 OR
#[derive(Debug, Clone, Copy, PartialEq)]
enum ConditionType {
    And,
    Or,
}

/// SQL 操作符
#[derive(Debug, Clone, PartialEq)]
enum Operator {
    /// 等于: =
    Eq(Value),
    /// 不等于: !=
    Ne(Value),
    /// 大于: >
    Gt(Value),
    /// 大于等于: >=
    Ge(Value),
    /// 小于: <
    Lt(Value),
    /// 小于等于: <=
    Le(Value),
    /// LIKE 匹配，值已包含通配符
    Like(String),
    NotLike(String),
    IsNull,
    IsNotNull,
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Between(Value, Value),
}

impl Operator {
    fn to_sql(&self, column: &str, quoter: &dyn Quoter, params: &mut Params) -> String {
        let binary = |op: &str, value: &Value, params: &mut Params| {
            format!("{} {} {}", column, op, params.bind(value.clone()))
        };
        match self {
            Operator::Eq(v) => binary("=", v, params),
            Operator::Ne(v) => binary("!=", v, params),
            Operator::Gt(v) => binary(">", v, params),
            Operator::Ge(v) => binary(">=", v, params),
            Operator::Lt(v) => binary("<", v, params),
            Operator::Le(v) => binary("<=", v, params),
            Operator::Like(p) => format!(
                "{} LIKE {}{}",
                column,
                params.bind(p.as_str()),
                quoter.like_escape_clause()
            ),
            Operator::NotLike(p) => format!(
                "{} NOT LIKE {}{}",
                column,
                params.bind(p.as_str()),
                quoter.like_escape_clause()
            ),
            Operator::IsNull => format!("{} IS NULL", column),
            Operator::IsNotNull => format!("{} IS NOT NULL", column),
            // 空集合：IN 永假，NOT IN 永真
            Operator::In(values) if values.is_empty() => "0=1".to_string(),
            Operator::NotIn(values) if values.is_empty() => "1=1".to_string(),
            Operator::In(values) | Operator::NotIn(values) => {
                let placeholders: Vec<String> =
                    values.iter().map(|v| params.bind(v.clone())).collect();
                let keyword = if matches!(self, Operator::In(_)) {
                    "IN"
                } else {
                    "NOT IN"
                };
                format!("{} {} ({})", column, keyword, placeholders.join(", "))
            }
            Operator::Between(a, b) => {
                let a = params.bind(a.clone());
                let b = params.bind(b.clone());
                format!("{} BETWEEN {} AND {}", column, a, b)
            }
        }
    }
}

/// 条件项：单个条件、原始 SQL 片段或条件组
#[derive(Debug, Clone)]
enum ConditionItem {
    Single(String, Operator, ConditionType),
    /// 原始表达式及其自带的命名参数
    Raw(String, Vec<(String, Value)>, ConditionType),
    Group(Box<Condition>, ConditionType),
}

impl ConditionItem {
    fn condition_type(&self) -> ConditionType {
        match self {
            ConditionItem::Single(_, _, ct)
            | ConditionItem::Raw(_, _, ct)
            | ConditionItem::Group(_, ct) => *ct,
        }
    }
}

/// WHERE 条件
#[derive(Debug, Clone, Default)]
pub struct Condition {
    items: Vec<ConditionItem>,
}

macro_rules! comparison_methods {
    ($($and:ident, $or:ident => $op:ident;)*) => {
        $(
            pub fn $and(self, column: &str, value: impl Into<Value>) -> Self {
                self.push_single(column, Operator::$op(value.into()), ConditionType::And)
            }

            pub fn $or(self, column: &str, value: impl Into<Value>) -> Self {
                self.push_single(column, Operator::$op(value.into()), ConditionType::Or)
            }
        )*
    };
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以原始表达式开始一个条件，例如 `Condition::raw("dateDeleted IS NULL")`
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new().and_raw(sql, Vec::<(String, Value)>::new())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push_single(mut self, column: &str, op: Operator, ct: ConditionType) -> Self {
        self.items
            .push(ConditionItem::Single(column.to_string(), op, ct));
        self
    }

    comparison_methods! {
        and_eq, or_eq => Eq;
        and_ne, or_ne => Ne;
        and_gt, or_gt => Gt;
        and_ge, or_ge => Ge;
        and_lt, or_lt => Lt;
        and_le, or_le => Le;
    }

    /// LIKE '%value%'，值中的 `%`、`_`、`\` 会被转义
    pub fn and_like(self, column: &str, value: &str) -> Self {
        let pattern = format!("%{}%", escape_like(value));
        self.push_single(column, Operator::Like(pattern), ConditionType::And)
    }

    pub fn or_like(self, column: &str, value: &str) -> Self {
        let pattern = format!("%{}%", escape_like(value));
        self.push_single(column, Operator::Like(pattern), ConditionType::Or)
    }

    /// LIKE 'value%'
    pub fn and_like_prefix(self, column: &str, value: &str) -> Self {
        let pattern = format!("{}%", escape_like(value));
        self.push_single(column, Operator::Like(pattern), ConditionType::And)
    }

    pub fn and_not_like(self, column: &str, value: &str) -> Self {
        let pattern = format!("%{}%", escape_like(value));
        self.push_single(column, Operator::NotLike(pattern), ConditionType::And)
    }

    pub fn and_is_null(self, column: &str) -> Self {
        self.push_single(column, Operator::IsNull, ConditionType::And)
    }

    pub fn and_is_not_null(self, column: &str) -> Self {
        self.push_single(column, Operator::IsNotNull, ConditionType::And)
    }

    pub fn or_is_null(self, column: &str) -> Self {
        self.push_single(column, Operator::IsNull, ConditionType::Or)
    }

    pub fn and_in<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push_single(column, Operator::In(values), ConditionType::And)
    }

    pub fn or_in<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push_single(column, Operator::In(values), ConditionType::Or)
    }

    pub fn and_not_in<V: Into<Value>>(
        self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push_single(column, Operator::NotIn(values), ConditionType::And)
    }

    pub fn and_between(self, column: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.push_single(
            column,
            Operator::Between(from.into(), to.into()),
            ConditionType::And,
        )
    }

    /// 原始 SQL 片段，`params` 中的名称原样写入参数表（缺少 `:` 时自动补上）
    pub fn and_raw<N, V>(mut self, sql: impl Into<String>, params: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let params = params
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .collect();
        self.items
            .push(ConditionItem::Raw(sql.into(), params, ConditionType::And));
        self
    }

    pub fn or_raw(mut self, sql: impl Into<String>) -> Self {
        self.items
            .push(ConditionItem::Raw(sql.into(), Vec::new(), ConditionType::Or));
        self
    }

    /// AND 条件组：`... AND (a OR b)`
    pub fn and_group<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Condition) -> Condition,
    {
        let group = f(Condition::new());
        if !group.is_empty() {
            self.items
                .push(ConditionItem::Group(Box::new(group), ConditionType::And));
        }
        self
    }

    /// OR 条件组：`... OR (a AND b)`
    pub fn or_group<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Condition) -> Condition,
    {
        let group = f(Condition::new());
        if !group.is_empty() {
            self.items
                .push(ConditionItem::Group(Box::new(group), ConditionType::Or));
        }
        self
    }

    /// 编译为布尔表达式（不含 WHERE），空条件返回空字符串
    pub fn build(&self, quoter: &dyn Quoter, params: &mut Params) -> String {
        let mut sql = String::new();

        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                match item.condition_type() {
                    ConditionType::Or => sql.push_str(" OR "),
                    ConditionType::And => sql.push_str(" AND "),
                }
            }

            match item {
                ConditionItem::Single(column, op, _) => {
                    let column = quoter.quote_column_name(column);
                    sql.push_str(&op.to_sql(&column, quoter, params));
                }
                ConditionItem::Raw(raw, raw_params, _) => {
                    sql.push_str(raw);
                    for (name, value) in raw_params {
                        params.insert(name, value.clone());
                    }
                }
                ConditionItem::Group(group, _) => {
                    sql.push('(');
                    sql.push_str(&group.build(quoter, params));
                    sql.push(')');
                }
            }
        }

        sql
    }

    /// 编译为 `WHERE ...`，空条件返回空字符串
    pub fn build_where(&self, quoter: &dyn Quoter, params: &mut Params) -> String {
        let sql = self.build(quoter, params);
        if sql.is_empty() {
            sql
        } else {
            format!("WHERE {}", sql)
        }
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_pool::DbDriver;

    fn normalize(sql: &str) -> String {
        sql.replace('`', "").replace('"', "")
    }

    fn build(condition: &Condition) -> (String, Params) {
        let mut params = Params::new();
        let sql = condition.build_where(&DbDriver::MySql, &mut params);
        (sql, params)
    }

    #[test]
    fn test_empty_condition() {
        let (sql, params) = build(&Condition::new());
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_and_eq() {
        let (sql, params) = build(&Condition::new().and_eq("id", 1).and_eq("name", "test"));
        assert_eq!(sql, "WHERE `id` = :qp0 AND `name` = :qp1");
        assert_eq!(params.get(":qp0"), Some(&Value::Int(1)));
        assert_eq!(params.get(":qp1"), Some(&Value::from("test")));
    }

    #[test]
    fn test_comparisons_and_or() {
        let condition = Condition::new()
            .and_gt("age", 18)
            .and_le("score", 100)
            .or_ne("status", 0);
        let (sql, _) = build(&condition);
        assert_eq!(
            normalize(&sql),
            "WHERE age > :qp0 AND score <= :qp1 OR status != :qp2"
        );
    }

    #[test]
    fn test_like_escapes_wildcards() {
        let (sql, params) = build(&Condition::new().and_like("title", "50%_off"));
        assert_eq!(normalize(&sql), "WHERE title LIKE :qp0");
        assert_eq!(params.get(":qp0"), Some(&Value::from("%50\\%\\_off%")));
    }

    #[test]
    fn test_sqlite_like_declares_escape_char() {
        let mut params = Params::new();
        let condition = Condition::new()
            .and_like("title", "50%_off")
            .and_not_like("title", "draft");
        let sql = condition.build_where(&DbDriver::Sqlite, &mut params);
        assert_eq!(
            sql,
            "WHERE \"title\" LIKE :qp0 ESCAPE '\\' AND \"title\" NOT LIKE :qp1 ESCAPE '\\'"
        );

        // PostgreSQL 默认转义字符就是反斜杠
        let mut params = Params::new();
        let sql = Condition::new()
            .and_like("title", "x")
            .build_where(&DbDriver::Postgres, &mut params);
        assert_eq!(sql, "WHERE \"title\" LIKE :qp0");
    }

    #[test]
    fn test_in_and_empty_in() {
        let (sql, params) = build(&Condition::new().and_in("id", vec![1, 2, 3]));
        assert_eq!(normalize(&sql), "WHERE id IN (:qp0, :qp1, :qp2)");
        assert_eq!(params.len(), 3);

        let (sql, params) = build(&Condition::new().and_in("id", Vec::<i64>::new()));
        assert_eq!(sql, "WHERE 0=1");
        assert!(params.is_empty());

        let (sql, _) = build(&Condition::new().and_not_in("id", Vec::<i64>::new()));
        assert_eq!(sql, "WHERE 1=1");
    }

    #[test]
    fn test_null_and_between() {
        let condition = Condition::new()
            .and_is_null("dateDeleted")
            .and_between("score", 1, 10);
        let (sql, _) = build(&condition);
        assert_eq!(
            normalize(&sql),
            "WHERE dateDeleted IS NULL AND score BETWEEN :qp0 AND :qp1"
        );
    }

    #[test]
    fn test_groups() {
        let condition = Condition::new()
            .and_eq("status", "live")
            .and_group(|g| g.or_eq("type", "a").or_eq("type", "b"));
        let (sql, _) = build(&condition);
        assert_eq!(
            normalize(&sql),
            "WHERE status = :qp0 AND (type = :qp1 OR type = :qp2)"
        );
    }

    #[test]
    fn test_empty_group_is_skipped() {
        let condition = Condition::new().and_eq("id", 1).and_group(|g| g);
        let (sql, _) = build(&condition);
        assert_eq!(normalize(&sql), "WHERE id = :qp0");
    }

    #[test]
    fn test_raw_with_named_params() {
        let condition = Condition::raw("[[siteId]] = :siteId").and_raw(
            "uri LIKE :uri",
            vec![("uri", "blog/%")],
        );
        let mut params = Params::new();
        let sql = condition.build(&DbDriver::MySql, &mut params);
        assert_eq!(sql, "[[siteId]] = :siteId AND uri LIKE :uri");
        assert_eq!(params.get(":uri"), Some(&Value::from("blog/%")));
    }

    #[test]
    fn test_numbering_continues_from_existing_params() {
        let mut params = Params::new();
        params.bind("existing");
        let sql = Condition::new()
            .and_eq("id", 9)
            .build(&DbDriver::Postgres, &mut params);
        assert_eq!(sql, "\"id\" = :qp1");
    }
}
