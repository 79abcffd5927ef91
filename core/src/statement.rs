//! 构建完成的语句：SQL 文本 + 本次构建新增的命名参数

use serde::Serialize;

use crate::db_pool::DbDriver;
use crate::value::Value;

/// 构建结果
///
/// `bindings` 只包含本次构建产生的参数，调用方自行合并到自己的参数表
/// （见 [`Params::extend`](crate::params::Params::extend)）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub bindings: Vec<(String, Value)>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    pub fn with_bindings(sql: impl Into<String>, bindings: Vec<(String, Value)>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }

    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// 把 `:name` 形式的命名占位符转换成驱动的位置占位符
    ///
    /// 返回 (sql, 按出现顺序排列的值)。引号内的内容（字符串字面量、转义后的标识符）
    /// 不会被替换；未在 `bindings` 中登记的 `:name` 原样保留。
    pub fn to_positional(&self, driver: DbDriver) -> (String, Vec<Value>) {
        let chars: Vec<char> = self.sql.chars().collect();
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = Vec::new();
        let mut quote: Option<char> = None;
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];

            if let Some(q) = quote {
                sql.push(ch);
                if ch == '\\' && q == '\'' && driver == DbDriver::MySql {
                    // MySQL 字符串内的反斜杠转义
                    if let Some(&next) = chars.get(i + 1) {
                        sql.push(next);
                        i += 1;
                    }
                } else if ch == q {
                    if chars.get(i + 1) == Some(&q) {
                        sql.push(q);
                        i += 1;
                    } else {
                        quote = None;
                    }
                }
                i += 1;
                continue;
            }

            match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    sql.push(ch);
                    i += 1;
                }
                ':' if i > 0 && chars[i - 1] == ':' => {
                    // PostgreSQL 类型转换 `::type`
                    sql.push(ch);
                    i += 1;
                }
                ':' => {
                    let mut end = i + 1;
                    while end < chars.len() && (chars[end] == '_' || chars[end].is_ascii_alphanumeric()) {
                        end += 1;
                    }
                    let name: String = chars[i..end].iter().collect();
                    match self.binding(&name) {
                        Some(value) if end > i + 1 => {
                            sql.push_str(&driver.placeholder(values.len()));
                            values.push(value.clone());
                        }
                        _ => sql.push_str(&name),
                    }
                    i = end;
                }
                _ => {
                    sql.push(ch);
                    i += 1;
                }
            }
        }

        (sql, values)
    }
}
