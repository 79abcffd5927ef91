//! MySQL 语句构建器
//!
//! 在通用构建器的基础上：
//! - 建表选项自动补全 `ENGINE = InnoDb`、默认字符集和排序规则
//! - `binary` 列映射为 `longblob`
//! - 不支持重命名序列
//! - `FIELD()` 实现固定顺序排序
//! - 自连接删除重复行

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use super::column::{Column, ColumnType};
use super::generic::GenericCompiler;
use super::QueryCompiler;
use crate::condition::Condition;
use crate::config::DbConfig;
use crate::db_pool::DbDriver;
use crate::error::{Result, SqlxStmtError};
use crate::params::Params;
use crate::quote::Quoter;
use crate::statement::Statement;
use crate::value::Value;

/// 默认存储引擎
pub const DEFAULT_ENGINE: &str = "InnoDb";

// 关键字检测只做整词匹配，不解析注释和字符串字面量
fn engine_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bENGINE\b").expect("invalid built-in ENGINE regex"))
}

fn charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bCHARACTER +SET\b").expect("invalid built-in CHARACTER SET regex")
    })
}

fn collate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bCOLLATE\b").expect("invalid built-in COLLATE regex"))
}

#[derive(Debug, Clone)]
pub struct MySqlCompiler {
    base: GenericCompiler,
    config: DbConfig,
}

impl Default for MySqlCompiler {
    fn default() -> Self {
        Self::new(DbConfig::default())
    }
}

impl MySqlCompiler {
    pub fn new(config: DbConfig) -> Self {
        let base = GenericCompiler::new(DbDriver::MySql)
            .with_param_prefix(config.param_prefix.as_str());
        let mut types = base.type_map().clone();
        // binary 列使用 LONGBLOB 而不是 BLOB
        types.binary = "longblob".to_string();

        Self {
            base: base.with_type_map(types),
            config,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// 补全建表选项
    ///
    /// 依次检查 ENGINE、CHARACTER SET、COLLATE，缺少的才追加，以空格分隔。
    /// 空白的 `options` 等同于 None。
    pub fn normalize_table_options(&self, options: Option<&str>) -> String {
        let mut options = match options.map(str::trim).filter(|o| !o.is_empty()) {
            Some(o) if engine_re().is_match(o) => o.to_string(),
            Some(o) => format!("{} ENGINE = {}", o, DEFAULT_ENGINE),
            None => format!("ENGINE = {}", DEFAULT_ENGINE),
        };

        if !charset_re().is_match(&options) {
            options.push_str(&format!(" DEFAULT CHARACTER SET = {}", self.config.charset));
        }
        if let Some(collation) = &self.config.collation {
            if !collate_re().is_match(&options) {
                options.push_str(&format!(" DEFAULT COLLATE = {}", collation));
            }
        }
        options
    }
}

impl QueryCompiler for MySqlCompiler {
    fn driver(&self) -> DbDriver {
        DbDriver::MySql
    }

    fn quoter(&self) -> &dyn Quoter {
        self.base.quoter()
    }

    fn column_type(&self, ty: &ColumnType) -> String {
        self.base.column_type(ty)
    }

    fn create_table(&self, table: &str, columns: &[Column], options: Option<&str>) -> String {
        let options = self.normalize_table_options(options);
        let sql = self.base.create_table(table, columns, Some(&options));
        debug!(table, sql = %sql, "built create table statement");
        sql
    }

    fn drop_table(&self, table: &str) -> String {
        self.base.drop_table(table)
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", DbDriver::MySql.quote_table_name(table))
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            DbDriver::MySql.quote_table_name(old_name),
            DbDriver::MySql.quote_table_name(new_name)
        )
    }

    fn truncate_table(&self, table: &str) -> String {
        self.base.truncate_table(table)
    }

    fn rename_sequence(&self, old_name: &str, new_name: &str) -> Result<String> {
        warn!(old_name, new_name, "mysql has no sequence objects, refusing to rename");
        Err(SqlxStmtError::unsupported(DbDriver::MySql, "renaming sequences"))
    }

    fn replace(
        &self,
        table: &str,
        column: &str,
        find: &str,
        replace: &str,
        condition: Option<&Condition>,
        params: &Params,
    ) -> Statement {
        self.base
            .replace(table, column, find, replace, condition, params)
    }

    fn fixed_order(&self, column: &str, values: &[Value]) -> String {
        let mut sql = format!("FIELD({}", DbDriver::MySql.quote_column_name(column));
        for value in values {
            sql.push(',');
            sql.push_str(&DbDriver::MySql.quote_value(value));
        }
        sql.push(')');
        sql
    }

    fn delete_duplicates(&self, table: &str, columns: &[&str], pk: &str) -> String {
        let q = DbDriver::MySql;
        let table = q.quote_table_name(table);
        let pk = q.quote_column_name(pk);
        let a = q.quote_column_name("a");
        let b = q.quote_column_name("b");

        let mut sql = format!(
            "DELETE {a} FROM {table} {a} INNER JOIN {table} {b} WHERE {a}.{pk} > {b}.{pk}"
        );
        for column in columns {
            let column = q.quote_column_name(column);
            sql.push_str(&format!(" AND {a}.{column} = {b}.{column}"));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(sql: &str) -> String {
        sql.replace('`', "")
    }

    fn compiler() -> MySqlCompiler {
        MySqlCompiler::default()
    }

    fn with_collation() -> MySqlCompiler {
        MySqlCompiler::new(
            DbConfig::default()
                .with_charset("utf8mb4")
                .with_collation("utf8mb4_0900_ai_ci"),
        )
    }

    // ========== 建表选项 ==========
    #[test]
    fn test_options_default() {
        assert_eq!(
            compiler().normalize_table_options(None),
            "ENGINE = InnoDb DEFAULT CHARACTER SET = utf8"
        );
        assert_eq!(
            with_collation().normalize_table_options(None),
            "ENGINE = InnoDb DEFAULT CHARACTER SET = utf8mb4 DEFAULT COLLATE = utf8mb4_0900_ai_ci"
        );
    }

    #[test]
    fn test_options_existing_engine_any_case() {
        let options = compiler().normalize_table_options(Some("engine=MyISAM"));
        assert_eq!(options, "engine=MyISAM DEFAULT CHARACTER SET = utf8");
        assert_eq!(options.to_uppercase().matches("ENGINE").count(), 1);
    }

    #[test]
    fn test_options_appends_engine_after_caller_text() {
        assert_eq!(
            compiler().normalize_table_options(Some("COMMENT = 'widgets'")),
            "COMMENT = 'widgets' ENGINE = InnoDb DEFAULT CHARACTER SET = utf8"
        );
    }

    #[test]
    fn test_options_existing_charset_and_collate() {
        let options = with_collation()
            .normalize_table_options(Some("ENGINE=InnoDB CHARACTER  SET latin1 COLLATE latin1_bin"));
        assert_eq!(options, "ENGINE=InnoDB CHARACTER  SET latin1 COLLATE latin1_bin");
    }

    #[test]
    fn test_options_keyword_must_be_whole_word() {
        // ENGINES 不算 ENGINE
        let options = compiler().normalize_table_options(Some("COMMENT = 'ENGINES'"));
        assert!(options.contains("ENGINE = InnoDb"));
    }

    #[test]
    fn test_options_blank_is_none() {
        assert_eq!(
            compiler().normalize_table_options(Some("   ")),
            compiler().normalize_table_options(None)
        );
    }

    #[test]
    fn test_create_table() {
        let sql = compiler().create_table(
            "widgets",
            &[
                Column::new("id", ColumnType::Pk),
                Column::new("data", ColumnType::Binary),
            ],
            None,
        );
        assert_eq!(
            sql,
            "CREATE TABLE `widgets` (\n\t`id` int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY,\n\t`data` longblob\n) ENGINE = InnoDb DEFAULT CHARACTER SET = utf8"
        );
    }

    // ========== 序列 ==========
    #[test]
    fn test_rename_sequence_unsupported() {
        let err = compiler().rename_sequence("old_seq", "new_seq").unwrap_err();
        assert!(matches!(
            err,
            SqlxStmtError::UnsupportedOperation {
                driver: DbDriver::MySql,
                ..
            }
        ));
        assert_eq!(err.to_string(), "mysql does not support renaming sequences.");
    }

    // ========== DROP / RENAME ==========
    #[test]
    fn test_drop_table_if_exists_is_stable() {
        let c = compiler();
        let first = c.drop_table_if_exists("widgets");
        assert_eq!(first, "DROP TABLE IF EXISTS `widgets`");
        assert_eq!(first, c.drop_table_if_exists("widgets"));
    }

    #[test]
    fn test_rename_table() {
        assert_eq!(compiler().rename_table("a", "b"), "RENAME TABLE `a` TO `b`");
    }

    // ========== REPLACE ==========
    #[test]
    fn test_replace_without_condition() {
        let params = Params::new();
        let stmt = compiler().replace("t", "c", "foo", "bar", None, &params);
        assert_eq!(stmt.sql, "UPDATE t SET `c` = REPLACE(`c`, :qp0, :qp1)");
        assert_eq!(
            stmt.bindings,
            vec![
                (":qp0".to_string(), Value::from("foo")),
                (":qp1".to_string(), Value::from("bar")),
            ]
        );
    }

    #[test]
    fn test_replace_with_condition_and_custom_prefix() {
        let c = MySqlCompiler::new(DbConfig::default().with_param_prefix(":p"));
        let condition = Condition::new().and_in("id", vec![1, 2]);
        let stmt = c.replace("`entries`", "uri", "old", "new", Some(&condition), &Params::new());
        assert_eq!(
            stmt.sql,
            "UPDATE `entries` SET `uri` = REPLACE(`uri`, :p0, :p1) WHERE `id` IN (:p2, :p3)"
        );
        assert_eq!(stmt.bindings.len(), 4);
    }

    #[test]
    fn test_replace_empty_condition_has_no_where() {
        let stmt = compiler().replace("t", "c", "a", "b", Some(&Condition::new()), &Params::new());
        assert!(!stmt.sql.contains("WHERE"));
    }

    // ========== FIELD ==========
    #[test]
    fn test_fixed_order_preserves_input_order() {
        let values = vec![Value::from("b"), Value::from("a"), Value::from("c")];
        assert_eq!(
            compiler().fixed_order("status", &values),
            "FIELD(`status`,'b','a','c')"
        );
    }

    #[test]
    fn test_fixed_order_empty_and_numbers() {
        assert_eq!(compiler().fixed_order("status", &[]), "FIELD(`status`)");
        assert_eq!(
            compiler().fixed_order("id", &[Value::Int(3), Value::Int(1)]),
            "FIELD(`id`,3,1)"
        );
    }

    // ========== 删除重复 ==========
    #[test]
    fn test_delete_duplicates() {
        let sql = compiler().delete_duplicates_by_id("t", &["email"]);
        assert_eq!(
            normalize(&sql),
            "DELETE a FROM t a INNER JOIN t b WHERE a.id > b.id AND a.email = b.email"
        );
    }

    #[test]
    fn test_delete_duplicates_multi_column_custom_pk() {
        let sql = compiler().delete_duplicates("users", &["email", "siteId"], "uid");
        assert_eq!(
            sql,
            "DELETE `a` FROM `users` `a` INNER JOIN `users` `b` WHERE `a`.`uid` > `b`.`uid` AND `a`.`email` = `b`.`email` AND `a`.`siteId` = `b`.`siteId`"
        );
    }

    #[test]
    fn test_outputs_are_deterministic() {
        let c = compiler();
        assert_eq!(
            c.delete_duplicates_by_id("t", &["a", "b"]),
            c.delete_duplicates_by_id("t", &["a", "b"])
        );
        assert_eq!(
            c.replace("t", "c", "x", "y", None, &Params::new()),
            c.replace("t", "c", "x", "y", None, &Params::new())
        );
    }
}
