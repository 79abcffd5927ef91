//! 通用语句构建器（PostgreSQL / SQLite，以及 MySQL 构建器的委托目标）

use tracing::{debug, warn};

use super::column::{Column, ColumnType, TypeMap};
use super::QueryCompiler;
use crate::condition::Condition;
use crate::config::DEFAULT_PARAM_PREFIX;
use crate::db_pool::DbDriver;
use crate::error::{Result, SqlxStmtError};
use crate::params::Params;
use crate::quote::Quoter;
use crate::statement::Statement;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct GenericCompiler {
    driver: DbDriver,
    types: TypeMap,
    param_prefix: String,
}

impl GenericCompiler {
    pub fn new(driver: DbDriver) -> Self {
        Self {
            driver,
            types: TypeMap::for_driver(driver),
            param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
        }
    }

    /// 替换类型映射
    pub fn with_type_map(mut self, types: TypeMap) -> Self {
        self.types = types;
        self
    }

    pub fn with_param_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.param_prefix = prefix.into();
        self
    }

    pub fn type_map(&self) -> &TypeMap {
        &self.types
    }

    pub fn param_prefix(&self) -> &str {
        &self.param_prefix
    }
}

impl QueryCompiler for GenericCompiler {
    fn driver(&self) -> DbDriver {
        self.driver
    }

    fn quoter(&self) -> &dyn Quoter {
        &self.driver
    }

    fn column_type(&self, ty: &ColumnType) -> String {
        self.types.resolve(ty)
    }

    fn create_table(&self, table: &str, columns: &[Column], options: Option<&str>) -> String {
        let cols: Vec<String> = columns
            .iter()
            .map(|c| c.render(&self.driver, &self.types))
            .collect();
        let sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.driver.quote_table_name(table),
            cols.join(",\n")
        );
        match options {
            Some(options) => format!("{} {}", sql, options),
            None => sql,
        }
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.driver.quote_table_name(table))
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.driver.quote_table_name(table))
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.driver.quote_table_name(old_name),
            self.driver.quote_table_name(new_name)
        )
    }

    fn truncate_table(&self, table: &str) -> String {
        let table = self.driver.quote_table_name(table);
        match self.driver {
            // SQLite 没有 TRUNCATE
            DbDriver::Sqlite => format!("DELETE FROM {}", table),
            DbDriver::MySql | DbDriver::Postgres => format!("TRUNCATE TABLE {}", table),
        }
    }

    fn rename_sequence(&self, old_name: &str, new_name: &str) -> Result<String> {
        match self.driver {
            DbDriver::Postgres => Ok(format!(
                "ALTER SEQUENCE {} RENAME TO {}",
                self.driver.quote_table_name(old_name),
                self.driver.quote_table_name(new_name)
            )),
            DbDriver::MySql | DbDriver::Sqlite => {
                warn!(driver = %self.driver, old_name, new_name, "sequence rename requested on a dialect without sequences");
                Err(SqlxStmtError::unsupported(self.driver, "renaming sequences"))
            }
        }
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
        let column = self.driver.quote_column_name(column);
        let mut bindings = Params::with_prefix(self.param_prefix.as_str()).starting_at(params.len());

        let find_ph = bindings.bind(find);
        let replace_ph = bindings.bind(replace);

        let sql = format!(
            "UPDATE {} SET {} = REPLACE({}, {}, {})",
            table, column, column, find_ph, replace_ph
        );
        let where_sql = condition
            .map(|c| c.build_where(&self.driver, &mut bindings))
            .unwrap_or_default();

        let sql = if where_sql.is_empty() {
            sql
        } else {
            format!("{} {}", sql, where_sql)
        };
        debug!(sql = %sql, params = bindings.len(), "built replace statement");
        Statement::with_bindings(sql, bindings.into_vec())
    }

    fn fixed_order(&self, column: &str, values: &[Value]) -> String {
        if values.is_empty() {
            return "NULL".to_string();
        }
        let mut sql = format!("CASE {}", self.driver.quote_column_name(column));
        for (i, value) in values.iter().enumerate() {
            sql.push_str(&format!(" WHEN {} THEN {}", self.driver.quote_value(value), i + 1));
        }
        sql.push_str(&format!(" ELSE {} END", values.len() + 1));
        sql
    }

    fn delete_duplicates(&self, table: &str, columns: &[&str], pk: &str) -> String {
        let table = self.driver.quote_table_name(table);
        let pk = self.driver.quote_column_name(pk);
        let group: Vec<String> = columns
            .iter()
            .map(|c| self.driver.quote_column_name(c))
            .collect();

        // 与自连接写法一致：NULL 不等于任何值，含 NULL 的行不算重复
        let mut sql = format!("DELETE FROM {table} WHERE ");
        for column in &group {
            sql.push_str(&format!("{column} IS NOT NULL AND "));
        }
        sql.push_str(&format!("{pk} NOT IN (SELECT MIN({pk}) FROM {table}"));
        if !group.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&group.join(", "));
        }
        sql.push(')');
        sql
    }
}
