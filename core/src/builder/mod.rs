//! 语句构建器
//!
//! [`QueryCompiler`] 描述一个方言能生成的 DDL/DML 语句；[`GenericCompiler`] 提供通用实现，
//! [`MySqlCompiler`] 持有一个 `GenericCompiler`，只覆盖 MySQL 行为不同的操作，其余直接委托。
//!
//! ```rust,ignore
//! use sqlxstmt::{compiler_for, DbConfig, DbDriver, Params, Value};
//!
//! let compiler = compiler_for(DbDriver::MySql, DbConfig::default());
//! let sql = compiler.fixed_order("status", &[Value::from("b"), Value::from("a")]);
//! assert_eq!(sql, "FIELD(`status`,'b','a')");
//! ```

pub mod column;
pub mod generic;
pub mod mysql;

pub use column::{Column, ColumnType, TypeMap};
pub use generic::GenericCompiler;
pub use mysql::MySqlCompiler;

use crate::condition::Condition;
use crate::config::DbConfig;
use crate::db_pool::DbDriver;
use crate::error::Result;
use crate::params::Params;
use crate::quote::Quoter;
use crate::statement::Statement;
use crate::value::Value;

/// 默认主键列名
pub const DEFAULT_PK: &str = "id";

/// 方言语句构建能力
///
/// 所有方法都是纯函数：不持有每次调用的可变状态，可以在多个线程间共享同一个实例。
pub trait QueryCompiler: Send + Sync {
    fn driver(&self) -> DbDriver;

    /// 标识符 / 字面量转义器
    fn quoter(&self) -> &dyn Quoter;

    /// 抽象列类型对应的物理类型
    fn column_type(&self, ty: &ColumnType) -> String;

    /// `CREATE TABLE <table> (\n\t<col> <type>,\n...\n)[ <options>]`
    fn create_table(&self, table: &str, columns: &[Column], options: Option<&str>) -> String;

    fn drop_table(&self, table: &str) -> String;

    /// `DROP TABLE IF EXISTS <table>`，表不存在时执行也是安全的
    fn drop_table_if_exists(&self, table: &str) -> String;

    fn rename_table(&self, old_name: &str, new_name: &str) -> String;

    fn truncate_table(&self, table: &str) -> String;

    /// 重命名序列；不支持序列对象的方言返回 `UnsupportedOperation`
    fn rename_sequence(&self, old_name: &str, new_name: &str) -> Result<String>;

    /// `UPDATE <table> SET <col> = REPLACE(<col>, :find, :replace)[ WHERE ...]`
    ///
    /// `table` 原样拼接（调用方可以传入已转义的表名或 `{{%table}}` 形式）。
    /// 占位符编号从 `params.len()` 开始；返回的 [`Statement`] 只包含新增的参数，
    /// 依次是 find、replace 以及条件编译产生的参数。
    fn replace(
        &self,
        table: &str,
        column: &str,
        find: &str,
        replace: &str,
        condition: Option<&Condition>,
        params: &Params,
    ) -> Statement;

    /// 按给定的值顺序排序的表达式，用于 ORDER BY
    fn fixed_order(&self, column: &str, values: &[Value]) -> String;

    /// 删除 `columns` 上重复的行，每组保留 `pk` 最小的一行
    fn delete_duplicates(&self, table: &str, columns: &[&str], pk: &str) -> String;

    /// 以 `id` 为主键的 [`delete_duplicates`](Self::delete_duplicates)
    fn delete_duplicates_by_id(&self, table: &str, columns: &[&str]) -> String {
        self.delete_duplicates(table, columns, DEFAULT_PK)
    }
}

/// 按驱动创建对应的构建器：MySQL 使用 [`MySqlCompiler`]，其余使用 [`GenericCompiler`]
pub fn compiler_for(driver: DbDriver, config: DbConfig) -> Box<dyn QueryCompiler> {
    match driver {
        DbDriver::MySql => Box::new(MySqlCompiler::new(config)),
        DbDriver::Postgres | DbDriver::Sqlite => {
            Box::new(GenericCompiler::new(driver).with_param_prefix(config.param_prefix))
        }
    }
}
