//! 数据库信息抽象层
//!
//! 把 sqlx 的数据库类型映射到 [`DbDriver`]，从而可以直接按类型拿到占位符、转义和语句构建器。

use crate::builder::{compiler_for, QueryCompiler};
use crate::config::DbConfig;
use crate::db_pool::DbDriver;
use crate::quote::Quoter;
use sqlx::Database;

/// 数据库信息 trait
///
/// 每个数据库类型（`sqlx::MySql`, `sqlx::Postgres`, `sqlx::Sqlite`）只需要给出对应的
/// `DbDriver`，其余方法都由驱动派生。
///
/// ```rust,ignore
/// assert_eq!(<sqlx::MySql as DatabaseInfo>::escape_identifier("user"), "`user`");
/// let compiler = <sqlx::MySql as DatabaseInfo>::compiler(DbConfig::default());
/// ```
pub trait DatabaseInfo: Database {
    /// 获取数据库驱动类型
    fn get_driver() -> DbDriver;

    /// 获取占位符字符串
    ///
    /// * MySQL/SQLite: `"?"`
    /// * PostgreSQL: `"$1"`, `"$2"`, ... (index + 1)
    fn placeholder(index: usize) -> String {
        Self::get_driver().placeholder(index)
    }

    /// 转义 SQL 标识符（表名、列名等）
    fn escape_identifier(name: &str) -> String {
        Self::get_driver().quote_table_name(name)
    }

    /// 该数据库对应的语句构建器
    fn compiler(config: DbConfig) -> Box<dyn QueryCompiler> {
        compiler_for(Self::get_driver(), config)
    }
}

#[cfg(feature = "mysql")]
impl DatabaseInfo for sqlx::MySql {
    fn get_driver() -> DbDriver {
        DbDriver::MySql
    }
}

#[cfg(feature = "postgres")]
impl DatabaseInfo for sqlx::Postgres {
    fn get_driver() -> DbDriver {
        DbDriver::Postgres
    }
}

#[cfg(feature = "sqlite")]
impl DatabaseInfo for sqlx::Sqlite {
    fn get_driver() -> DbDriver {
        DbDriver::Sqlite
    }
}
