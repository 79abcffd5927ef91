//! # sqlxstmt
//!
//! 方言相关的 DDL/DML 语句构建：建表选项补全、重命名序列、文本替换、固定顺序排序、删除重复行。
//! 构建结果是纯字符串（或 [`Statement`]），可选地通过 [`DbPool`] 交给 sqlx 执行。

pub mod builder;
pub mod condition;
pub mod config;
pub mod database_info;
pub mod db_pool;
pub mod error;
pub mod params;
pub mod quote;
pub mod statement;
pub mod value;

pub use builder::{
    compiler_for, Column, ColumnType, GenericCompiler, MySqlCompiler, QueryCompiler, TypeMap,
    DEFAULT_PK,
};
pub use condition::Condition;
pub use config::DbConfig;
pub use database_info::DatabaseInfo;
pub use db_pool::{DbDriver, DbPool};
pub use error::{Result, SqlxStmtError};
pub use params::Params;
pub use quote::Quoter;
pub use statement::Statement;
pub use value::Value;
