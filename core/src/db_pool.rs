#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use sqlx::Pool;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, SqlxStmtError};
use crate::quote::Quoter;
use crate::statement::Statement;
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbDriver {
    MySql,
    Postgres,
    Sqlite,
}

impl DbDriver {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(DbDriver::MySql)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbDriver::Postgres)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(DbDriver::Sqlite)
        } else {
            Err(SqlxStmtError::UnsupportedDatabase(url.to_string()))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DbDriver::MySql => "mysql",
            DbDriver::Postgres => "postgres",
            DbDriver::Sqlite => "sqlite",
        }
    }

    pub fn placeholder(&self, index: usize) -> String {
        match self {
            DbDriver::MySql | DbDriver::Sqlite => "?".to_string(),
            DbDriver::Postgres => format!("${}", index + 1),
        }
    }
}

impl fmt::Display for DbDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DbDriver {
    type Err = SqlxStmtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DbDriver::MySql),
            "postgres" | "postgresql" | "pgsql" | "pg" => Ok(DbDriver::Postgres),
            "sqlite" => Ok(DbDriver::Sqlite),
            _ => Err(SqlxStmtError::UnsupportedDatabase(s.to_string())),
        }
    }
}

/// 按顺序绑定 [`Value`]
///
/// SQLite 驱动不支持 `BigDecimal`，`decimal_as_text` 变体把小数按字符串绑定。
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                Value::String(s) => query.bind(s),
                Value::Int(i) => query.bind(i),
                Value::Float(f) => query.bind(f),
                Value::Bool(b) => query.bind(b),
                Value::Decimal(d) => query.bind(d),
                Value::DateTime(dt) => query.bind(dt),
                Value::Null => query.bind(None::<String>),
            };
        }
        query
    }};
    ($query:expr, $values:expr, decimal_as_text) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                Value::String(s) => query.bind(s),
                Value::Int(i) => query.bind(i),
                Value::Float(f) => query.bind(f),
                Value::Bool(b) => query.bind(b),
                Value::Decimal(d) => query.bind(d.to_string()),
                Value::DateTime(dt) => query.bind(dt),
                Value::Null => query.bind(None::<String>),
            };
        }
        query
    }};
}

/// 语句派发：把构建好的 [`Statement`] 交给对应驱动的连接池执行
#[derive(Debug, Clone)]
pub struct DbPool {
    driver: DbDriver,
    /// 展开 `{{%table}}` 时使用的表前缀
    table_prefix: String,
    #[cfg(feature = "mysql")]
    mysql: Option<Arc<Pool<sqlx::MySql>>>,
    #[cfg(feature = "postgres")]
    pg: Option<Arc<Pool<sqlx::Postgres>>>,
    #[cfg(feature = "sqlite")]
    sqlite: Option<Arc<Pool<sqlx::Sqlite>>>,
}

impl DbPool {
    /// 从数据库 URL 连接并创建 DbPool
    pub async fn connect(url: &str) -> Result<Self> {
        let driver = DbDriver::from_url(url)?;

        match driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = Pool::<sqlx::MySql>::connect(url).await?;
                Ok(Self::from_mysql_pool(Arc::new(pool)))
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = Pool::<sqlx::Postgres>::connect(url).await?;
                Ok(Self::from_postgres_pool(Arc::new(pool)))
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = Pool::<sqlx::Sqlite>::connect(url).await?;
                Ok(Self::from_sqlite_pool(Arc::new(pool)))
            }
            #[allow(unreachable_patterns)]
            _ => Err(SqlxStmtError::UnsupportedDatabase(format!(
                "driver {} is not enabled in this build",
                driver
            ))),
        }
    }

    fn empty(driver: DbDriver) -> Self {
        Self {
            driver,
            table_prefix: String::new(),
            #[cfg(feature = "mysql")]
            mysql: None,
            #[cfg(feature = "postgres")]
            pg: None,
            #[cfg(feature = "sqlite")]
            sqlite: None,
        }
    }

    #[cfg(feature = "mysql")]
    pub fn from_mysql_pool(pool: Arc<Pool<sqlx::MySql>>) -> Self {
        Self {
            mysql: Some(pool),
            ..Self::empty(DbDriver::MySql)
        }
    }

    #[cfg(feature = "postgres")]
    pub fn from_postgres_pool(pool: Arc<Pool<sqlx::Postgres>>) -> Self {
        Self {
            pg: Some(pool),
            ..Self::empty(DbDriver::Postgres)
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn from_sqlite_pool(pool: Arc<Pool<sqlx::Sqlite>>) -> Self {
        Self {
            sqlite: Some(pool),
            ..Self::empty(DbDriver::Sqlite)
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn driver(&self) -> DbDriver {
        self.driver
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// 执行语句，返回受影响的行数
    ///
    /// 先展开 `{{table}}` / `[[column]]`，命名占位符再按出现顺序转换为驱动的
    /// 位置占位符，最后依次绑定。
    pub async fn execute(&self, statement: &Statement) -> Result<u64> {
        let expanded = Statement::with_bindings(
            self.driver.quote_sql(&statement.sql, &self.table_prefix),
            statement.bindings.clone(),
        );
        let (sql, values) = expanded.to_positional(self.driver);
        debug!(driver = %self.driver, sql = %sql, binds = values.len(), "executing statement");

        match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = self.mysql.as_deref().ok_or(SqlxStmtError::NoPoolAvailable)?;
                let query = bind_values!(sqlx::query(&sql), values);
                Ok(query.execute(pool).await?.rows_affected())
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = self.pg.as_deref().ok_or(SqlxStmtError::NoPoolAvailable)?;
                let query = bind_values!(sqlx::query(&sql), values);
                Ok(query.execute(pool).await?.rows_affected())
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = self.sqlite.as_deref().ok_or(SqlxStmtError::NoPoolAvailable)?;
                let query = bind_values!(sqlx::query(&sql), values, decimal_as_text);
                Ok(query.execute(pool).await?.rows_affected())
            }
            #[allow(unreachable_patterns)]
            _ => {
                let _ = values;
                Err(SqlxStmtError::NoPoolAvailable)
            }
        }
    }
}
