//! 数据库默认配置
//!
//! 建表时使用的默认字符集/排序规则、参数占位符前缀以及表前缀。作为构造参数传给构建器，
//! 不读取任何进程级全局状态。

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SqlxStmtError};

pub const DEFAULT_CHARSET: &str = "utf8";
pub const DEFAULT_PARAM_PREFIX: &str = ":qp";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// 默认字符集
    pub charset: String,
    /// 默认排序规则，为 None 时建表不追加 COLLATE
    pub collation: Option<String>,
    /// 生成占位符使用的前缀
    pub param_prefix: String,
    /// `{{%table}}` 中 `%` 展开成的表前缀
    pub table_prefix: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            collation: None,
            param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
            table_prefix: String::new(),
        }
    }
}

impl DbConfig {
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn with_param_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.param_prefix = prefix.into();
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DbConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.charset.trim().is_empty() {
            return Err(SqlxStmtError::Config("charset cannot be empty".to_string()));
        }
        if matches!(&self.collation, Some(c) if c.trim().is_empty()) {
            return Err(SqlxStmtError::Config(
                "collation cannot be an empty string, omit it instead".to_string(),
            ));
        }
        if !self.param_prefix.starts_with(':') || self.param_prefix.len() < 2 {
            return Err(SqlxStmtError::Config(format!(
                "param_prefix must start with ':' and name at least one character, got '{}'",
                self.param_prefix
            )));
        }
        if self.table_prefix.contains(|c: char| !(c.is_alphanumeric() || c == '_')) {
            return Err(SqlxStmtError::Config(format!(
                "table_prefix may only contain letters, digits and '_', got '{}'",
                self.table_prefix
            )));
        }
        Ok(())
    }
}
