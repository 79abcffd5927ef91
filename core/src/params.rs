//! 命名参数表
//!
//! 占位符名称 = 前缀 + (起始偏移 + 当前参数个数)，单调递增，同一次构建中不会重复。

use crate::config::DEFAULT_PARAM_PREFIX;
use crate::statement::Statement;
use crate::value::Value;

/// 有序的命名参数表
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    prefix: String,
    offset: usize,
    entries: Vec<(String, Value)>,
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl Params {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PARAM_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            offset: 0,
            entries: Vec::new(),
        }
    }

    /// 从已有参数表之后继续编号（只读取 `existing` 的大小，不复制其内容）
    pub fn continuing(existing: &Params) -> Self {
        Self {
            prefix: existing.prefix.clone(),
            offset: existing.len(),
            entries: Vec::new(),
        }
    }

    /// 指定起始编号
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 绑定一个值，返回生成的占位符名称
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        let name = format!("{}{}", self.prefix, self.offset + self.entries.len());
        self.entries.push((name.clone(), value.into()));
        name
    }

    /// 添加调用方自己命名的参数，名称缺少 `:` 时自动补上；同名参数会被覆盖
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let name = if name.starts_with(':') {
            name.to_string()
        } else {
            format!(":{}", name)
        };
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }

    /// 合并一条语句返回的参数
    pub fn extend(&mut self, bindings: impl IntoIterator<Item = (String, Value)>) {
        for (name, value) in bindings {
            self.insert(&name, value);
        }
    }

    pub fn merge_statement(&mut self, statement: &Statement) {
        self.extend(statement.bindings.iter().cloned());
    }

    pub fn into_vec(self) -> Vec<(String, Value)> {
        self.entries
    }
}
