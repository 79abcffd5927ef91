//! 建表用的列定义与抽象类型映射

use crate::db_pool::DbDriver;
use crate::quote::Quoter;
use crate::value::Value;

/// 抽象列类型
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// 自增主键
    Pk,
    /// 64 位自增主键
    BigPk,
    /// 可变长字符串，None 使用默认长度
    String(Option<u32>),
    Text,
    Integer,
    BigInteger,
    Boolean,
    /// (precision, scale)，None 使用默认精度
    Decimal(Option<(u32, u32)>),
    DateTime,
    Binary,
    /// 原样输出的类型定义
    Raw(String),
}

/// 抽象类型 -> 物理类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMap {
    pub pk: String,
    pub big_pk: String,
    pub string: String,
    pub text: String,
    pub integer: String,
    pub big_integer: String,
    pub boolean: String,
    pub decimal: String,
    pub datetime: String,
    pub binary: String,
}

impl TypeMap {
    pub fn for_driver(driver: DbDriver) -> Self {
        let map = |v: [&str; 10]| TypeMap {
            pk: v[0].to_string(),
            big_pk: v[1].to_string(),
            string: v[2].to_string(),
            text: v[3].to_string(),
            integer: v[4].to_string(),
            big_integer: v[5].to_string(),
            boolean: v[6].to_string(),
            decimal: v[7].to_string(),
            datetime: v[8].to_string(),
            binary: v[9].to_string(),
        };
        match driver {
            DbDriver::MySql => map([
                "int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY",
                "bigint(20) NOT NULL AUTO_INCREMENT PRIMARY KEY",
                "varchar(255)",
                "text",
                "int(11)",
                "bigint(20)",
                "tinyint(1)",
                "decimal(10,0)",
                "datetime",
                "blob",
            ]),
            DbDriver::Postgres => map([
                "serial NOT NULL PRIMARY KEY",
                "bigserial NOT NULL PRIMARY KEY",
                "varchar(255)",
                "text",
                "integer",
                "bigint",
                "boolean",
                "numeric(10,0)",
                "timestamp(0)",
                "bytea",
            ]),
            DbDriver::Sqlite => map([
                "integer PRIMARY KEY AUTOINCREMENT NOT NULL",
                "integer PRIMARY KEY AUTOINCREMENT NOT NULL",
                "varchar(255)",
                "text",
                "integer",
                "bigint",
                "boolean",
                "decimal(10,0)",
                "datetime",
                "blob",
            ]),
        }
    }

    pub fn resolve(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::Pk => self.pk.clone(),
            ColumnType::BigPk => self.big_pk.clone(),
            ColumnType::String(None) => self.string.clone(),
            ColumnType::String(Some(len)) => with_size(&self.string, &len.to_string()),
            ColumnType::Text => self.text.clone(),
            ColumnType::Integer => self.integer.clone(),
            ColumnType::BigInteger => self.big_integer.clone(),
            ColumnType::Boolean => self.boolean.clone(),
            ColumnType::Decimal(None) => self.decimal.clone(),
            ColumnType::Decimal(Some((p, s))) => with_size(&self.decimal, &format!("{},{}", p, s)),
            ColumnType::DateTime => self.datetime.clone(),
            ColumnType::Binary => self.binary.clone(),
            ColumnType::Raw(raw) => raw.clone(),
        }
    }
}

/// 把 `varchar(255)` 中括号内的尺寸替换为 `size`；没有括号时追加
fn with_size(base: &str, size: &str) -> String {
    match base.find('(') {
        Some(pos) => format!("{}({})", &base[..pos], size),
        None => format!("{}({})", base, size),
    }
}

/// 一个列定义或表级约束
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// None 表示表级约束（如 `PRIMARY KEY (a, b)`），定义原样输出
    pub name: Option<String>,
    pub ty: ColumnType,
    pub not_null: bool,
    pub default: Option<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            not_null: false,
            default: None,
        }
    }

    /// 表级约束
    pub fn constraint(definition: impl Into<String>) -> Self {
        Self {
            name: None,
            ty: ColumnType::Raw(definition.into()),
            not_null: false,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// 渲染为 `\t<name> <type>[ NOT NULL][ DEFAULT <value>]`
    pub fn render(&self, quoter: &dyn Quoter, types: &TypeMap) -> String {
        let mut def = types.resolve(&self.ty);
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(&quoter.quote_value(default));
        }
        match &self.name {
            Some(name) => format!("\t{} {}", quoter.quote_column_name(name), def),
            None => format!("\t{}", def),
        }
    }
}
