use anyhow::{bail, Result};
use clap::Subcommand;
use sqlxstmt::{Column, ColumnType, Condition, Params, QueryCompiler, Statement, Value, DEFAULT_PK};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// CREATE TABLE with dialect default options
    CreateTable {
        table: String,

        /// Column as name:type, e.g. id:pk, title:string(64), body:text, data:binary
        #[arg(short = 'c', long = "column", value_parser = parse_column)]
        columns: Vec<Column>,

        /// Table level constraint emitted verbatim, e.g. "PRIMARY KEY (a, b)"
        #[arg(long = "constraint")]
        constraints: Vec<String>,

        /// Extra table options, e.g. "ENGINE=MyISAM"
        #[arg(long)]
        options: Option<String>,
    },

    /// DROP TABLE [IF EXISTS]
    DropTable {
        table: String,

        #[arg(long)]
        if_exists: bool,
    },

    /// Rename a sequence (fails on dialects without sequences)
    RenameSequence { old_name: String, new_name: String },

    /// UPDATE ... SET col = REPLACE(col, find, replace)
    Replace {
        table: String,
        column: String,
        find: String,
        replace: String,

        /// Raw WHERE expression
        #[arg(long = "where")]
        condition: Option<String>,
    },

    /// ORDER BY expression that returns rows in the given value order
    FixedOrder {
        column: String,
        values: Vec<String>,
    },

    /// Delete rows that share the same values in COLUMNS, keeping the smallest primary key
    DeleteDuplicates {
        table: String,

        #[arg(required = true)]
        columns: Vec<String>,

        #[arg(long, default_value = DEFAULT_PK)]
        pk: String,
    },
}

impl Command {
    /// 会修改或删除数据的命令，执行前需要确认
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Command::DropTable { .. } | Command::Replace { .. } | Command::DeleteDuplicates { .. }
        )
    }

    /// 只是表达式片段、不能单独执行的命令
    pub fn is_fragment(&self) -> bool {
        matches!(self, Command::FixedOrder { .. })
    }

    pub fn build(&self, compiler: &dyn QueryCompiler) -> Result<Statement> {
        let statement = match self {
            Command::CreateTable {
                table,
                columns,
                constraints,
                options,
            } => {
                if columns.is_empty() && constraints.is_empty() {
                    bail!("create-table needs at least one --column");
                }
                let mut all = columns.clone();
                all.extend(constraints.iter().map(Column::constraint));
                Statement::new(compiler.create_table(table, &all, options.as_deref()))
            }
            Command::DropTable { table, if_exists } => Statement::new(if *if_exists {
                compiler.drop_table_if_exists(table)
            } else {
                compiler.drop_table(table)
            }),
            Command::RenameSequence { old_name, new_name } => {
                Statement::new(compiler.rename_sequence(old_name, new_name)?)
            }
            Command::Replace {
                table,
                column,
                find,
                replace,
                condition,
            } => {
                let condition = condition.as_deref().map(Condition::raw);
                compiler.replace(table, column, find, replace, condition.as_ref(), &Params::new())
            }
            Command::FixedOrder { column, values } => {
                let values: Vec<Value> = values.iter().map(Value::from).collect();
                Statement::new(compiler.fixed_order(column, &values))
            }
            Command::DeleteDuplicates { table, columns, pk } => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                Statement::new(compiler.delete_duplicates(table, &columns, pk))
            }
        };
        Ok(statement)
    }
}

/// 解析 `name:type`
pub fn parse_column(spec: &str) -> std::result::Result<Column, String> {
    let (name, ty) = spec
        .split_once(':')
        .ok_or_else(|| format!("expected name:type, got '{}'", spec))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing column name in '{}'", spec));
    }

    let ty = ty.trim();
    let (ty, not_null) = match ty.strip_suffix('!') {
        Some(t) => (t, true),
        None => (ty, false),
    };
    let column = Column::new(name, parse_column_type(ty)?);
    Ok(if not_null { column.not_null() } else { column })
}

fn parse_column_type(ty: &str) -> std::result::Result<ColumnType, String> {
    let (base, size) = match ty.split_once('(') {
        Some((base, rest)) => match rest.strip_suffix(')') {
            Some(size) => (base.trim(), Some(size.trim())),
            // 例如 `tinyint(3) unsigned`，按原样输出
            None => return Ok(ColumnType::Raw(ty.to_string())),
        },
        None => (ty, None),
    };

    let parsed = match (base.to_lowercase().as_str(), size) {
        ("pk", None) => ColumnType::Pk,
        ("bigpk", None) => ColumnType::BigPk,
        ("string", None) => ColumnType::String(None),
        ("string", Some(len)) => ColumnType::String(Some(
            len.parse()
                .map_err(|_| format!("invalid string length '{}'", len))?,
        )),
        ("text", None) => ColumnType::Text,
        ("integer" | "int", None) => ColumnType::Integer,
        ("bigint", None) => ColumnType::BigInteger,
        ("boolean" | "bool", None) => ColumnType::Boolean,
        ("decimal", None) => ColumnType::Decimal(None),
        ("decimal", Some(ps)) => {
            let (p, s) = ps
                .split_once(',')
                .ok_or_else(|| format!("decimal size must be precision,scale, got '{}'", ps))?;
            let p = p.trim().parse().map_err(|_| format!("invalid precision '{}'", p))?;
            let s = s.trim().parse().map_err(|_| format!("invalid scale '{}'", s))?;
            ColumnType::Decimal(Some((p, s)))
        }
        ("datetime", None) => ColumnType::DateTime,
        ("binary", None) => ColumnType::Binary,
        _ => ColumnType::Raw(ty.to_string()),
    };
    Ok(parsed)
}
