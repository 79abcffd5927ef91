use sqlxstmt::{
    compiler_for, Column, ColumnType, Condition, DbConfig, DbDriver, MySqlCompiler, Params,
    QueryCompiler, SqlxStmtError, Value,
};

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn create_table_without_options_gets_one_of_each_clause_in_order() {
    let compiler = MySqlCompiler::new(DbConfig::default().with_collation("utf8_unicode_ci"));
    let sql = compiler.create_table(
        "{{%widgets}}",
        &[
            Column::new("id", ColumnType::Pk),
            Column::new("name", ColumnType::String(None)).not_null(),
            Column::constraint("UNIQUE KEY `idx_name` (`name`)"),
        ],
        None,
    );

    let options = sql.rsplit(")").next().unwrap().trim();
    assert_eq!(
        options,
        "ENGINE = InnoDb DEFAULT CHARACTER SET = utf8 DEFAULT COLLATE = utf8_unicode_ci"
    );
    assert_eq!(count(&sql, "ENGINE = InnoDb"), 1);
    assert_eq!(count(&sql, "CHARACTER SET"), 1);
    assert_eq!(count(&sql, "COLLATE"), 1);
    assert!(sql.starts_with("CREATE TABLE {{%widgets}} (\n\t`id` int(11)"));
    assert!(sql.contains(",\n\tUNIQUE KEY `idx_name` (`name`)\n)"));
}

#[test]
fn create_table_respects_caller_engine() {
    let compiler = compiler_for(DbDriver::MySql, DbConfig::default());
    for options in ["ENGINE=MyISAM", "engine = Memory", "Engine=Aria COMMENT 'x'"] {
        let sql = compiler.create_table("t", &[Column::new("a", ColumnType::Integer)], Some(options));
        assert_eq!(count(&sql.to_uppercase(), "ENGINE"), 1, "{}", sql);
        assert!(!sql.contains("InnoDb"));
    }
}

#[test]
fn replace_then_merge_params() {
    let compiler = compiler_for(DbDriver::MySql, DbConfig::default());
    let mut params = Params::new();

    let first = compiler.replace("t", "c", "foo", "bar", None, &params);
    params.merge_statement(&first);
    assert_eq!(first.sql, "UPDATE t SET `c` = REPLACE(`c`, :qp0, :qp1)");
    assert_eq!(params.get(":qp0"), Some(&Value::from("foo")));
    assert_eq!(params.get(":qp1"), Some(&Value::from("bar")));

    let condition = Condition::new().and_eq("siteId", 2);
    let second = compiler.replace("t", "c", "x", "y", Some(&condition), &params);
    assert_eq!(
        second.sql,
        "UPDATE t SET `c` = REPLACE(`c`, :qp2, :qp3) WHERE `siteId` = :qp4"
    );
    params.merge_statement(&second);
    assert_eq!(params.len(), 5);

    let (sql, values) = second.to_positional(DbDriver::MySql);
    assert_eq!(sql, "UPDATE t SET `c` = REPLACE(`c`, ?, ?) WHERE `siteId` = ?");
    assert_eq!(values, vec![Value::from("x"), Value::from("y"), Value::Int(2)]);
}

#[test]
fn fixed_order_keeps_caller_order() {
    let compiler = compiler_for(DbDriver::MySql, DbConfig::default());
    let values: Vec<Value> = ["b", "a", "c"].into_iter().map(Value::from).collect();
    assert_eq!(
        compiler.fixed_order("status", &values),
        "FIELD(`status`,'b','a','c')"
    );
}

#[test]
fn delete_duplicates_where_clause_follows_column_order() {
    let compiler = compiler_for(DbDriver::MySql, DbConfig::default());
    let sql = compiler.delete_duplicates_by_id("t", &["email", "name"]);
    let where_clause = sql.split(" WHERE ").nth(1).unwrap().replace('`', "");
    assert_eq!(where_clause, "a.id > b.id AND a.email = b.email AND a.name = b.name");
}

#[test]
fn rename_sequence_is_a_capability_gate() {
    let compiler = compiler_for(DbDriver::MySql, DbConfig::default());
    match compiler.rename_sequence("a", "b") {
        Err(SqlxStmtError::UnsupportedOperation { driver, operation }) => {
            assert_eq!(driver, DbDriver::MySql);
            assert_eq!(operation, "renaming sequences");
        }
        other => panic!("expected UnsupportedOperation, got {:?}", other),
    }
}
