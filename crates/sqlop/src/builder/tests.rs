use std::sync::{Arc, Mutex};

use super::*;
use crate::client::{ExecResult, Executor};
use crate::dialect::{Dialect, MySql, Postgres};
use crate::error::SqlError;
use crate::rows::Rows;
use crate::test_records::{Audit, User};
use crate::value::Value;

fn mysql() -> Arc<dyn Dialect> {
    Arc::new(MySql)
}

fn pg() -> Arc<dyn Dialect> {
    Arc::new(Postgres)
}

fn count_placeholders(sql: &str, dialect: &str) -> usize {
    match dialect {
        "postgres" => sql.matches('$').count(),
        _ => sql.matches('?').count(),
    }
}

// ==================== SELECT ====================

#[test]
fn test_select_by_id_mysql() {
    let (sql, args) = select(["*"])
        .from("table")
        .filter(Op::eq("id", 123))
        .build_with(mysql())
        .unwrap();
    assert_eq!(sql, "SELECT * FROM `table` WHERE `id`=?");
    assert_eq!(args, vec![Value::I64(123)]);
}

#[test]
fn test_select_by_id_postgres() {
    let (sql, args) = select(["*"])
        .from("table")
        .filter(Op::eq("id", 123))
        .build_with(pg())
        .unwrap();
    assert_eq!(sql, r#"SELECT * FROM "table" WHERE "id"=$1"#);
    assert_eq!(args, vec![Value::I64(123)]);
}

#[test]
fn test_select_top_level_and_has_no_parens() {
    let (sql, args) = select(["id", "name"])
        .from("users")
        .filter(Op::eq("status", "active"))
        .filter(Op::or([Op::gt("age", 18), Op::is_null("age")]))
        .build_with(pg())
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT "id", "name" FROM "users" WHERE "status"=$1 AND ("age">$2 OR "age" IS NULL)"#
    );
    assert_eq!(args.len(), 2);
}

#[test]
fn test_select_empty_in_renders_false() {
    let (sql, args) = select(Vec::<&str>::new())
        .from("t")
        .filter(Op::in_list("c", Vec::<i64>::new()))
        .build_with(pg())
        .unwrap();
    assert_eq!(sql, r#"SELECT * FROM "t" WHERE 1=0"#);
    assert!(args.is_empty());
}

#[test]
fn test_select_empty_group_drops_where() {
    let (sql, _) = select(["*"])
        .from("t")
        .filter(Op::and(Vec::new()))
        .build_with(mysql())
        .unwrap();
    assert_eq!(sql, "SELECT * FROM `t`");
}

#[test]
fn test_select_columns_with_alias() {
    let (sql, _) = select([Column::of("u", "id").alias("uid"), Column::new("u.name")])
        .from("users u")
        .build_with(mysql())
        .unwrap();
    assert!(sql.starts_with("SELECT `u`.`id` AS `uid`, `u`.`name` FROM"));
}

#[test]
fn test_select_order_group_having_limit() {
    let (sql, args) = select(["user_id", "COUNT(*)"])
        .from("orders")
        .group_by("user_id")
        .having(Op::gt("COUNT(*)", 5))
        .order_by_desc("user_id")
        .limit(10)
        .offset(20)
        .build_with(mysql())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT `user_id`, COUNT(*) FROM `orders` GROUP BY `user_id` HAVING COUNT(*)>? \
         ORDER BY `user_id` DESC LIMIT 10 OFFSET 20"
    );
    assert_eq!(args, vec![Value::I64(5)]);
}

#[test]
fn test_select_paginate() {
    let (sql, _) = select(["*"])
        .from("users")
        .paginate(3, 10)
        .build_with(pg())
        .unwrap();
    assert_eq!(sql, r#"SELECT * FROM "users" LIMIT 10 OFFSET 20"#);

    let (first, _) = select(["*"])
        .from("users")
        .paginate(0, 10)
        .build_with(pg())
        .unwrap();
    assert_eq!(first, r#"SELECT * FROM "users" LIMIT 10"#);
}

#[test]
fn test_select_negative_limit_is_error() {
    let err = select(["*"])
        .from("users")
        .limit(-1)
        .build_with(mysql())
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));

    let err = select(["*"])
        .from("users")
        .paginate(1, -5)
        .build_with(mysql())
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
}

#[test]
fn test_select_offset_without_limit_is_error() {
    let err = select(["*"])
        .from("users")
        .offset(5)
        .build_with(mysql())
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
}

#[test]
fn test_select_record_projection() {
    let (sql, _) = select_record::<User>()
        .from("users")
        .build_with(mysql())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT `id`, `user_name`, `audit_created_by`, `audit_note`, `meta`, `created_at` \
         FROM `users`"
    );
}

#[test]
fn test_count_sql() {
    let s = select(["*"])
        .from("users")
        .filter(Op::eq("status", "active"))
        .order_by("id")
        .limit(5);
    let (sql, args) = s.build_count_with(pg()).unwrap();
    assert_eq!(sql, r#"SELECT COUNT(*) FROM "users" WHERE "status"=$1"#);
    assert_eq!(args.len(), 1);

    let grouped = select(["user_id"]).from("orders").group_by("user_id");
    let (sql, _) = grouped.build_count_with(pg()).unwrap();
    assert_eq!(
        sql,
        r#"SELECT COUNT(*) FROM (SELECT 1 FROM "orders" GROUP BY "user_id") AS t"#
    );
}

#[test]
#[should_panic(expected = "SELECT requires a table name")]
fn test_select_without_table_panics() {
    let _ = select(["*"]).build_with(mysql());
}

// ==================== INSERT ====================

#[test]
fn test_insert_values() {
    let (sql, args) = insert_into("users")
        .columns(["name", "age"])
        .values([Value::from("ann"), Value::from(30)])
        .values([Value::from("bob"), Value::from(41)])
        .build_with(pg())
        .unwrap();
    assert_eq!(
        sql,
        r#"INSERT INTO "users" ("name", "age") VALUES ($1, $2), ($3, $4)"#
    );
    assert_eq!(args.len(), 4);
    assert_eq!(args[2], Value::Text("bob".into()));
}

#[test]
#[should_panic(expected = "2 columns but 1 values")]
fn test_insert_width_mismatch_panics() {
    let _ = insert_into("users").columns(["a", "b"]).values([1]);
}

#[test]
#[should_panic(expected = "requires a table name")]
fn test_insert_without_table_panics() {
    let _ = insert_into("");
}

#[test]
fn test_insert_record_elides_zero_omitempty() {
    let audit = Audit {
        created_by: "root".into(),
        note: None,
    };
    let (sql, args) = insert_into("audits")
        .record(&audit)
        .build_with(mysql())
        .unwrap();
    assert_eq!(sql, "INSERT INTO `audits` (`created_by`) VALUES (?)");
    assert_eq!(args, vec![Value::Text("root".into())]);

    let noted = Audit {
        created_by: "root".into(),
        note: Some("n".into()),
    };
    let (sql, _) = insert_into("audits")
        .record(&noted)
        .build_with(mysql())
        .unwrap();
    assert_eq!(sql, "INSERT INTO `audits` (`created_by`, `note`) VALUES (?, ?)");
}

#[test]
fn test_insert_records_multi_row() {
    let rows = [
        Audit {
            created_by: "a".into(),
            note: None,
        },
        Audit {
            created_by: "b".into(),
            note: Some("x".into()),
        },
    ];
    let (sql, args) = insert_into("audits")
        .records(&rows)
        .returning(["created_by"])
        .build_with(pg())
        .unwrap();
    assert_eq!(
        sql,
        r#"INSERT INTO "audits" ("created_by", "note") VALUES ($1, $2), ($3, $4) RETURNING "created_by""#
    );
    assert_eq!(args[1], Value::Null);
}

#[test]
fn test_insert_record_with_opaque_column_is_error() {
    // `meta` is a nested record kept as one column with no value conversion
    let err = insert_into("users")
        .record(&User::default())
        .build_with(mysql())
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
}

// ==================== UPDATE ====================

#[test]
fn test_update_arithmetic_setters() {
    let (sql, args) = update("table")
        .set(Op::add("c4", 456))
        .set(Op::inc("c2"))
        .filter(Op::eq("id", 1))
        .build_with(mysql())
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE `table` SET `c4`=`c4`+?, `c2`=`c2`+1 WHERE `id`=?"
    );
    assert_eq!(args, vec![Value::I64(456), Value::I64(1)]);
}

#[test]
fn test_update_batch_flattens() {
    let (sql, args) = update("t")
        .set(Op::batch([Op::set("a", 1), Op::dec("b")]))
        .set(Op::mul("c", 2))
        .build_with(pg())
        .unwrap();
    assert_eq!(sql, r#"UPDATE "t" SET "a"=$1, "b"="b"-1, "c"="c"*$2"#);
    assert_eq!(args.len(), 2);
}

#[test]
fn test_update_set_record() {
    let audit = Audit {
        created_by: "ops".into(),
        note: None,
    };
    let (sql, _) = update("audits")
        .set_record(&audit)
        .filter(Op::eq("created_by", "root"))
        .build_with(mysql())
        .unwrap();
    assert_eq!(sql, "UPDATE `audits` SET `created_by`=? WHERE `created_by`=?");
}

#[test]
#[should_panic(expected = "empty SET list")]
fn test_update_empty_set_panics() {
    let _ = update("t").filter(Op::eq("id", 1)).build_with(mysql());
}

// ==================== DELETE ====================

#[test]
fn test_delete_with_filter() {
    let (sql, args) = delete_from("users")
        .filter(Op::in_list("id", [1, 2, 3]))
        .build_with(pg())
        .unwrap();
    assert_eq!(sql, r#"DELETE FROM "users" WHERE "id" IN ($1, $2, $3)"#);
    assert_eq!(args.len(), 3);
}

#[test]
#[should_panic(expected = "without WHERE")]
fn test_delete_without_filter_panics() {
    let _ = delete_from("users").build_with(mysql());
}

#[test]
fn test_delete_allow_all() {
    let (sql, args) = delete_from("users").allow_all().build_with(mysql()).unwrap();
    assert_eq!(sql, "DELETE FROM `users`");
    assert!(args.is_empty());
}

#[test]
fn test_placeholder_count_matches_args() {
    let statements: Vec<Box<dyn Fn(Arc<dyn Dialect>) -> (String, Vec<Value>)>> = vec![
        Box::new(|d| {
            select(["*"])
                .from("t")
                .filter(Op::between("a", 1, 9))
                .filter(Op::not_in("b", ["x", "y"]))
                .filter(Op::like("c", "abc"))
                .build_with(d)
                .unwrap()
        }),
        Box::new(|d| {
            update("t")
                .set(Op::sub("a", 1))
                .set(Op::set("b", Value::Null))
                .filter(Op::ne("c", 0))
                .build_with(d)
                .unwrap()
        }),
    ];
    for dialect in [mysql(), pg()] {
        for build in &statements {
            let (sql, args) = build(dialect.clone());
            assert_eq!(count_placeholders(&sql, dialect.name()), args.len(), "{sql}");
        }
    }
}

// ==================== Execution ====================

struct Recorder {
    dialect: Arc<dyn Dialect>,
    rows: Rows,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Recorder {
    fn new(rows: Rows) -> Self {
        Self {
            dialect: pg(),
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> (String, Vec<Value>) {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

impl Executor for Recorder {
    async fn exec(&self, sql: &str, args: &[Value]) -> crate::SqlResult<ExecResult> {
        self.calls.lock().unwrap().push((sql.to_string(), args.to_vec()));
        Ok(ExecResult { rows_affected: 1 })
    }

    async fn query(&self, sql: &str, args: &[Value]) -> crate::SqlResult<Rows> {
        self.calls.lock().unwrap().push((sql.to_string(), args.to_vec()));
        Ok(self.rows.clone())
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        self.dialect.clone()
    }
}

#[tokio::test]
async fn test_execute_uses_executor_dialect() {
    let db = Recorder::new(Rows::default());
    let res = delete_from("users")
        .filter(Op::eq("id", 7))
        .execute(&db)
        .await
        .unwrap();
    assert_eq!(res.rows_affected, 1);
    assert_eq!(
        db.last(),
        (r#"DELETE FROM "users" WHERE "id"=$1"#.to_string(), vec![Value::I64(7)])
    );
}

#[tokio::test]
async fn test_bind_records() {
    let rows = Rows::with_columns(["id", "user_name"])
        .row([Value::I64(1), Value::Text("ann".into())])
        .row([Value::I64(2), Value::Text("bob".into())]);
    let db = Recorder::new(rows);

    let mut users: Vec<User> = Vec::new();
    select_record::<User>()
        .from("users")
        .bind(&db, &mut users)
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "bob");
}

#[tokio::test]
async fn test_query_row_not_found() {
    let db = Recorder::new(Rows::with_columns(["id"]));
    let err = select(["id"]).from("users").query_row(&db).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(crate::optional(Err::<(), _>(err)).unwrap(), None);
}

#[tokio::test]
async fn test_count() {
    let db = Recorder::new(Rows::with_columns(["count"]).row([42]));
    let n = select(["*"]).from("users").count(&db).await.unwrap();
    assert_eq!(n, 42);
    assert_eq!(db.last().0, r#"SELECT COUNT(*) FROM "users""#);
}
