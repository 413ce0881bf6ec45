//! Builder -> executor -> binder round trips against an in-memory executor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sqlop::dialect::{self, Dialect, DialectRegistration};
use sqlop::{
    Db, DbConfig, ExecResult, Executor, Op, Rows, SqlResult, Statement, Value, delete_from,
    insert_into, optional, select, update,
};

/// Answers queries from canned results keyed by SQL text.
#[derive(Default)]
struct MockExecutor {
    results: HashMap<String, Rows>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockExecutor {
    fn with(mut self, sql: &str, rows: Rows) -> Self {
        self.results.insert(sql.to_string(), rows);
        self
    }

    fn log(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }
}

impl Executor for MockExecutor {
    async fn exec(&self, sql: &str, args: &[Value]) -> SqlResult<ExecResult> {
        self.log.lock().unwrap().push((sql.to_string(), args.to_vec()));
        Ok(ExecResult {
            rows_affected: args.len() as u64,
        })
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Rows> {
        self.log.lock().unwrap().push((sql.to_string(), args.to_vec()));
        Ok(self.results.get(sql).cloned().unwrap_or_default())
    }
}

/// SQL Server style: `@p1` placeholders, bracket quoting.
#[derive(Debug)]
struct Bracket;

impl Dialect for Bracket {
    fn name(&self) -> &str {
        "bracket"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{index}")
    }

    fn quote(&self, ident: &str) -> String {
        if ident == "*" || ident.starts_with('[') {
            ident.to_string()
        } else {
            format!("[{ident}]")
        }
    }

    fn limit_offset(&self, limit: i64, offset: i64) -> SqlResult<String> {
        Ok(format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY"))
    }
}

fn bracket() -> Arc<dyn Dialect> {
    Arc::new(Bracket)
}

sqlop::inventory::submit! {
    DialectRegistration::new(bracket)
}

fn postgres_db(exec: MockExecutor) -> Db<MockExecutor> {
    Db::with_config(exec, DbConfig::new().with_dialect("postgres")).unwrap()
}

#[tokio::test]
async fn test_bind_scalars() {
    let exec = MockExecutor::default().with(
        r#"SELECT "id" FROM "users" WHERE "age">=$1 ORDER BY "id" ASC"#,
        Rows::with_columns(["id"]).row([1]).row([5]).row([9]),
    );
    let db = postgres_db(exec);

    let mut ids: Vec<i64> = Vec::new();
    select(["id"])
        .from("users")
        .filter(Op::gte("age", 21))
        .order_by("id")
        .bind(&db, &mut ids)
        .await
        .unwrap();
    assert_eq!(ids, vec![1, 5, 9]);
    assert_eq!(db.executor().log()[0].1, vec![Value::I64(21)]);
}

#[tokio::test]
async fn test_bind_key_value_map() {
    let exec = MockExecutor::default().with(
        r#"SELECT "name", "score" FROM "scores""#,
        Rows::with_columns(["name", "score"])
            .row([Value::from("ann"), Value::from(3)])
            .row([Value::from("bob"), Value::from(4)]),
    );
    let db = postgres_db(exec);

    let mut scores: HashMap<String, i64> = HashMap::new();
    select(["name", "score"])
        .from("scores")
        .bind(&db, &mut scores)
        .await
        .unwrap();
    assert_eq!(scores["bob"], 4);
}

#[tokio::test]
async fn test_query_row_and_optional() {
    let db = postgres_db(MockExecutor::default());
    let missing = optional(
        select(["id"])
            .from("users")
            .filter(Op::eq("id", 404))
            .query_row(&db)
            .await,
    )
    .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_write_statements_argument_order() {
    let db = postgres_db(MockExecutor::default());

    insert_into("users")
        .columns(["name", "age"])
        .values([Value::from("ann"), Value::from(30)])
        .execute(&db)
        .await
        .unwrap();
    update("users")
        .set(Op::set("name", "bob"))
        .set(Op::add("age", 1))
        .filter(Op::eq("id", 7))
        .execute(&db)
        .await
        .unwrap();
    let res = delete_from("users")
        .filter(Op::not_in("id", [1, 2]))
        .execute(&db)
        .await
        .unwrap();
    assert_eq!(res.rows_affected, 2);

    let log = db.executor().log();
    assert_eq!(
        log[1],
        (
            r#"UPDATE "users" SET "name"=$1, "age"="age"+$2 WHERE "id"=$3"#.to_string(),
            vec![Value::from("bob"), Value::I64(1), Value::I64(7)],
        )
    );
    assert_eq!(log[2].0, r#"DELETE FROM "users" WHERE "id" NOT IN ($1, $2)"#);
}

#[test]
fn test_inventory_dialect_is_registered() {
    assert!(dialect::names().contains(&"bracket".to_string()));
    let (sql, args) = select(["*"])
        .from("users")
        .filter(Op::eq("id", 1))
        .paginate(2, 10)
        .build_with(dialect::lookup("bracket").unwrap())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [users] WHERE [id]=@p1 OFFSET 10 ROWS FETCH NEXT 10 ROWS ONLY"
    );
    assert_eq!(args.len(), 1);
}

#[test]
fn test_register_duplicate_requires_force() {
    let err = dialect::register(Arc::new(Bracket), false).unwrap_err();
    assert!(matches!(err, sqlop::SqlError::Dialect(_)));
    dialect::register(Arc::new(Bracket), true).unwrap();
}
