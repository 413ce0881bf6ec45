//! Statement building and row binding without a database.
//!
//! Run with: cargo run --example builder -p sqlop

use std::sync::Arc;

use sqlop::dialect::{self, MySql};
use sqlop::prelude::*;

#[derive(Debug, Default, Record)]
struct Audit {
    created_by: String,
    #[orm(omitempty)]
    note: Option<String>,
}

#[derive(Debug, Default, Record)]
struct Product {
    id: i64,
    name: String,
    #[orm(omitempty)]
    category: Option<String>,
    #[orm(column = "audit")]
    audit: Audit,
}

fn show(label: &str, stmt: &impl Statement) -> SqlResult<()> {
    let (sql, args) = stmt.build_with(Arc::new(MySql))?;
    println!("{label:>8} mysql:    {sql}  {args:?}");
    let (sql, _) = stmt.build_with(dialect::lookup("postgres")?)?;
    println!("{label:>8} postgres: {sql}");
    Ok(())
}

fn main() -> SqlResult<()> {
    let product = Product {
        id: 7,
        name: "gear".into(),
        category: None,
        audit: Audit {
            created_by: "ann".into(),
            note: None,
        },
    };

    show("insert", &insert_into("products").record(&product))?;

    show(
        "select",
        &select_record::<Product>()
            .from("products")
            .filter(Op::in_list("category", ["tools", "parts"]))
            .filter(Op::or([Op::lt("id", 10), Op::like("name", "g%")]))
            .order_by_desc("id")
            .paginate(2, 20),
    )?;

    show(
        "update",
        &update("products")
            .set(Op::set("name", "cog"))
            .set(Op::inc("version"))
            .filter(Op::eq("id", 7)),
    )?;

    show(
        "delete",
        &delete_from("products").filter(Op::between("id", 100, 200)),
    )?;

    // Bind rows shaped like a query result into records.
    let mut rows = Rows::with_columns(["id", "name", "audit_created_by"])
        .row([Value::from(1), Value::from("bolt"), Value::from("root")])
        .row([Value::from(2), Value::from("nut"), Value::from("bob")]);
    let mut products: Vec<Product> = Vec::new();
    bind_rows(&mut rows, &mut products)?;
    for p in &products {
        println!("{} {} by {}", p.id, p.name, p.audit.created_by);
    }

    Ok(())
}
