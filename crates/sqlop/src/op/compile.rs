use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::{Kind, Op, Payload};
use crate::args::ArgsBuilder;
use crate::error::{SqlError, SqlResult};
use crate::log::sql_debug;
use crate::snapshot::Snapshot;
use crate::value::Value;

/// Renders one op into a SQL fragment, binding values through the builder.
pub type CompileFn = Arc<dyn Fn(&mut ArgsBuilder, &Op) -> SqlResult<String> + Send + Sync>;

static OPERATORS: LazyLock<Snapshot<Kind, CompileFn>> =
    LazyLock::new(|| Snapshot::new(builtins()));

fn builtins() -> HashMap<Kind, CompileFn> {
    let table: [(Kind, fn(&mut ArgsBuilder, &Op) -> SqlResult<String>); 25] = [
        (Kind::IS_NULL, compile_null_check),
        (Kind::IS_NOT_NULL, compile_null_check),
        (Kind::EQ, compile_compare),
        (Kind::NE, compile_compare),
        (Kind::LT, compile_compare),
        (Kind::LE, compile_compare),
        (Kind::GT, compile_compare),
        (Kind::GE, compile_compare),
        (Kind::LIKE, compile_like),
        (Kind::NOT_LIKE, compile_like),
        (Kind::IN, compile_in),
        (Kind::NOT_IN, compile_in),
        (Kind::BETWEEN, compile_between),
        (Kind::NOT_BETWEEN, compile_between),
        (Kind::AND, compile_group),
        (Kind::OR, compile_group),
        (Kind::SET, compile_set),
        (Kind::INC, compile_step),
        (Kind::DEC, compile_step),
        (Kind::ADD, compile_arith),
        (Kind::SUB, compile_arith),
        (Kind::MUL, compile_arith),
        (Kind::DIV, compile_arith),
        (Kind::BATCH, compile_batch),
        (Kind::PAGINATE, compile_paginate),
    ];
    table
        .into_iter()
        .map(|(kind, f)| (kind, Arc::new(f) as CompileFn))
        .collect()
}

/// Register (or replace) the compiler for `kind`.
pub fn register(
    kind: Kind,
    f: impl Fn(&mut ArgsBuilder, &Op) -> SqlResult<String> + Send + Sync + 'static,
) {
    let f: CompileFn = Arc::new(f);
    OPERATORS.update(|map| {
        map.insert(kind, f);
    });
    sql_debug!(target: "sqlop.registry", kind = %kind, "registered operator");
}

/// Whether a compiler is registered for `kind`.
pub fn registered(kind: Kind) -> bool {
    OPERATORS.get(&kind).is_some()
}

/// Compile `op` into a SQL fragment.
///
/// The op's rewrite, if any, is applied first and exactly once.
pub fn compile(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    if op.has_rewrite() {
        let mut owned = op.clone();
        if let Some(rewrite) = owned.take_rewrite() {
            let rewritten = rewrite(owned);
            return dispatch(args, &rewritten);
        }
    }
    dispatch(args, op)
}

fn dispatch(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let f = OPERATORS
        .get(&op.kind)
        .ok_or_else(|| SqlError::UnknownOperator(op.kind.to_string()))?;
    f(args, op)
}

/// Compile `ops` and join them with the separator of `group`.
///
/// Children of the same group kind are inlined, so `AND(AND(a, b), c)`
/// renders like `AND(a, b, c)`. Empty fragments are dropped.
pub fn compile_list(args: &mut ArgsBuilder, ops: &[Op], group: Kind) -> SqlResult<String> {
    let mut parts = Vec::with_capacity(ops.len());
    collect(args, ops, group, &mut parts)?;
    Ok(parts.join(separator(group)))
}

fn collect(
    args: &mut ArgsBuilder,
    ops: &[Op],
    group: Kind,
    out: &mut Vec<String>,
) -> SqlResult<()> {
    for op in ops {
        if op.kind == group && !op.has_rewrite() {
            if let Payload::Ops(children) = &op.payload {
                collect(args, children, group, out)?;
                continue;
            }
        }
        let frag = compile(args, op)?;
        if !frag.is_empty() {
            out.push(frag);
        }
    }
    Ok(())
}

fn separator(group: Kind) -> &'static str {
    match group.as_str() {
        "AND" => " AND ",
        "OR" => " OR ",
        _ => ", ",
    }
}

fn unsupported(op: &Op, message: impl Into<String>) -> SqlError {
    SqlError::UnsupportedPayload {
        kind: op.kind.to_string(),
        message: message.into(),
    }
}

/// Bind the single operand of `op`, or quote it when it names a column.
fn operand(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    match &op.payload {
        Payload::Value(v) => Ok(args.add(v.clone())),
        Payload::Named(n) => Ok(args.add_named(n.clone())),
        Payload::Column(c) => Ok(args.quote(c)),
        other => Err(unsupported(
            op,
            format!("expected a single value, got {other:?}"),
        )),
    }
}

fn compile_null_check(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    Ok(format!("{} {}", args.quote(op.target()), op.kind))
}

fn compile_compare(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let col = args.quote(op.target());
    let rhs = operand(args, op)?;
    Ok(format!("{col}{}{rhs}", op.kind))
}

fn compile_like(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let col = args.quote(op.target());
    let rhs = match &op.payload {
        Payload::Value(Value::Text(s)) if !s.contains('%') => args.add(format!("%{s}%")),
        _ => operand(args, op)?,
    };
    Ok(format!("{col} {} {rhs}", op.kind))
}

fn compile_in(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let expanded;
    let items: &[Value] = match &op.payload {
        Payload::List(items) => items,
        Payload::Value(Value::Json(json)) => {
            expanded = json_members(json).ok_or_else(|| {
                unsupported(op, "JSON payload must be an array or an object")
            })?;
            &expanded
        }
        other => {
            return Err(unsupported(
                op,
                format!("expected a list of values, got {other:?}"),
            ));
        }
    };

    if items.is_empty() {
        return Ok(if op.kind == Kind::NOT_IN { "1=1" } else { "1=0" }.to_string());
    }

    let col = args.quote(op.target());
    let placeholders: Vec<String> = items.iter().map(|v| args.add(v.clone())).collect();
    Ok(format!("{col} {} ({})", op.kind, placeholders.join(", ")))
}

/// Members of a JSON array, or keys of a JSON object.
fn json_members(json: &serde_json::Value) -> Option<Vec<Value>> {
    match json {
        serde_json::Value::Array(items) => Some(items.iter().map(json_scalar).collect()),
        serde_json::Value::Object(map) => {
            Some(map.keys().map(|k| Value::Text(k.clone())).collect())
        }
        _ => None,
    }
}

fn json_scalar(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::F64)
            }
        }
        other => Value::Json(other.clone()),
    }
}

fn compile_between(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let Payload::Pair(lower, upper) = &op.payload else {
        return Err(unsupported(op, "expected a (lower, upper) pair"));
    };
    let col = args.quote(op.target());
    let lo = args.add(lower.clone());
    let hi = args.add(upper.clone());
    Ok(format!("{col} {} {lo} AND {hi}", op.kind))
}

fn compile_group(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let Payload::Ops(children) = &op.payload else {
        return Err(unsupported(op, "expected child operators"));
    };
    let inner = compile_list(args, children, op.kind)?;
    if inner.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("({inner})"))
}

fn compile_set(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let col = args.quote(op.target());
    let rhs = operand(args, op)?;
    Ok(format!("{col}={rhs}"))
}

fn compile_step(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let col = args.quote(op.target());
    let sign = if op.kind == Kind::INC { '+' } else { '-' };
    Ok(format!("{col}={col}{sign}1"))
}

fn compile_arith(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let sign = match op.kind.as_str() {
        "ADD" => '+',
        "SUB" => '-',
        "MUL" => '*',
        _ => '/',
    };
    let col = args.quote(op.target());
    let rhs = operand(args, op)?;
    Ok(format!("{col}={col}{sign}{rhs}"))
}

fn compile_batch(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let Payload::Ops(children) = &op.payload else {
        return Err(unsupported(op, "expected child setters"));
    };
    compile_list(args, children, Kind::BATCH)
}

fn compile_paginate(args: &mut ArgsBuilder, op: &Op) -> SqlResult<String> {
    let Payload::Pair(Value::I64(limit), Value::I64(offset)) = &op.payload else {
        return Err(unsupported(op, "expected an integer (limit, offset) pair"));
    };
    args.dialect().limit_offset(*limit, *offset)
}
