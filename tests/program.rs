//! Whole-program integration tests: batch translation, installation, configuration and
//! graph export.

use std::sync::{Arc, Weak};

use cfglift::prelude::*;

fn counter(name: &str, limit: i32) -> Result<Body> {
    let mut b = BodyBuilder::new(MethodRef::new("Batch", name, vec![], Type::Int));
    let i = b.local("i", Type::Int);
    b.assign(i, Value::int(0));
    b.label("head")?;
    b.if_goto(Value::binary(BinaryOp::Ge, i.into(), Value::int(limit)), "done");
    b.assign(i, Value::binary(BinaryOp::Add, i.into(), Value::int(1)));
    b.goto("head");
    b.label("done")?;
    b.ret(i);
    b.finish()
}

fn throwing(name: &str) -> Result<Body> {
    let mut b = BodyBuilder::new(MethodRef::new("Batch", name, vec![], Type::Void));
    b.push(InstructionKind::Throw(Value::null()));
    b.finish()
}

/// A failing body is skipped and reported; the rest of the batch still translates.
#[test]
fn test_translate_all_skips_failures() -> Result<()> {
    let mut bodies = Vec::new();
    for n in 0..16 {
        bodies.push(counter(&format!("count{n}"), n)?);
    }
    bodies.insert(5, throwing("broken")?);

    let program = Program::new();
    let results = program.translate_all(&bodies);

    assert_eq!(results.len(), 17);
    assert!(matches!(results[5], Err(Error::Structural { .. })));
    for (body, result) in bodies.iter().zip(&results) {
        if let Ok(method) = result {
            assert_eq!(method.signature(), body.signature.signature());
            assert!(method.has_body());
        }
    }
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 16);

    let diagnostics = program.diagnostics();
    assert_eq!(diagnostics.error_count(), 1);
    let skipped = diagnostics.for_method("<Batch: void broken()>");
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].message.starts_with("method skipped"));
    assert!(diagnostics.summary().contains("1 error(s)"));
    Ok(())
}

/// A method body can be installed only once.
#[test]
fn test_body_installed_once() -> Result<()> {
    let body = counter("once", 3)?;
    let program = Program::new();

    let first = program.translate_with_unit_graph(&body)?;
    let again = program.translate_with_unit_graph(&body);

    assert!(matches!(again, Err(Error::BodyAlreadyTranslated(_))));
    let resolved = program.resolve_method(&body.signature);
    assert!(Arc::ptr_eq(&first, &resolved));
    assert!(resolved.has_body());
    Ok(())
}

/// Recursive methods do not keep themselves alive once the program is gone.
#[test]
fn test_recursive_method_freed_with_program() -> Result<()> {
    let rec = MethodRef::new("Rec", "spin", vec![], Type::Void);
    let mut b = BodyBuilder::new(rec.clone());
    b.invoke(InvokeExpr::new_static(rec.clone(), vec![]));
    b.ret_void();

    let program = Program::new();
    let method = program.translate_with_unit_graph(&b.finish()?)?;
    let cfg = method.body().expect("translated");
    let target = cfg
        .statements()
        .find_map(|(_, s)| match s.kind() {
            StatementKind::Call { target, .. } => Some(target.clone()),
            _ => None,
        })
        .expect("call statement");

    let callee = target.method().expect("callee alive");
    assert!(Arc::ptr_eq(&callee, &method));
    drop(callee);

    let weak: Weak<Method> = Arc::downgrade(&method);
    drop(method);
    drop(program);

    assert!(weak.upgrade().is_none());
    assert!(target.method().is_none());
    assert_eq!(target.signature(), "<Rec: void spin()>");
    Ok(())
}

/// Translating without installing leaves the program's methods untouched.
#[test]
fn test_translate_body_standalone() -> Result<()> {
    let body = counter("free", 2)?;
    let program = Program::new();
    let graph = UnitGraph::new(&body)?;

    let cfg = translate_body(&program, &body, &graph)?;
    assert_eq!(cfg.block_count(), 5);
    assert_eq!(program.method_count(), 0);
    Ok(())
}

/// Configuration renames the assertion entry point and the synthetic fields.
#[test]
fn test_custom_configuration() -> Result<()> {
    let config = TranslatorConfig::default()
        .with_assert_method("<my.Check: void that(boolean)>")
        .with_root_class("my.Base")
        .with_synthetic_fields("$type", "$len");
    let program = Program::with_config(config);

    let check = MethodRef::new("my.Check", "that", vec![Type::Boolean], Type::Void);
    let mut b = BodyBuilder::new(MethodRef::new("my.App", "run", vec![Type::Boolean], Type::Void));
    let ok = b.param("ok", 0, Type::Boolean);
    let arr = b.local("arr", Type::array_of(Type::Long));
    b.invoke(InvokeExpr::new_static(check, vec![ok.into()]));
    b.assign(arr, Value::new_array(Type::Long, Value::int(4)));
    b.ret_void();

    let method = program.translate_with_unit_graph(&b.finish()?)?;
    let cfg = method.body().expect("translated");
    let lines: Vec<String> = cfg.statements().map(|(_, s)| s.to_string()).collect();

    assert_eq!(
        lines,
        vec![
            "ok := $param0",
            "assert(ok)",
            "arr := new long[]",
            "$heap<my.Base.$type>[arr] := long[].class",
            "$arrSizeLocal0 := $heap<long[].$len>[arr]",
            "assume(($arrSizeLocal0 == 4))",
        ]
    );
    Ok(())
}

/// The DOT export marks entry and sink and renders guards on edges.
#[test]
fn test_dot_export() -> Result<()> {
    let body = counter("dot", 3)?;
    let program = Program::new();
    let method = program.translate_with_unit_graph(&body)?;
    let cfg = method.body().expect("translated");

    let dot = cfg.to_dot(Some(method.signature()));
    assert!(dot.starts_with("digraph CFG {"));
    assert!(dot.contains("Batch: int dot()"));
    assert!(dot.contains("block0 (entry)"));
    assert!(dot.contains("sink (sink)"));
    assert!(dot.contains("lightgreen"));
    assert!(dot.contains("(i \\>= 3)"));
    assert!(dot.trim_end().ends_with('}'));
    Ok(())
}

/// Builder misuse is reported before translation.
#[test]
fn test_builder_label_errors() {
    let mut b = BodyBuilder::new(MethodRef::new("Batch", "labels", vec![], Type::Void));
    b.goto("nowhere");
    assert!(matches!(b.finish(), Err(Error::UndefinedLabel(_))));

    let mut b = BodyBuilder::new(MethodRef::new("Batch", "labels", vec![], Type::Void));
    assert!(b.label("twice").is_ok());
    assert!(matches!(b.label("twice"), Err(Error::DuplicateLabel(_))));
}
