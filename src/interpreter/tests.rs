use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{
    builtins::{Builtin, Method},
    expr::arithmetic,
    interpreter::{execute, execute_with_config, Execution},
    output::BufferSink,
    value::{format_double, Sequence, Value},
};
use crate::{
    ast::{
        expressions::ArithmeticOp,
        types::{Scalar, Type},
    },
    config::InterpreterConfig,
    parse_source,
    symbols::symbol::SymbolCategory,
    Position,
};

fn run(source: &str) -> (Vec<String>, Execution) {
    let program = parse_source(source).unwrap();
    let mut sink = BufferSink::new();
    let execution = execute(&program, &mut sink);
    (sink.lines, execution)
}

fn output(source: &str) -> Vec<String> {
    let (lines, execution) = run(source);
    assert!(
        execution.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        execution.diagnostics
    );
    lines
}

#[test]
fn test_arithmetic_results() {
    assert_eq!(
        output("println(1 + 2 * 3); println(7 / 2); println(7 % 3); println(2 ** 10); println(4 / 2);"),
        vec!["7", "3.5", "1", "1024", "2.0"]
    );
}

#[test]
fn test_mixed_arithmetic_promotes_to_double() {
    assert_eq!(output("println(1 + 2.5); println(2 ** 0.5 > 1.41);"), vec!["3.5", "true"]);
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        output(r#"println("a" + 1 + 'c'); println(1 + 2 + "x"); println("v" + 2.0);"#),
        vec!["a1c", "3x", "v2.0"]
    );
}

#[test]
fn test_round_builtin() {
    assert_eq!(
        output("println(round(2.5)); println(round(-2.5)); println(round(2.4)); println(round(7));"),
        vec!["3", "-3", "2", "7"]
    );
}

#[test]
fn test_string_builtins() {
    assert_eq!(
        output(r#"println(length("héllo")); println(find("abcabc", "ca")); println(startsWith("teach", "tea")); println(toString(3) + "!");"#),
        vec!["5", "2", "true", "3!"]
    );
}

#[test]
fn test_division_by_zero_abandons_statement() {
    let (lines, execution) = run(r#"var a: int = 1 / 0; println("after");"#);

    assert_eq!(lines, vec!["after"]);
    assert_eq!(execution.diagnostics.count_named("DivisionByZero"), 1);
}

#[test]
fn test_modulo_by_zero() {
    let (_, execution) = run("var a: int = 5 % 0;");
    assert_eq!(execution.diagnostics.count_named("ModuloByZero"), 1);
}

#[test]
fn test_switch_falls_through_until_break() {
    let source = r#"
        var x: int = 2;
        switch (x) {
            case 1: println("a");
            case 2: println("b");
            case 3: println("c"); break;
            default: println("d");
        }
    "#;
    assert_eq!(output(source), vec!["b", "c"]);
}

#[test]
fn test_switch_match_falls_into_default() {
    let source = r#"switch(2) { case 1: println("a"); case 2: println("b"); default: println("c"); }"#;
    assert_eq!(output(source), vec!["b", "c"]);
}

#[test]
fn test_switch_default_without_match_and_fallthrough_into_default() {
    let source = r#"
        var x: int = 9;
        switch (x) { case 1: println("a"); break; default: println("d"); }
        x = 3;
        switch (x) { case 3: println("c"); default: println("d"); }
    "#;
    assert_eq!(output(source), vec!["d", "c", "d"]);
}

#[test]
fn test_for_with_break_and_continue() {
    let source = "
        for (var i: int = 0; i < 5; i++) {
            if (i == 1) { continue; }
            if (i == 3) { break; }
            println(i);
        }
    ";
    assert_eq!(output(source), vec!["0", "2"]);
}

#[test]
fn test_break_inside_switch_stays_in_loop() {
    let source = "
        var i: int = 0;
        while (true) {
            i++;
            switch (i) { case 2: break; default: println(i); }
            if (i >= 3) { break; }
        }
    ";
    assert_eq!(output(source), vec!["1", "3"]);
}

#[test]
fn test_do_while_runs_at_least_once() {
    assert_eq!(
        output("var n: int = 5; do { n++; } while (n < 3); println(n);"),
        vec!["6"]
    );
}

#[test]
fn test_recursive_function() {
    let source = "
        int fact(int n) {
            if (n <= 1) { return 1; }
            return n * fact(n - 1);
        }
        void main() { println(fact(5)); }
        start main();
    ";
    assert_eq!(output(source), vec!["120"]);
}

#[test]
fn test_callee_only_sees_globals() {
    let source = "
        var g: int = 1;
        void show() { println(g); }
        void main() { var g: int = 2; show(); }
        start main();
    ";
    assert_eq!(output(source), vec!["1"]);
}

#[test]
fn test_arguments_are_coerced_to_parameter_types() {
    let source = "
        double half(double x) { return x / 2; }
        void main() { println(half(3)); }
        start main();
    ";
    assert_eq!(output(source), vec!["1.5"]);
}

#[test]
fn test_call_depth_limit() {
    let program = parse_source(
        "int f(int n) { return f(n + 1); } void main() { println(f(0)); } start main();",
    )
    .unwrap();
    let mut sink = BufferSink::new();
    let execution = execute_with_config(
        &program,
        &mut sink,
        InterpreterConfig::default().with_max_call_depth(16),
    );

    assert!(sink.lines.is_empty());
    assert_eq!(execution.diagnostics.count_named("CallDepthExceeded"), 1);
    assert_eq!(execution.diagnostics.len(), 1);
}

#[test]
fn test_deep_recursion_within_default_limit() {
    let source = "
        int count(int n) {
            if (n == 0) { return 0; }
            return 1 + count(n - 1);
        }
        void main() { println(count(250)); }
        start main();
    ";
    assert_eq!(output(source), vec!["250"]);
}

#[test]
fn test_runtime_error_in_callee_fails_the_call() {
    let source = r#"
        int f() { return 5 % 0; }
        void main() { var x: int = f(); println(x); }
        start main();
        println("after");
    "#;
    let (lines, execution) = run(source);

    assert_eq!(lines, vec!["after"]);
    assert_eq!(execution.diagnostics.count_named("ModuloByZero"), 1);
    assert_eq!(execution.diagnostics.len(), 1);
}

#[test]
fn test_failed_declaration_binds_default() {
    let (lines, execution) = run("var x: int = 1 / 0; println(x);");

    assert_eq!(lines, vec!["0"]);
    assert_eq!(execution.diagnostics.count_named("DivisionByZero"), 1);
    assert_eq!(execution.diagnostics.len(), 1);
    assert!(execution.symbols.find("x").unwrap().holds_default);
}

#[test]
fn test_list_aliasing() {
    let source = "
        var l: List<int> = new List();
        var m: List<int> = l;
        m.append(1);
        l.append(2);
        println(l);
        println(length(m));
        println(l.remove(0));
        println(m);
    ";
    assert_eq!(output(source), vec!["[1, 2]", "2", "1", "[2]"]);
}

#[test]
fn test_vector_and_matrix_indexing() {
    let source = "
        var v: int[] = [1, 2, 3];
        v[0] = 4;
        v[1]++;
        var m: double[][] = [[1, 2], [3.5, 4]];
        m[1][0] = 2;
        println(v);
        println(m[1]);
        println(m[0][1]);
    ";
    assert_eq!(output(source), vec!["[4, 3, 3]", "[2.0, 4.0]", "2.0"]);
}

#[test]
fn test_index_out_of_bounds() {
    let (lines, execution) = run("var v: int[] = [1]; println(v[3]); println(v[-1]); println(0);");

    assert_eq!(lines, vec!["0"]);
    assert_eq!(execution.diagnostics.count_named("IndexOutOfBounds"), 2);
}

#[test]
fn test_logical_operators_short_circuit() {
    let source = "
        var v: int[] = [1];
        println(false && v[5] == 1);
        println(true || v[5] == 1);
        println(true ^ true);
    ";
    assert_eq!(output(source), vec!["false", "true", "false"]);
}

#[test]
fn test_casts() {
    assert_eq!(
        output("println((int) 3.9); println((double) 2); println((char) 65); println((int) 'a'); println((string) 1.5);"),
        vec!["3", "2.0", "A", "97", "1.5"]
    );
}

#[test]
fn test_bool_stored_in_int_slot() {
    assert_eq!(output("var a: int = true; println(a);"), vec!["1"]);
}

#[test]
fn test_defaults_and_symbol_rows() {
    let (lines, execution) = run("var b: bool; var s: string; var n: int; n = 3; println(b);");

    assert_eq!(lines, vec!["true"]);
    let n = execution.symbols.find("n").unwrap();
    assert_eq!(n.value, Some(Value::Int(3)));
    assert!(!n.holds_default);
    assert!(execution.symbols.find("s").unwrap().holds_default);
}

#[test]
fn test_function_rows_record_signature() {
    let (_, execution) = run("int add(int a, int b) { return a + b; } void main() { } start main();");

    let add = execution.symbols.find("add").unwrap();
    assert_eq!(add.category, SymbolCategory::Function);
    assert_eq!(add.value, Some(Value::Str(String::from("add(int, int) : int"))));
    assert_eq!(
        execution.symbols.find("main").unwrap().category,
        SymbolCategory::Procedure
    );
}

#[test]
fn test_loop_body_declarations_share_one_row() {
    let (_, execution) = run("for (var i: int = 0; i < 3; i++) { var t: int = i; }");

    let rows: Vec<_> = execution
        .symbols
        .rows()
        .iter()
        .filter(|row| row.name == "t")
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].scope, "Global> for(i < 3)");
    assert_eq!(rows[0].value, Some(Value::Int(2)));
}

#[test]
fn test_stray_break_stops_execution() {
    let (lines, execution) = run("println(1); break; println(2);");

    assert_eq!(lines, vec!["1"]);
    assert_eq!(execution.diagnostics.count_named("UnconsumedControlSignal"), 1);
}

#[test]
fn test_builtin_arity_is_checked() {
    let error = Builtin::Round
        .call(vec![], Position::new(1, 1))
        .unwrap_err();
    assert_eq!(error.get_error_name(), "MissingArguments");
}

#[test]
fn test_method_on_wrong_receiver() {
    let vector = Value::Vector(Sequence::new(Scalar::Int, vec![Value::Int(1)]));
    let error = Method::Append
        .call(&vector, vec![Value::Int(2)], Position::new(1, 1))
        .unwrap_err();

    assert_eq!(error.get_error_name(), "UnknownMethod");
    assert_eq!(
        Method::Find.call(&vector, vec![Value::Int(1)], Position::new(1, 1)),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_value_equality_and_display() {
    assert!(Value::Int(2).equals(&Value::Double(2.0)));
    assert!(Value::Char('a').equals(&Value::Int(97)));
    assert!(!Value::Str(String::from("1")).equals(&Value::Int(1)));
    assert_eq!(format_double(3.0), "3.0");
    assert_eq!(format_double(f64::INFINITY), "Infinity");
    assert_eq!(Value::default_for(Type::Vector(Scalar::Int)).to_string(), "[]");
    assert_eq!(Value::Void.to_string(), "null");
}

#[test]
fn test_shared_sequence_storage() {
    let list = Sequence::new(Scalar::Int, vec![]);
    let alias = list.clone();
    alias.push(Value::Int(1));

    assert!(list.same_storage(&alias));
    assert_eq!(list.len(), 1);
}

proptest! {
    #[test]
    fn test_int_arithmetic_stays_int(a in -1000i64..1000, b in -1000i64..1000) {
        prop_assert_eq!(
            arithmetic(ArithmeticOp::Add, Value::Int(a), Value::Int(b), Position::null()),
            Ok(Value::Int(a + b))
        );
        prop_assert_eq!(
            arithmetic(ArithmeticOp::Multiply, Value::Int(a), Value::Char('a'), Position::null()),
            Ok(Value::Int(a * 97))
        );
    }

    #[test]
    fn test_double_operand_promotes(a in -1000i64..1000, b in -1000.0f64..1000.0) {
        prop_assert_eq!(
            arithmetic(ArithmeticOp::Subtract, Value::Int(a), Value::Double(b), Position::null()),
            Ok(Value::Double(a as f64 - b))
        );
    }

    #[test]
    fn test_division_always_yields_double(a in -1000i64..1000, b in 1i64..1000) {
        let result = arithmetic(ArithmeticOp::Divide, Value::Int(a), Value::Int(b), Position::null());
        prop_assert!(matches!(result, Ok(Value::Double(_))));
    }
}
