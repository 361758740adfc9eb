//! End-to-end tests for the interpreter pipeline.
//!
//! Source text goes through tokenizing, parsing, analysis and execution,
//! and the tests check printed output and the diagnostics that come back.

use interpreter::{
    analyze,
    config::InterpreterConfig,
    errors::errors::ErrorKind,
    execute,
    interpreter::BufferSink,
    lexer::lexer::tokenize,
    parse_source,
    parser::parser::parse,
    run, RunOutcome,
};
use pretty_assertions::assert_eq;

fn run_program(source: &str) -> (RunOutcome, Vec<String>) {
    let mut sink = BufferSink::new();
    let outcome = run(source, &mut sink, InterpreterConfig::default());
    (outcome, sink.lines)
}

fn error_names(outcome: &RunOutcome) -> Vec<String> {
    outcome
        .diagnostics
        .sorted()
        .iter()
        .map(|error| error.get_error_name().to_string())
        .collect()
}

#[test]
fn test_simple_program() {
    let (outcome, lines) = run_program("var a: int = 3; var b: int = 4; println(a + b);");

    assert!(outcome.ran);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(lines, vec!["7"]);
}

#[test]
fn test_pipeline_by_hand() {
    let tokens = tokenize("var s: string = \"hi\"; println(s + '!');").unwrap();
    let program = parse(tokens).unwrap();

    let analysis = analyze(&program);
    assert!(analysis.is_ok());

    let mut sink = BufferSink::new();
    let execution = execute(&program, &mut sink);
    assert!(execution.diagnostics.is_empty());
    assert_eq!(sink.text(), "hi!");
}

#[test]
fn test_program_with_functions() {
    let source = r#"
        // naive fibonacci
        int fib(int n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }

        /* fills a list and prints it */
        void main(int count) {
            var values: List<int> = new List();
            for (var i: int = 0; i < count; i++) {
                values.append(fib(i));
            }
            println(values);
            println("sum of first two: " + (values[0] + values[1]));
        }

        start main(8);
    "#;
    let (outcome, lines) = run_program(source);

    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert_eq!(
        lines,
        vec!["[0, 1, 1, 2, 3, 5, 8, 13]", "sum of first two: 1"]
    );
}

#[test]
fn test_nested_loops_with_matrix() {
    let source = "
        var grid: int[][] = [[1, 2, 3], [4, 5, 6]];
        var total: int = 0;
        var r: int = 0;
        while (r < 2) {
            var c: int = 0;
            do {
                total = total + grid[r][c];
                c++;
            } while (c < 3);
            r++;
        }
        println(total);
    ";
    let (outcome, lines) = run_program(source);

    assert!(outcome.ran);
    assert_eq!(lines, vec!["21"]);
}

#[test]
fn test_lexical_error_stops_pipeline() {
    let (outcome, lines) = run_program("var a: int = 3 # 4;");

    assert!(!outcome.ran);
    assert!(lines.is_empty());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics.iter().next().unwrap().kind(),
        ErrorKind::Lexical
    );
}

#[test]
fn test_syntactic_error_stops_pipeline() {
    let (outcome, _) = run_program("var a: int = ;");

    assert!(!outcome.ran);
    assert_eq!(
        outcome.diagnostics.iter().next().unwrap().kind(),
        ErrorKind::Syntactic
    );
}

#[test]
fn test_semantic_errors_prevent_execution() {
    let (outcome, lines) = run_program("println(1); var a: int = \"x\"; println(missing);");

    assert!(!outcome.ran);
    assert!(lines.is_empty());
    assert_eq!(error_names(&outcome), vec!["TypeMatchError", "UndeclaredIdentifier"]);
    assert!(outcome.analysis_symbols.find("a").is_some());
    assert!(outcome.execution_symbols.is_empty());
}

#[test]
fn test_runtime_errors_keep_earlier_output() {
    let source = "
        var v: int[] = [1, 2];
        println(v[0]);
        println(v[5]);
        var zero: int = 0;
        println(10 / zero);
        println(\"done\");
    ";
    let (outcome, lines) = run_program(source);

    assert!(outcome.ran);
    assert_eq!(lines, vec!["1", "done"]);
    assert_eq!(error_names(&outcome), vec!["IndexOutOfBounds", "DivisionByZero"]);
}

#[test]
fn test_diagnostics_are_sorted_by_line_then_column() {
    let (outcome, _) = run_program("println(c);\nprintln(b + a);");

    let positions: Vec<(u32, u32)> = outcome
        .diagnostics
        .sorted()
        .iter()
        .map(|error| (error.line(), error.column()))
        .collect();
    assert_eq!(positions, vec![(1, 9), (2, 9), (2, 13)]);
}

#[test]
fn test_missing_entry_point() {
    let (outcome, _) = run_program("void main() { println(1); }");

    assert!(!outcome.ran);
    assert_eq!(error_names(&outcome), vec!["MissingEntryPoint"]);
}

#[test]
fn test_globals_after_entry_point_are_rejected() {
    let (outcome, lines) = run_program("start main(); var g: int = 1; void main() { println(g); }");

    assert!(!outcome.ran);
    assert!(lines.is_empty());
    assert_eq!(error_names(&outcome), vec!["UndeclaredIdentifier"]);

    let (outcome, lines) = run_program("void main() { println(g); } var g: int = 1; start main();");
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert_eq!(lines, vec!["1"]);
}

#[test]
fn test_case_insensitive_program() {
    let (outcome, lines) = run_program("VAR Total: INT = 2; PrintLn(total * TOTAL);");

    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert_eq!(lines, vec!["4"]);
}

#[test]
fn test_call_depth_from_config() {
    let source = "int down(int n) { return down(n - 1); } void main() { down(0); } start main();";
    let mut sink = BufferSink::new();
    let outcome = run(source, &mut sink, InterpreterConfig::default().with_max_call_depth(8));

    assert!(outcome.ran);
    assert_eq!(outcome.diagnostics.count_named("CallDepthExceeded"), 1);
}

#[test]
fn test_parse_source_matches_manual_pipeline() {
    let source = "var x: double = 1; x = x * 2.5;";
    assert_eq!(
        parse_source(source).unwrap(),
        parse(tokenize(source).unwrap()).unwrap()
    );
}
