use pretty_assertions::assert_eq;
use simian_core::{Captured, Environment, Error, Object, run};
use tracing_test::traced_test;

fn run_program(src: &str) -> (Object, Vec<String>) {
    let env = Environment::new();
    let mut ctx = Captured::default();
    let result = run(src, &env, &mut ctx).expect("program should parse");
    (result, ctx.lines)
}

#[test]
#[traced_test]
fn map_and_reduce() {
    let src = r#"
        let map = fn(arr, f) {
            let iter = fn(arr, accumulated) {
                if (len(arr) == 0) {
                    accumulated
                } else {
                    iter(rest(arr), push(accumulated, f(first(arr))));
                }
            };
            iter(arr, []);
        };

        let reduce = fn(arr, initial, f) {
            let iter = fn(arr, result) {
                if (len(arr) == 0) {
                    result
                } else {
                    iter(rest(arr), f(result, first(arr)));
                }
            };
            iter(arr, initial);
        };

        let sum = fn(arr) { reduce(arr, 0, fn(initial, el) { initial + el }) };
        let doubled = map([1, 2, 3, 4], fn(x) { x * 2 });
        puts(doubled);
        sum(doubled);
    "#;

    let (result, lines) = run_program(src);
    assert_eq!(result, Object::Integer(20));
    assert_eq!(lines, vec!["[2, 4, 6, 8]"]);
}

#[test]
#[traced_test]
fn hash_of_closures() {
    let src = r#"
        let people = [{"name": "Alice", "age": 24}, {"name": "Anna", "age": 28}];
        let getName = fn(person) { person["name"]; };
        puts(getName(people[0]));
        puts(getName(people[1]));
        let ops = {"add": fn(a, b) { a + b }, "sub": fn(a, b) { a - b }};
        ops["add"](10, ops["sub"](5, 2));
    "#;

    let (result, lines) = run_program(src);
    assert_eq!(result, Object::Integer(13));
    assert_eq!(lines, vec!["Alice", "Anna"]);
}

#[test]
fn closures_capture_independent_scopes() {
    let src = "
        let makeAdder = fn(base) {
            fn(x) { base + x }
        };
        let addTen = makeAdder(10);
        let addTwenty = makeAdder(20);
        [addTen(1), addTwenty(1), addTen(5)];
    ";

    let (result, _) = run_program(src);
    assert_eq!(result.inspect(), "[11, 21, 15]");
}

#[test]
fn early_return_from_nested_blocks() {
    let src = "
        let find = fn(arr, target) {
            let loop = fn(arr, idx) {
                if (len(arr) == 0) { return -1; }
                if (first(arr) == target) { return idx; }
                loop(rest(arr), idx + 1);
            };
            loop(arr, 0);
        };
        find([5, 7, 9], 9) + find([5], 8);
    ";

    let (result, _) = run_program(src);
    assert_eq!(result, Object::Integer(1));
}

#[test]
fn runtime_error_stops_program() {
    let src = r#"
        puts("before");
        let broken = fn() { 1 + "one" };
        broken();
        puts("after");
    "#;

    let (result, lines) = run_program(src);
    assert_eq!(result.inspect(), "ERROR: type mismatch: INTEGER + STRING");
    assert_eq!(lines, vec!["before"]);
}

#[test]
fn session_keeps_bindings() {
    let env = Environment::new();
    let mut ctx = Captured::default();

    for (src, expected) in [
        ("let a = 5;", "5"),
        ("let b = fn(x) { a * x };", "fn(x) {\n(a * x)\n}"),
        ("b(3)", "15"),
        ("let a = 1; b(3)", "3"),
        ("c", "ERROR: identifier not found: c"),
        ("a", "1"),
    ] {
        let result = run(src, &env, &mut ctx).expect("program should parse");
        assert_eq!(result.inspect(), expected, "{src}");
    }
}

#[test]
fn parse_errors_are_all_reported() {
    let env = Environment::new();
    let Err(Error::Parse(errors)) = run("let x 5;\nlet = 10;\nlet 838383;", &env, &mut Captured::default())
    else {
        panic!("expected parse errors");
    };

    assert_eq!(
        errors.messages(),
        vec![
            "expected next token to be =. Got INT instead",
            "expected next token to be IDENT. Got = instead",
            "no prefix parse function for = found",
            "expected next token to be IDENT. Got INT instead",
        ]
    );
    assert_eq!(
        Error::Parse(errors).to_string(),
        "expected next token to be =. Got INT instead\n\
         expected next token to be IDENT. Got = instead\n\
         no prefix parse function for = found\n\
         expected next token to be IDENT. Got INT instead"
    );
}
