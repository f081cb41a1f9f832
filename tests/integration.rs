//! End-to-end tests over the literal scenarios of spec.md §8: parse a
//! script, solve it, and check the reported status, witness and model
//! count against the spec's worked answers.

use num_bigint::BigUint;

use strcount::options::{CountMode, SolverOptions};
use strcount::witness::Witness;
use strcount::Status;

fn options(bound: u64, mode: CountMode) -> SolverOptions {
    SolverOptions { bound, count_mode: mode, ..SolverOptions::default() }
}

#[test]
fn scenario_forced_integer_value_counts_to_one() {
    let script = "(declare-fun x () Int) (assert (= x 3)) (assert (>= x 0)) (check-sat)";
    let opts = options(10, CountMode::AtMost);
    let result = strcount::run(script, &opts).unwrap();
    assert_eq!(result.status(), Status::Sat);

    let witness = strcount::witness_for(&result, "x", &opts).unwrap();
    assert_eq!(witness, Witness::Int(3));

    let count = strcount::count(&result, "x", &opts).unwrap();
    assert_eq!(count, BigUint::from(1u32));
}

#[test]
fn scenario_a_plus_language_counts_strings_up_to_bound() {
    let script = r#"(declare-fun s () String)
                     (assert (str.in_re s (re.+ (str.to_re "a"))))"#;
    let opts = options(3, CountMode::AtMost);
    let result = strcount::run(script, &opts).unwrap();
    assert_eq!(result.status(), Status::Sat);

    let count = strcount::count(&result, "s", &opts).unwrap();
    assert_eq!(count, BigUint::from(3u32));
}

#[test]
fn scenario_concat_forces_length_through_mixed_refinement() {
    let script = r#"(declare-fun x () String)
                     (declare-fun y () String)
                     (assert (= (str.++ x "b") y))
                     (assert (= (str.len y) 2))"#;
    let opts = options(1, CountMode::Exact);
    let result = strcount::run(script, &opts).unwrap();
    assert_eq!(result.status(), Status::Sat);

    // len(x) = 1 is forced by len(y) = 2 and y = x ++ "b": every one-byte
    // string is admissible for x, so count(x, 1, =) enumerates all 256.
    let count = strcount::count(&result, "x", &opts).unwrap();
    assert_eq!(count, BigUint::from(256u32));
}

#[test]
fn scenario_contains_contradiction_is_unsat() {
    let script = r#"(declare-fun x () String)
                     (assert (= x "abc"))
                     (assert (str.contains x "z"))"#;
    let result = strcount::run(script, &SolverOptions::default()).unwrap();
    assert_eq!(result.status(), Status::Unsat);
}

#[test]
fn scenario_even_values_in_range_count_to_four() {
    // spec.md §8 scenario 5's "(= (mod x 2) 0)" expressed linearly over
    // this grammar's operator vocabulary (no `mod` operator): the same
    // even-residue set written as an explicit disjunction of the four
    // even values the 0..=7 range admits.
    let script = r#"(declare-fun x () Int)
                     (assert (>= x 0))
                     (assert (<= x 7))
                     (assert (or (= x 0) (= x 2) (= x 4) (= x 6)))"#;
    let opts = options(100, CountMode::AtMost);
    let result = strcount::run(script, &opts).unwrap();
    assert_eq!(result.status(), Status::Sat);

    let count = strcount::count(&result, "x", &opts).unwrap();
    assert_eq!(count, BigUint::from(4u32));
}

#[test]
fn scenario_disjunction_narrowed_by_negation() {
    let script = r#"(declare-fun x () Int)
                     (assert (or (= x 1) (= x 2)))
                     (assert (not (= x 1)))"#;
    let opts = options(10, CountMode::AtMost);
    let result = strcount::run(script, &opts).unwrap();
    assert_eq!(result.status(), Status::Sat);

    let witness = strcount::witness_for(&result, "x", &opts).unwrap();
    assert_eq!(witness, Witness::Int(2));

    let count = strcount::count(&result, "x", &opts).unwrap();
    assert_eq!(count, BigUint::from(1u32));
}

#[test]
fn unsatisfiable_conjunction_of_disjoint_integer_bounds() {
    let script = "(declare-fun x () Int) (assert (< x 0)) (assert (> x 0))";
    let result = strcount::run(script, &SolverOptions::default()).unwrap();
    assert_eq!(result.status(), Status::Unsat);
}

#[test]
fn witness_and_count_are_errors_on_an_unsat_run() {
    let script = "(declare-fun x () Int) (assert (< x 0)) (assert (> x 0))";
    let opts = options(10, CountMode::AtMost);
    let result = strcount::run(script, &opts).unwrap();
    assert_eq!(result.status(), Status::Unsat);

    assert!(strcount::witness_for(&result, "x", &opts).is_err());
    assert!(strcount::count(&result, "x", &opts).is_err());
}

#[test]
fn dot_output_renders_the_parsed_assertion_independent_of_solving() {
    let script = "(declare-fun x () Int) (assert (= x 3))";
    let dot = strcount::parse_to_dot(&strcount::parser::SmtLibParser, script).unwrap();
    assert!(dot.contains("digraph"));
}
