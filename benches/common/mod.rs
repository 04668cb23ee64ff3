#![allow(dead_code)]
use std::path::Path;

use phantasia::ast::Program;
use phantasia::parser;
use test_support::load_cases;

/// `(label, source)` for every fixture case marked as a benchmark workload.
pub fn workloads() -> Vec<(String, String)> {
    let cases = load_cases(Path::new("tests/programs")).expect("load fixture cases");
    cases
        .into_iter()
        .filter(|case| case.spec.is_benchmark())
        .map(|case| {
            let source = case
                .read_program()
                .unwrap_or_else(|err| panic!("read {}: {err}", case.name));
            (case.name, source)
        })
        .collect()
}

pub fn load_program(label: &str, source: &str) -> Program {
    parser::parse(source).unwrap_or_else(|err| panic!("parse {label}: {err}"))
}
