use anyhow::{Context, Result, ensure};
use std::path::Path;

use phantasia::Error;
use phantasia::run_source;
use test_support::{Case, CaseClass, load_cases, normalize_output};

fn expected_error(case: &Case) -> Result<String> {
    let expected_file = case
        .spec
        .expected
        .stderr_contains_file
        .as_deref()
        .with_context(|| format!("Missing stderr_contains_file in {}", case.name))?;
    Ok(case.read_text(expected_file)?.trim().to_string())
}

fn check_case(case: &Case) -> Result<()> {
    let source = case.read_program()?;
    let result = run_source(&source, Vec::new());

    match case.spec.class {
        CaseClass::RuntimeSuccess => {
            ensure!(
                case.spec.expected.exit_code == 0,
                "Case {} expected exit code must be 0 for runtime_success",
                case.name
            );
            let stdout_file = case
                .spec
                .expected
                .stdout_file
                .as_deref()
                .with_context(|| format!("Missing stdout_file in {}", case.name))?;
            let expected = case.read_text(stdout_file)?;
            let lines = result.with_context(|| format!("Running {}", case.name))?;
            let actual_output = normalize_output(&lines.join("\n"));
            let expected_output = normalize_output(&expected);
            assert_eq!(actual_output, expected_output, "Output mismatch for {}", case.name);
        }
        CaseClass::SyntaxError | CaseClass::RuntimeError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for error cases",
                case.name
            );
            let expected_error = expected_error(case)?;
            let error = match result {
                Ok(_) => anyhow::bail!("Expected an error in {}, but it ran", case.name),
                Err(error) => error,
            };
            let class_matches = matches!(
                (case.spec.class, &error),
                (CaseClass::SyntaxError, Error::Syntax(_))
                    | (CaseClass::RuntimeError, Error::Runtime(_))
            );
            ensure!(
                class_matches,
                "Case {} failed with the wrong error class: {error}",
                case.name
            );
            let actual = error.to_string();
            ensure!(
                actual.contains(&expected_error),
                "Expected error containing '{expected_error}' in {}, got '{actual}'",
                case.name
            );
        }
    }
    Ok(())
}

#[test]
fn runs_program_fixtures() -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;
    for case in &cases {
        if let Some(bench) = &case.spec.bench
            && bench.enabled
        {
            ensure!(
                !bench.tags.is_empty(),
                "Case {} has bench enabled but no tags",
                case.name
            );
        }
        check_case(case)?;
    }
    Ok(())
}

#[test]
fn runtime_error_keeps_output_printed_before_it() -> Result<()> {
    let source = "print(\"before\")\nundefined_name\nprint(\"after\")";
    let program = phantasia::parser::parse(source)?;
    let mut interpreter = phantasia::interpreter::Interpreter::new(Vec::new());
    ensure!(interpreter.run(&program).is_err(), "expected runtime error");
    assert_eq!(interpreter.output(), &vec!["before".to_string()]);
    Ok(())
}
