use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, trace};

use crate::ast::{BinaryOperator, Expression, Program, Statement};
use crate::builtins;
use crate::runtime::native::CallContext;
use crate::runtime::{Function, NIL, RuntimeError, RuntimeResult, Scope, Value};

/// Nested user-function calls allowed before a call fails instead of
/// exhausting the native stack.
pub const MAX_CALL_DEPTH: usize = 200;

/// Line-oriented destination for everything the `print` builtin writes.
pub trait OutputSink {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Collects printed lines in memory.
impl OutputSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Adapts any `io::Write` (stdout, a file, a byte buffer) into a sink.
#[derive(Debug, Default)]
pub struct WriterSink<W>(pub W);

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.0, "{line}")
    }
}

/// Tree-walking evaluator.
///
/// Holds one scope chain for its whole lifetime, so consecutive calls to
/// [`Interpreter::execute`] (one per REPL line, say) see each other's
/// declarations. A runtime error aborts only the statement being executed.
pub struct Interpreter<S: OutputSink> {
    scope: Scope,
    output: S,
}

impl<S: OutputSink> Interpreter<S> {
    pub fn new(output: S) -> Self {
        debug!("Initializing interpreter");
        let mut scope = Scope::new();
        builtins::install(&mut scope);
        Self { scope, output }
    }

    /// Runs every top-level statement in order, stopping at the first error.
    pub fn run(&mut self, program: &Program) -> RuntimeResult<()> {
        debug!("Running {} top-level statements", program.statements.len());
        for statement in &program.statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// Like [`Interpreter::run`], but writes the value of each top-level
    /// expression statement to the output as soon as it is evaluated, quoted
    /// if it is a string.
    pub fn run_interactive(&mut self, program: &Program) -> RuntimeResult<()> {
        for statement in &program.statements {
            if let Statement::Expression(expr) = statement {
                let value = self.evaluate(expr)?;
                self.write_line(&value.repr())?;
            } else {
                self.execute(statement)?;
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, statement: &Statement) -> RuntimeResult<()> {
        trace!("Executing {statement:?}");
        match statement {
            Statement::Declaration { name, initializer } => {
                let value = self.evaluate(initializer)?;
                self.scope.declare(name.as_str(), value);
            }
            Statement::FunctionDeclaration { name, params, body } => {
                let function = Function {
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                };
                self.scope
                    .declare(name.as_str(), Value::Function(Rc::new(function)));
            }
            Statement::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Statement::Return(expr) => {
                let value = self.evaluate(expr)?;
                self.scope.set_return(value);
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                let body = if self.condition(condition)? {
                    then_body
                } else {
                    else_body
                };
                self.exec_block(body)?;
            }
            Statement::While { condition, body } => {
                while self.condition(condition)? {
                    self.exec_block(body)?;
                    if self.scope.has_returned() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Executes statements in the current frame until one of them sets the
    /// frame's return slot.
    fn exec_block(&mut self, body: &[Statement]) -> RuntimeResult<()> {
        for statement in body {
            self.execute(statement)?;
            if self.scope.has_returned() {
                break;
            }
        }
        Ok(())
    }

    fn condition(&mut self, condition: &Expression) -> RuntimeResult<bool> {
        match self.evaluate(condition)? {
            Value::Boolean(value) => Ok(value),
            other => Err(RuntimeError::NonBooleanCondition {
                got: other.stringify(),
            }),
        }
    }

    pub fn evaluate(&mut self, expr: &Expression) -> RuntimeResult<Value> {
        match expr {
            Expression::Number(value) => Ok(Value::Number(*value)),
            Expression::String(value) => Ok(Value::string(value.as_str())),
            Expression::Boolean(value) => Ok(Value::from_bool(*value)),
            Expression::Nil => Ok(NIL),
            Expression::Variable(name) => self.scope.load(name),
            Expression::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                self.scope.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expression::Call { callee, args } => {
                let callee = self.evaluate(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                self.call(&callee, args)
            }
            Expression::Subscript { object, key } => {
                let object = self.evaluate(object)?;
                let key = self.evaluate(key)?;
                Ok(object.lookup(&key))
            }
        }
    }

    /// Looks up the operator's method on the left operand and calls it with
    /// both operands.
    fn eval_binary(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> RuntimeResult<Value> {
        let lhs = self.evaluate(left)?;
        let method_name = op.method_name();
        let method = lhs.lookup(&Value::string(method_name));
        if matches!(method, Value::Nil) {
            return Err(RuntimeError::MissingOperatorMethod {
                method: method_name,
                operator: op.symbol(),
                kind: lhs.kind(),
            });
        }
        let rhs = self.evaluate(right)?;
        self.call(&method, vec![lhs, rhs])
    }

    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> RuntimeResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(function, args),
            Value::NativeFunction(native) => {
                trace!("Calling native function '{}'", native.name());
                native.invoke(self, args)
            }
            other => Err(RuntimeError::NotCallable { kind: other.kind() }),
        }
    }

    /// Runs a user function in a new frame linked to the caller's current
    /// frame. Missing arguments are nil; extra ones are dropped.
    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> RuntimeResult<Value> {
        if self.scope.depth() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            });
        }
        self.scope.push();
        debug!("Entering function frame at depth {}", self.scope.depth());

        let mut args = args.into_iter();
        for param in function.params.iter() {
            self.scope
                .declare(param.as_str(), args.next().unwrap_or(NIL));
        }

        let result = self.exec_block(&function.body);
        let returned = self.scope.pop();
        debug!("Left function frame, depth now {}", self.scope.depth());

        result?;
        Ok(returned.unwrap_or(NIL))
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Binds `name` in the frame currently active (the root frame between
    /// statements).
    pub fn define(&mut self, name: &str, value: Value) {
        self.scope.declare(name, value);
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    pub fn into_output(self) -> S {
        self.output
    }
}

impl<S: OutputSink> CallContext for Interpreter<S> {
    fn write_line(&mut self, line: &str) -> RuntimeResult<()> {
        self.output.write_line(line).map_err(RuntimeError::output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::runtime::{FALSE, TRUE, ValueKind};
    use indoc::indoc;

    fn run_source(source: &str) -> RuntimeResult<Vec<String>> {
        let program = parse(source).expect("parse failed");
        let mut interpreter = Interpreter::new(Vec::new());
        interpreter.run(&program)?;
        Ok(interpreter.into_output())
    }

    fn run_ok(source: &str) -> Vec<String> {
        run_source(source).expect("run failed")
    }

    fn eval(source: &str) -> RuntimeResult<Value> {
        let program = parse(source).expect("parse failed");
        let mut interpreter = Interpreter::new(Vec::new());
        let (last, init) = program
            .statements
            .split_last()
            .expect("at least one statement");
        for statement in init {
            interpreter.execute(statement)?;
        }
        match last {
            Statement::Expression(expr) => interpreter.evaluate(expr),
            other => panic!("expected trailing expression, got {other:?}"),
        }
    }

    #[test]
    fn prints_stringified_sum() {
        assert_eq!(run_ok("print(stringify(1 + 2))"), vec!["3"]);
    }

    #[test]
    fn empty_source_produces_no_output() {
        assert_eq!(run_ok(""), Vec::<String>::new());
    }

    #[test]
    fn operators_dispatch_on_left_operand() {
        assert_eq!(eval("\"a\" + \"b\""), Ok(Value::string("ab")));
        assert_eq!(eval("1 < 2"), Ok(TRUE));
        assert_eq!(eval("2 * 3 - 4 / 2"), Ok(Value::Number(4.0)));
        assert_eq!(eval("7 % 3 == 1"), Ok(TRUE));
        assert_eq!(eval("1 != 1"), Ok(FALSE));
    }

    #[test]
    fn boolean_defines_no_add() {
        assert_eq!(
            eval("true + 1"),
            Err(RuntimeError::MissingOperatorMethod {
                method: "add",
                operator: "+",
                kind: ValueKind::Boolean,
            })
        );
    }

    #[test]
    fn nil_and_functions_define_no_operators() {
        assert!(matches!(
            eval("nil == nil"),
            Err(RuntimeError::MissingOperatorMethod { method: "eq", .. })
        ));
        assert!(matches!(
            eval("print < 1"),
            Err(RuntimeError::MissingOperatorMethod {
                kind: ValueKind::NativeFunction,
                ..
            })
        ));
    }

    #[test]
    fn string_plus_number_is_argument_mismatch() {
        let error = eval("\"a\" + 1").expect_err("expected error");
        assert_eq!(
            error.to_string(),
            "Invalid arguments passed to add: expected (String, String), got (String, Number)"
        );
    }

    #[test]
    fn undefined_variable_names_the_variable() {
        let error = run_source("print(missing)").expect_err("expected error");
        assert_eq!(error.to_string(), "Undefined variable 'missing'");
    }

    #[test]
    fn assigning_undeclared_name_is_an_error() {
        assert_eq!(
            run_source("x = 1"),
            Err(RuntimeError::UndeclaredAssignment {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn calling_non_callable_names_kind() {
        let error = run_source("let x = 1 x()").expect_err("expected error");
        assert_eq!(error.to_string(), "Value of kind Number is not callable");
    }

    #[test]
    fn conditions_must_be_boolean() {
        assert_eq!(
            run_source("if 1 print(\"yes\") end"),
            Err(RuntimeError::NonBooleanCondition {
                got: "1".to_string()
            })
        );
        assert!(matches!(
            run_source("while nil end"),
            Err(RuntimeError::NonBooleanCondition { .. })
        ));
    }

    #[test]
    fn assignment_is_right_associative_and_yields_value() {
        let output = run_ok(indoc! {"
            let a
            let b
            print(stringify(a = b = 1))
            print(stringify(a + b))
        "});
        assert_eq!(output, vec!["1", "2"]);
    }

    #[test]
    fn subscript_and_field_access_use_property_lookup() {
        assert_eq!(eval("(1).add(1, 2)"), Ok(Value::Number(3.0)));
        assert_eq!(eval("\"x\"[\"add\"](\"a\", \"b\")"), Ok(Value::string("ab")));
        assert_eq!(eval("true.anything"), Ok(NIL));
        assert_eq!(eval("(1)[2]"), Ok(NIL));
    }

    #[test]
    fn if_elseif_else_selects_one_branch() {
        let source = indoc! {r#"
            fn classify(n)
                if n < 0
                    return "negative"
                elseif n == 0
                    return "zero"
                else
                    return "positive"
                end
            end
            print(classify(0 - 5))
            print(classify(0))
            print(classify(5))
        "#};
        assert_eq!(run_ok(source), vec!["negative", "zero", "positive"]);
    }

    #[test]
    fn while_loop_runs_until_condition_is_false() {
        let source = indoc! {"
            let i = 0
            while i < 3
                print(stringify(i))
                i = i + 1
            end
        "};
        assert_eq!(run_ok(source), vec!["0", "1", "2"]);
    }

    #[test]
    fn early_return_skips_rest_of_enclosing_blocks() {
        let source = indoc! {r#"
            fn find()
                let i = 0
                while true
                    if i == 3
                        return i
                        print("unreachable in if")
                    end
                    i = i + 1
                end
                print("unreachable after loop")
            end
            print(stringify(find()))
            print("caller continues")
        "#};
        assert_eq!(run_ok(source), vec!["3", "caller continues"]);
    }

    #[test]
    fn function_without_return_yields_nil() {
        assert_eq!(eval("fn f() 1 end f()"), Ok(NIL));
    }

    #[test]
    fn missing_arguments_are_nil_and_extra_ones_ignored() {
        let source = indoc! {"
            fn show(a, b)
                print(stringify(a))
                print(stringify(b))
            end
            show(1)
            show(1, 2, 3)
        "};
        assert_eq!(run_ok(source), vec!["1", "nil", "1", "2"]);
    }

    #[test]
    fn declaration_in_function_shadows_outer_binding() {
        let source = indoc! {"
            let x = 1
            fn f()
                let x = 2
                print(stringify(x))
            end
            f()
            print(stringify(x))
        "};
        assert_eq!(run_ok(source), vec!["2", "1"]);
    }

    #[test]
    fn assignment_in_function_mutates_enclosing_binding() {
        let source = indoc! {"
            let counter = 0
            fn bump()
                counter = counter + 1
            end
            bump()
            bump()
            print(stringify(counter))
        "};
        assert_eq!(run_ok(source), vec!["2"]);
    }

    /// Functions do not close over their definition site: a callee resolves
    /// names through the caller's active frames.
    #[test]
    fn callee_sees_caller_locals_through_call_time_chain() {
        let source = indoc! {"
            fn inner()
                print(stringify(secret))
                secret = secret + 1
            end
            fn outer()
                let secret = 41
                inner()
                print(stringify(secret))
            end
            outer()
        "};
        assert_eq!(run_ok(source), vec!["41", "42"]);
    }

    #[test]
    fn callee_cannot_see_locals_after_caller_returns() {
        let source = indoc! {"
            fn inner()
                return secret
            end
            fn outer()
                let secret = 1
                return inner()
            end
            print(stringify(outer()))
            inner()
        "};
        let program = parse(source).expect("parse failed");
        let mut interpreter = Interpreter::new(Vec::new());
        let error = interpreter.run(&program).expect_err("expected error");
        assert_eq!(
            error,
            RuntimeError::UndefinedVariable {
                name: "secret".to_string()
            }
        );
        assert_eq!(interpreter.output(), &vec!["1".to_string()]);
    }

    #[test]
    fn recursion_uses_a_fresh_frame_per_call() {
        let source = indoc! {"
            fn fib(n)
                if n < 2
                    return n
                end
                return fib(n - 1) + fib(n - 2)
            end
            print(stringify(fib(15)))
        "};
        assert_eq!(run_ok(source), vec!["610"]);
    }

    #[test]
    fn error_inside_function_pops_its_frame() {
        let mut interpreter = Interpreter::new(Vec::new());
        let program = parse("fn f() let local = 1 missing() end").expect("parse failed");
        interpreter.run(&program).expect("declaration should run");

        let call = parse("f()").expect("parse failed");
        assert!(interpreter.run(&call).is_err());
        assert_eq!(interpreter.scope().depth(), 0);
        assert!(interpreter.scope().get("local").is_none());
    }

    #[test]
    fn declarations_persist_across_executions() {
        let mut interpreter = Interpreter::new(Vec::new());
        for line in ["let x = 1", "x = x + 1", "print(stringify(x))"] {
            let program = parse(line).expect("parse failed");
            interpreter.run(&program).expect("run failed");
        }
        assert_eq!(interpreter.output(), &vec!["2".to_string()]);
    }

    #[test]
    fn redeclaring_builtin_shadows_it() {
        let mut interpreter = Interpreter::new(Vec::new());
        interpreter.define("stringify", Value::Number(1.0));
        let program = parse("stringify(1)").expect("parse failed");
        assert!(matches!(
            interpreter.run(&program),
            Err(RuntimeError::NotCallable {
                kind: ValueKind::Number
            })
        ));
    }

    #[test]
    fn interactive_run_echoes_expression_values() {
        let program = parse("let x = 2 x * 3 \"s\" print(\"out\")").expect("parse failed");
        let mut interpreter = Interpreter::new(Vec::new());
        interpreter
            .run_interactive(&program)
            .expect("run failed");
        assert_eq!(interpreter.output(), &vec!["6", "\"s\"", "out", "nil"]);
    }

    #[test]
    fn interactive_echo_interleaves_with_printed_output() {
        let program = parse("print(\"a\") 1 print(\"b\")").expect("parse failed");
        let mut interpreter = Interpreter::new(Vec::new());
        interpreter
            .run_interactive(&program)
            .expect("run failed");
        assert_eq!(interpreter.output(), &vec!["a", "nil", "1", "b", "nil"]);
    }

    #[test]
    fn interactive_echo_survives_later_error() {
        let program = parse("1 missing").expect("parse failed");
        let mut interpreter = Interpreter::new(Vec::new());
        assert!(interpreter.run_interactive(&program).is_err());
        assert_eq!(interpreter.output(), &vec!["1"]);
    }

    #[test]
    fn top_level_return_only_stops_the_current_block() {
        let source = indoc! {r#"
            return 1
            print("a")
            if true
                print("b")
                print("c")
            end
        "#};
        assert_eq!(run_ok(source), vec!["a", "b"]);
    }

    #[test]
    fn unbounded_recursion_is_a_runtime_error() {
        let mut interpreter = Interpreter::new(Vec::new());
        let program = parse("fn f() return f() end f()").expect("parse failed");
        assert_eq!(
            interpreter.run(&program),
            Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH
            })
        );
        assert_eq!(interpreter.scope().depth(), 0);
    }

    #[test]
    fn recursion_below_the_limit_succeeds() {
        let source = indoc! {"
            fn count(n)
                if n == 0
                    return 0
                end
                return 1 + count(n - 1)
            end
            print(stringify(count(150)))
        "};
        assert_eq!(run_ok(source), vec!["150"]);
    }

    #[test]
    fn writer_sink_appends_lines() {
        let program = parse("print(\"a\") print(\"b\")").expect("parse failed");
        let mut interpreter = Interpreter::new(WriterSink(Vec::<u8>::new()));
        interpreter.run(&program).expect("run failed");
        assert_eq!(interpreter.into_output().0, b"a\nb\n");
    }
}
