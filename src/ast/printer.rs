//! Debug view of a parsed program as a labelled tree.
use std::fmt;

use super::{Expression, Program, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    pub fn new(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    fn list<'a, T: 'a>(label: &str, items: impl IntoIterator<Item = &'a T>) -> Self
    where
        TreeNode: From<&'a T>,
    {
        Self::new(label, items.into_iter().map(TreeNode::from).collect())
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        for (index, child) in self.children.iter().enumerate() {
            let last = index + 1 == self.children.len();
            let (branch, indent) = if last {
                ("╰── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            writeln!(f, "{prefix}{branch}{}", child.label)?;
            child.render(f, &format!("{prefix}{indent}"))?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        self.render(f, "")
    }
}

impl From<&Program> for TreeNode {
    fn from(program: &Program) -> Self {
        TreeNode::list("Program", &program.statements)
    }
}

impl From<&Statement> for TreeNode {
    fn from(statement: &Statement) -> Self {
        match statement {
            Statement::Declaration { name, initializer } => TreeNode::new(
                "Declaration",
                vec![variable(name), TreeNode::from(initializer)],
            ),
            Statement::FunctionDeclaration { name, params, body } => TreeNode::new(
                "FunctionDeclaration",
                vec![
                    variable(name),
                    TreeNode::new("Parameters", params.iter().map(|p| variable(p)).collect()),
                    TreeNode::list("Body", body.iter()),
                ],
            ),
            Statement::Expression(expr) => {
                TreeNode::new("ExpressionStatement", vec![TreeNode::from(expr)])
            }
            Statement::Return(expr) => TreeNode::new("ReturnStatement", vec![TreeNode::from(expr)]),
            Statement::If {
                condition,
                then_body,
                else_body,
            } => TreeNode::new(
                "IfStatement",
                vec![
                    TreeNode::from(condition),
                    TreeNode::list("IfBody", then_body),
                    TreeNode::list("ElseBody", else_body),
                ],
            ),
            Statement::While { condition, body } => TreeNode::new(
                "WhileLoop",
                vec![TreeNode::from(condition), TreeNode::list("Body", body)],
            ),
        }
    }
}

impl From<&Expression> for TreeNode {
    fn from(expr: &Expression) -> Self {
        match expr {
            Expression::Number(value) => TreeNode::leaf(format!("Number({value})")),
            Expression::String(value) => TreeNode::leaf(format!("String({value:?})")),
            Expression::Boolean(value) => TreeNode::leaf(format!("Boolean({value})")),
            Expression::Nil => TreeNode::leaf("nil"),
            Expression::Binary { op, left, right } => TreeNode::new(
                format!("{op:?}"),
                vec![TreeNode::from(left.as_ref()), TreeNode::from(right.as_ref())],
            ),
            Expression::Assignment { name, value } => TreeNode::new(
                "Assignment",
                vec![variable(name), TreeNode::from(value.as_ref())],
            ),
            Expression::Call { callee, args } => TreeNode::new(
                "FunctionCall",
                vec![
                    TreeNode::from(callee.as_ref()),
                    TreeNode::list("Arguments", args),
                ],
            ),
            Expression::Subscript { object, key } => TreeNode::new(
                "Subscript",
                vec![TreeNode::from(object.as_ref()), TreeNode::from(key.as_ref())],
            ),
            Expression::Variable(name) => variable(name),
        }
    }
}

fn variable(name: &str) -> TreeNode {
    TreeNode::leaf(format!("Variable({name})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use indoc::indoc;

    #[test]
    fn renders_nested_program() {
        let program = parse("let x = 1 + 2 * 3").expect("parse failed");
        let rendered = TreeNode::from(&program).to_string();
        let expected = indoc! {"
            Program
            ╰── Declaration
                ├── Variable(x)
                ╰── Plus
                    ├── Number(1)
                    ╰── Multiply
                        ├── Number(2)
                        ╰── Number(3)
        "};
        assert_eq!(rendered, expected);
    }

    #[test]
    fn renders_every_statement_kind() {
        let input = indoc! {r#"
            fn f(a, b)
                if a < b
                    return a
                elseif a == b
                    return nil
                else
                    while true
                        b = b - 1
                    end
                end
            end
            print(f(1, 2).add["x"])
            let s = "str"
            let flag = false
        "#};
        let program = parse(input).expect("parse failed");
        let rendered = TreeNode::from(&program).to_string();
        for label in [
            "FunctionDeclaration",
            "Parameters",
            "IfStatement",
            "IfBody",
            "ElseBody",
            "WhileLoop",
            "ReturnStatement",
            "Assignment",
            "ExpressionStatement",
            "FunctionCall",
            "Arguments",
            "Subscript",
            "String(\"add\")",
            "String(\"str\")",
            "Boolean(false)",
            "Boolean(true)",
            "nil",
            "Equal",
            "Minus",
        ] {
            assert!(rendered.contains(label), "missing {label} in:\n{rendered}");
        }
    }
}
