//! luagrep Parser - Recursive descent parser
//!
//! Parses Lua dialect source code into a chunk of statements.
//! Dialect notes:
//! - `x += e` and friends desugar to plain assignments (`x = x + e`)
//! - `continue` is a statement
//! - `function a.b:c() end` gets an implicit leading `self` parameter

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use luagrep_ast::Chunk;
use luagrep_lexer::tokenize;

/// Parse a source string into a chunk
pub fn parse(source: &str) -> Result<Chunk, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_chunk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use luagrep_ast::*;
    use pretty_assertions::assert_eq;

    fn parse_one(source: &str) -> Stmt {
        let mut chunk = parse(source).expect("parse failed");
        assert_eq!(chunk.len(), 1, "expected a single statement");
        chunk.remove(0)
    }

    fn parse_value(source: &str) -> Expr {
        match parse_one(&format!("local v = {}", source)).kind {
            StmtKind::Local { mut values, .. } => values.remove(0),
            other => panic!("expected local, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_every_statement_kind() {
        let source = r#"
            local a, b = 1, "two"
            a = b
            print(a)
            do local c = 3 end
            while a < 10 do a += 1 end
            repeat a = a - 1 until a == 0
            local function f(x, ...) return x end
            function t.g:h() end
            if a then break elseif b then continue else return end
            for i = 1, 10, 2 do end
            for k, v in pairs(t) do end
        "#;
        let chunk = parse(source).expect("parse failed");
        let kinds: Vec<_> = chunk.iter().map(|s| s.kind_name()).collect();
        assert_eq!(
            kinds,
            vec![
                "local",
                "assignment",
                "call",
                "do",
                "while",
                "repeat",
                "local function",
                "function",
                "if",
                "numeric for",
                "generic for",
            ]
        );
    }

    #[test]
    fn test_compound_assignment_desugars() {
        let stmt = parse_one("count += 1");
        let StmtKind::Assign { targets, values } = stmt.kind else {
            panic!("expected assignment");
        };
        assert_eq!(targets.len(), 1);
        assert!(matches!(
            values[0].kind,
            ExprKind::Arithmetic { op: ArithOp::Add, .. }
        ));
    }

    #[test]
    fn test_precedence() {
        let expr = parse_value("1 + 2 * 3");
        let ExprKind::Arithmetic { op, right, .. } = expr.kind else {
            panic!("expected arithmetic");
        };
        assert_eq!(op, ArithOp::Add);
        assert!(matches!(right.kind, ExprKind::Arithmetic { op: ArithOp::Mul, .. }));

        let expr = parse_value("a or b and c");
        assert!(matches!(expr.kind, ExprKind::Logical { op: LogicOp::Or, .. }));

        let expr = parse_value("-x ^ 2");
        let ExprKind::Unary { op, operand } = expr.kind else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Neg);
        assert!(matches!(operand.kind, ExprKind::Arithmetic { op: ArithOp::Pow, .. }));
    }

    #[test]
    fn test_concat_is_right_associative() {
        let expr = parse_value("a .. b .. c");
        let ExprKind::Concat { left, right } = expr.kind else {
            panic!("expected concat");
        };
        assert!(matches!(left.kind, ExprKind::Ident(_)));
        assert!(matches!(right.kind, ExprKind::Concat { .. }));
    }

    #[test]
    fn test_dot_access_is_string_index() {
        let expr = parse_value("a.b");
        let ExprKind::Index { object, key } = expr.kind else {
            panic!("expected index");
        };
        assert_eq!(object.kind, ExprKind::Ident("a".into()));
        assert_eq!(key.kind, ExprKind::String("b".into()));
    }

    #[test]
    fn test_parenthesized_call_adjusts_results() {
        let ExprKind::Call(call) = parse_value("(f())").kind else {
            panic!("expected call");
        };
        assert!(call.adjust_ret);

        let ExprKind::Call(call) = parse_value("f()").kind else {
            panic!("expected call");
        };
        assert!(!call.adjust_ret);
    }

    #[test]
    fn test_method_call_and_sugar() {
        let ExprKind::Call(call) = parse_value("obj:send \"hi\"").kind else {
            panic!("expected call");
        };
        match call.target {
            CallTarget::Method { method, .. } => assert_eq!(method, "send"),
            other => panic!("expected method call, got {:?}", other),
        }
        assert_eq!(call.args.len(), 1);
        assert_eq!(call.args[0].kind, ExprKind::String("hi".into()));

        let ExprKind::Call(call) = parse_value("f{1, 2}").kind else {
            panic!("expected call");
        };
        assert!(matches!(call.args[0].kind, ExprKind::Table(ref fields) if fields.len() == 2));
    }

    #[test]
    fn test_method_function_gets_self() {
        let stmt = parse_one("function a.b:c(x) end");
        let StmtKind::Function { target, method, func } = stmt.kind else {
            panic!("expected function statement");
        };
        assert!(matches!(target.kind, ExprKind::Index { .. }));
        assert_eq!(method.as_deref(), Some("c"));
        let names: Vec<_> = func.params.names.iter().filter_map(|b| b.name()).collect();
        assert_eq!(names, vec!["self", "x"]);
    }

    #[test]
    fn test_elseif_nests_in_else_branch() {
        let stmt = parse_one("if a then x() elseif b then y() else z() end");
        let StmtKind::If { else_body, .. } = stmt.kind else {
            panic!("expected if");
        };
        assert_eq!(else_body.len(), 1);
        let StmtKind::If { else_body: inner_else, .. } = &else_body[0].kind else {
            panic!("expected nested if");
        };
        assert_eq!(inner_else.len(), 1);
    }

    #[test]
    fn test_table_fields() {
        let ExprKind::Table(fields) = parse_value("{1, x = 2, [k] = 3; 4}").kind else {
            panic!("expected table");
        };
        assert_eq!(fields.len(), 4);
        assert!(fields[0].key.is_none());
        assert_eq!(
            fields[1].key.as_ref().map(|k| &k.kind),
            Some(&ExprKind::String("x".into()))
        );
        assert!(matches!(
            fields[2].key.as_ref().map(|k| &k.kind),
            Some(ExprKind::Ident(_))
        ));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_value(r#""a\tb\n\65\x42""#).kind,
            ExprKind::String("a\tb\nAB".into())
        );
        assert_eq!(
            parse_value("[[\nline]]").kind,
            ExprKind::String("line".into())
        );
    }

    #[test]
    fn test_vararg_function() {
        let ExprKind::Function(func) = parse_value("function(a, ...) return ... end").kind else {
            panic!("expected function");
        };
        assert!(func.params.has_varargs);
        assert_eq!(func.params.names.len(), 1);
        assert_eq!(func.body.len(), 1);
    }

    #[test]
    fn test_statement_spans_cover_source() {
        let source = "local x = 1\nprint(x)";
        let chunk = parse(source).expect("parse failed");
        assert_eq!(chunk[0].span.text(source), Some("local x = 1"));
        assert_eq!(chunk[1].span.text(source), Some("print(x)"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("x + 1"),
            Err(ParseError::InvalidStatement { .. })
        ));
        assert!(matches!(
            parse("f() = 1"),
            Err(ParseError::InvalidAssignmentTarget { .. })
        ));
        assert!(matches!(
            parse("while true do"),
            Err(ParseError::UnexpectedEof { .. })
        ));
        assert!(matches!(parse("local $ = 1"), Err(ParseError::InvalidToken { .. })));
        assert!(matches!(
            parse("local = 1"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let parens = format!("x = {}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            parse(&parens),
            Err(ParseError::TooDeep { limit: MAX_NESTING, .. })
        ));

        let blocks = format!(
            "{}{}",
            "do ".repeat(MAX_NESTING + 1),
            "end ".repeat(MAX_NESTING + 1)
        );
        let err = parse(&blocks).expect_err("too many nested blocks");
        assert!(matches!(err, ParseError::TooDeep { .. }));
        assert_eq!(err.span().text(&blocks), Some("do"));
    }

    #[test]
    fn test_long_operator_chain_is_not_nesting() {
        let terms = vec!["a"; 1_000].join(" + ");
        let expr = parse_value(&terms);
        assert!(matches!(expr.kind, ExprKind::Arithmetic { op: ArithOp::Add, .. }));

        let nested = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse_value(&nested).kind, ExprKind::Number("1".into()));
    }
}
