use crate::{
    parser,
    token::Spanned,
    type_checker::Checker,
    util::fmt::{self, tree, Show},
};

pub fn format_errors<E>(src: &str, e: &[Spanned<E>]) -> Vec<String>
where
    Spanned<E>: Show,
{
    let ctx = fmt::Context { src };
    e.iter().map(|e| format!("{:#}", e.display(&ctx))).collect()
}

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserExpr(&'static str),
    CheckerProgram(&'static str),
    CheckerExpr(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    TreeError(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let tokens_buf = &mut Vec::with_capacity(1024);

    match test {
        Test::ParserProgram(input) => match parser::parse_program(input, tokens_buf) {
            Ok(prog) => (tree::print_program_string(&prog), vec![]),
            Err(error) => (String::new(), format_errors(input, &[error])),
        },
        Test::ParserExpr(input) => match parser::parse_expr(input, tokens_buf) {
            Ok(expr) => (tree::print_expr_string(&expr), vec![]),
            Err(error) => (String::new(), format_errors(input, &[error])),
        },
        Test::CheckerProgram(input) => {
            let prog = parser::parse_program(input, tokens_buf).expect("failed to parse");
            match Checker::new().check(prog) {
                Ok(prog) => (tree::print_program_string(&prog), vec![]),
                Err((prog, errors)) => (
                    tree::print_program_string(&prog),
                    format_errors(input, &errors),
                ),
            }
        }
        Test::CheckerExpr(input) => {
            let expr = parser::parse_expr(input, tokens_buf).expect("failed to parse");
            match Checker::new().check_expr(expr) {
                Ok(expr) => (tree::print_expr_string(&expr), vec![]),
                Err((expr, errors)) => (
                    tree::print_expr_string(&expr),
                    format_errors(input, &errors),
                ),
            }
        }
    }
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_tree: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::TreeError(expected_tree) => {
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $(let $assertion:ident = $assertion_expected:expr;)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                $(
                    crate::util::test_utils::run_assertion(
                        tree_tests!(@@assertion, $assertion, $assertion_expected),
                        &formatted_actual_tree,
                        &formatted_actual_errors,
                    );
                )*
            }
        )*
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, tree_error, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeError(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, expr), $source:expr) => {
        crate::util::test_utils::Test::ParserExpr($source)
    };
    (@@get_test(checker, program), $source:expr) => {
        crate::util::test_utils::Test::CheckerProgram($source)
    };
    (@@get_test(checker, expr), $source:expr) => {
        crate::util::test_utils::Test::CheckerExpr($source)
    };
}
pub(crate) use tree_tests;
