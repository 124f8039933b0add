/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The type checker takes an untyped AST, checks the soundness of its types,
/// and maps it into a typed AST.
pub mod type_checker;

/// The code generator lowers a typed AST into a straight-line instruction
/// sequence for the external backend.
pub mod codegen;

/// The entry points generated code calls for observable output, plus a
/// reference executor.
pub mod runtime;

pub mod ast;
pub mod ir;
pub mod token;
pub mod types;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

use crate::{ir::CompiledUnit, token::Spanned, util::fmt::Show};

/// A failed compilation. No unit is produced; the stage that failed decides
/// the variant.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Lexing or parsing failed (the parser runs the lexer).
    Parse(Spanned<parser::Error>),
    Check(Vec<Spanned<type_checker::Error>>),
}

impl Error {
    /// Formats every diagnostic against the source, one per line.
    pub fn render(&self, src: &str) -> String {
        let ctx = util::fmt::Context { src };
        let errors: Vec<String> = match self {
            Error::Parse(error) => vec![format!("{:#}", error.display(&ctx))],
            Error::Check(errors) => errors
                .iter()
                .map(|error| format!("{:#}", error.display(&ctx)))
                .collect(),
        };
        errors.join("\n")
    }
}

/// Runs the full pipeline over the provided source, producing the compiled
/// unit handed to the external backend.
pub fn compile(src: &str) -> Result<CompiledUnit, Error> {
    let tokens = &mut Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let program = parser::parse_program(src, tokens).map_err(Error::Parse)?;
    let program = type_checker::Checker::new()
        .check(program)
        .map_err(|(_, errors)| Error::Check(errors))?;
    Ok(codegen::generate(&program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_renders_ir_text() {
        let unit = compile("print 2 + 3;").unwrap();
        assert_eq!(
            unit.to_string(),
            indoc! {"
                import print_int
                r0 = const int 2
                r1 = const int 3
                r2 = add int r0, r1
                call print_int r2
            "}
        );
    }

    #[test]
    fn test_failed_check_produces_no_unit() {
        let error = compile("print 1 + 'a';").unwrap_err();
        assert_eq!(
            error.render("print 1 + 'a';"),
            "6..13: cannot apply operator + to operands of type Int and Char"
        );
    }

    #[test]
    fn test_render_reports_every_check_error() {
        let src = "print 1 + 'a'; print nope(2);";
        let rendered = compile(src).unwrap_err().render(src);
        assert_eq!(
            rendered,
            indoc! {"
                6..13: cannot apply operator + to operands of type Int and Char
                21..25: undefined function nope"
            }
        );
    }

    #[test]
    fn test_render_parse_error() {
        let src = "print 1";
        assert_eq!(
            compile(src).unwrap_err().render(src),
            "7..7: expected token Semicolon, but got Eof"
        );
    }

    #[test]
    fn test_render_lex_error_with_position() {
        let src = "print 1;\nprint ?;";
        assert_eq!(
            compile(src).unwrap_err().render(src),
            "15..16: unexpected character '?' at line 2, column 7"
        );
    }
}
