use chirp::{lexer, parser};
use criterion::{criterion_group, criterion_main, Criterion};
use std::{fmt::Write, hint::black_box};

/// Same shape as the lexer benchmark input, parsed all the way to an AST.
fn big_program() -> String {
    let mut src = String::with_capacity(128 * 1024);
    for i in 0..2_000u32 {
        writeln!(src, "print {i} + {i}.5 * ({i} - 2); // statement {i}").unwrap();
        writeln!(src, "print print_char('x');").unwrap();
    }
    src
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = big_program();

    c.bench_function("parser/program", |b| {
        let tokens = &mut Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
        b.iter(|| {
            tokens.clear();
            let program =
                parser::parse_program(black_box(&input), tokens).expect("parses cleanly");
            black_box(program.statements.len());
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
