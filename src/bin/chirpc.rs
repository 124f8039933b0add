use std::{env, error::Error, fs, io, process::ExitCode};

use chirp::runtime::{self, StdRuntime};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let (execute, path) = match (args.next(), args.next(), args.next()) {
        (Some(flag), Some(path), None) if flag == "--run" => (true, path),
        (Some(path), None, None) => (false, path),
        _ => return Err("usage: chirpc [--run] FILE".into()),
    };

    let src = fs::read_to_string(&path)?;
    let unit = match chirp::compile(&src) {
        Ok(unit) => unit,
        Err(error) => return Err(error.render(&src).into()),
    };

    if execute {
        runtime::execute(&unit, &mut StdRuntime::new(io::stdout().lock()))?;
    } else {
        print!("{unit}");
    }
    Ok(())
}
