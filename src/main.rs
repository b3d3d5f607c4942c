use cflat::intern::{Builtins, Interner};
use cflat::{checking, lexing, parsing};
use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();
    let path = match args.get(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: cflat <source-file>");
            return ExitCode::FAILURE;
        }
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error reading {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let mut interner = Interner::new();
    Builtins::install(&mut interner);

    let tokens = match lexing::lex(&source) {
        Ok(tokens) => tokens,
        Err(failure) => {
            eprintln!("{}", failure);
            return ExitCode::FAILURE;
        }
    };

    let decls = match parsing::parse(tokens, &mut interner) {
        Ok(decls) => decls,
        Err(failure) => {
            eprintln!("{}", failure);
            return ExitCode::FAILURE;
        }
    };

    let diags = checking::semant(&decls, &interner);

    if diags.has_errors() {
        diags.write_to(std::io::stderr()).expect("write to stderr should not fail");
        eprintln!("Compilation halted due to static semantic errors.");
        ExitCode::FAILURE
    }
    else {
        ExitCode::SUCCESS
    }
}
