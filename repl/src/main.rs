//! Monkey interpreter.
//!
//! Runs a source file when given a path,
//! otherwise starts an interactive session.
use rustyline::{DefaultEditor, error::ReadlineError};
use simian_core::{Context, Environment, Stdout, parse};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

const PROMPT: &str = ">> ";

/// Monkey language interpreter.
#[derive(argh::FromArgs)]
struct Args {
    /// source file to run. Starts an interactive session if omitted.
    #[argh(positional)]
    path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

fn main() -> ExitCode {
    #[cfg(feature = "tracing")]
    logging::enable();

    let default_panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        panic_hook(panic_info);
        default_panic_hook(panic_info);
    }));

    let args: Args = argh::from_env();
    let result = match args.path {
        Some(path) => run_file(path),
        None => repl().map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::error!(?err);

            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Run a file to completion.
/// Fails on parse errors and runtime errors.
fn run_file(path: PathBuf) -> Result<ExitCode, Error> {
    let src = match fs::read_to_string(&path) {
        Ok(src) => src,
        Err(source) => return Err(Error::Read { path, source }),
    };

    if run_source(&src, &mut io::stdout(), &mut Stdout)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Evaluate a whole program and write its result to `out`.
/// Returns whether the program parsed and ran without a runtime error.
fn run_source(src: &str, out: &mut impl Write, ctx: &mut dyn Context) -> Result<bool, Error> {
    let program = match parse::parse(src) {
        Ok(program) => program,
        Err(errors) => {
            write_parser_errors(out, &errors)?;
            return Ok(false);
        }
    };

    let result = simian_core::eval::eval(&program, &Environment::new(), ctx);
    writeln!(out, "{}", result.inspect())?;
    Ok(!result.is_error())
}

/// Read, evaluate, print loop.
/// Bindings persist for the whole session.
fn repl() -> Result<(), Error> {
    let mut editor = DefaultEditor::new()?;
    let env = Environment::new();
    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        if line.trim().is_empty() {
            continue;
        }
        editor.add_history_entry(line.as_str())?;

        let program = match parse::parse(&line) {
            Ok(program) => program,
            Err(errors) => {
                write_parser_errors(&mut io::stdout(), &errors)?;
                continue;
            }
        };

        let result = simian_core::eval::eval(&program, &env, &mut Stdout);
        println!("{}", result.inspect());
    }

    Ok(())
}

fn write_parser_errors(out: &mut impl Write, errors: &parse::error::Errors) -> io::Result<()> {
    writeln!(out, " parser errors:")?;
    for message in errors.messages() {
        writeln!(out, "\t{message}")?;
    }
    Ok(())
}

fn panic_hook(panic_info: &std::panic::PanicHookInfo) {
    let payload = if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
        Some(&**payload)
    } else if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
        Some(payload.as_str())
    } else {
        None
    };

    let location = panic_info.location().map(|location| location.to_string());
    #[cfg(feature = "tracing")]
    tracing::error!("interpreter panicked at {location:?}: {payload:?}");
    #[cfg(not(feature = "tracing"))]
    let _ = (location, payload);
}

#[cfg(feature = "tracing")]
mod logging {
    use std::io;
    use tracing_subscriber::{
        EnvFilter, Registry,
        fmt::{self, time::UtcTime},
        prelude::*,
    };

    /// Enable logging.
    /// Logs go to stderr so they do not mix with program output.
    pub fn enable() {
        let console_logger = fmt::layer()
            .with_writer(io::stderr)
            .with_timer(UtcTime::rfc_3339())
            .pretty();

        let subscriber = Registry::default()
            .with(EnvFilter::from_default_env())
            .with(console_logger);

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("could not enable logging: {err}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use argh::FromArgs;
    use simian_core::Captured;

    fn run_to_string(src: &str) -> (bool, String, Vec<String>) {
        let mut out = Vec::new();
        let mut ctx = Captured::default();
        let ok = run_source(src, &mut out, &mut ctx).unwrap();
        (ok, String::from_utf8(out).unwrap(), ctx.lines)
    }

    #[test]
    fn args_path_is_optional() {
        let args = Args::from_args(&["simian"], &[]).unwrap();
        assert!(args.path.is_none());

        let args = Args::from_args(&["simian"], &["script.monkey"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("script.monkey")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = PathBuf::from("does/not/exist.monkey");
        let Err(Error::Read { path: err_path, .. }) = run_file(path.clone()) else {
            panic!("expected read error");
        };
        assert_eq!(err_path, path);
    }

    #[test]
    fn file_prints_final_result() {
        let (ok, out, lines) = run_to_string("puts(\"hi\"); 1 + 2");
        assert!(ok);
        assert_eq!(out, "3\n");
        assert_eq!(lines, vec!["hi".to_string()]);

        let (ok, out, _) = run_to_string("puts(1)");
        assert!(ok);
        assert_eq!(out, "null\n");
    }

    #[test]
    fn file_runtime_error_fails() {
        let (ok, out, _) = run_to_string("let x = 1; x + true; 5");
        assert!(!ok);
        assert_eq!(out, "ERROR: type mismatch: INTEGER + BOOLEAN\n");
    }

    #[test]
    fn file_parse_errors_fail() {
        let (ok, out, lines) = run_to_string("let x 5; puts(1)");
        assert!(!ok);
        assert_eq!(
            out,
            " parser errors:\n\texpected next token to be =. Got INT instead\n"
        );
        assert!(lines.is_empty());
    }
}
