//! Output, redirection, file lookup and the sandbox.
//!
//! `ToFile`, `FindFile` and `SystemCall` touch the host and fail with
//! `SecurityBreach` while the evaluator is sandboxed.

use std::path::{Path, PathBuf};
use std::process::Command;

use tern_ir::Expr;
use tern_patterns::{arg_type_error, file_not_found, EvalError, EvalResult};

use super::Call;
use crate::output::OutputHandler;
use crate::Evaluator;

pub(super) fn write(ev: &mut Evaluator, call: Call) -> EvalResult {
    for index in 1..=call.arity() {
        let text = ev.arg(call, index).to_string();
        ev.write_output(&text)?;
    }
    Ok(Expr::boolean(true))
}

pub(super) fn write_string(ev: &mut Evaluator, call: Call) -> EvalResult {
    let text = ev.string_arg(call, 1)?;
    ev.write_output(&text)?;
    Ok(Expr::boolean(true))
}

pub(super) fn new_line(ev: &mut Evaluator, _call: Call) -> EvalResult {
    ev.write_output("\n")?;
    Ok(Expr::boolean(true))
}

/// Print the operand in prefix form, one line, and return it.
pub(super) fn full_form(ev: &mut Evaluator, call: Call) -> EvalResult {
    let value = ev.arg(call, 1);
    ev.write_output(&format!("{value}\n"))?;
    Ok(value)
}

fn io_error(context: &str, error: &std::io::Error) -> EvalError {
    EvalError::new(format!("{context}: {error}"))
}

/// Evaluate `body` with output redirected to an already pushed sink, popping
/// the sink on every path.
fn redirected(ev: &mut Evaluator, body: &Expr) -> EvalResult {
    let result = ev.eval(body);
    let closed = ev.output.pop();
    let value = result?;
    closed.map_err(|e| io_error("closing output", &e))?;
    Ok(value)
}

/// Evaluate the body and return everything it wrote as a string.
pub(super) fn to_string(ev: &mut Evaluator, call: Call) -> EvalResult {
    let body = ev.arg(call, 1);
    let (handler, buffer) = OutputHandler::buffer();
    ev.output.push_handler(handler);
    redirected(ev, &body)?;
    Ok(Expr::string(&buffer.take()))
}

/// Evaluate the body with output sent back to the evaluator's base sink.
pub(super) fn to_stdout(ev: &mut Evaluator, call: Call) -> EvalResult {
    let body = ev.arg(call, 1);
    let base = ev.output.base().clone();
    ev.output.push_handler(base);
    redirected(ev, &body)
}

/// `ToFile(name, body)`: the file is created (or truncated) first.
pub(super) fn to_file(ev: &mut Evaluator, call: Call) -> EvalResult {
    ev.require_host_access(call.name())?;
    let name = ev.eval_arg(call, 1)?;
    let path = match name.as_atom() {
        Some(atom) if atom.is_string() => PathBuf::from(atom.unquoted()),
        _ => return Err(arg_type_error(call.name(), 1, "a file name")),
    };
    let body = ev.arg(call, 2);
    ev.output.push_file(&path).map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "cannot open output file");
        file_not_found(&path.display().to_string())
    })?;
    redirected(ev, &body)
}

fn locate(ev: &Evaluator, name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    ev.config()
        .input_directories
        .iter()
        .map(|dir| dir.join(name))
        .chain(std::iter::once(direct.to_path_buf()))
        .find(|candidate| candidate.is_file())
}

/// Full path of the first match in the input directories, then the working
/// directory; `""` if there is none.
pub(super) fn find_file(ev: &mut Evaluator, call: Call) -> EvalResult {
    ev.require_host_access(call.name())?;
    let name = ev.string_arg(call, 1)?;
    let found = locate(ev, &name)
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    Ok(Expr::string(&found))
}

pub(super) fn default_directory(ev: &mut Evaluator, call: Call) -> EvalResult {
    let dir = ev.string_arg(call, 1)?;
    tracing::debug!(dir, "add input directory");
    ev.config_mut().input_directories.push(PathBuf::from(dir));
    Ok(Expr::boolean(true))
}

/// Run a shell command; yields whether it exited successfully.
pub(super) fn system_call(ev: &mut Evaluator, call: Call) -> EvalResult {
    ev.require_host_access(call.name())?;
    let command = ev.string_arg(call, 1)?;
    tracing::debug!(command, "system call");
    let status = if cfg!(windows) {
        Command::new("cmd").args(["/C", &command]).status()
    } else {
        Command::new("sh").args(["-c", &command]).status()
    };
    let status = status.map_err(|e| io_error("system call", &e))?;
    Ok(Expr::boolean(status.success()))
}

pub(super) fn secure(ev: &mut Evaluator, call: Call) -> EvalResult {
    let body = ev.arg(call, 1);
    ev.eval_secure(&body)
}
