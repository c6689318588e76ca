//! Pluggable script execution capability.
//!
//! The worker does not execute scripts itself; it bridges to an engine
//! supplied by the embedder. The engine sees the session as both read and
//! write scope, so variables a script creates or modifies stay visible to
//! later commands. Engine failures never surface as protocol errors: the
//! dispatcher folds the diagnostic into the error stream of the response.

use thiserror::Error;

use crate::session::Session;

/// Output captured from one script execution.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Text the script wrote to its output stream.
    pub stdout: String,
    /// Text the script wrote to its error stream.
    pub stderr: String,
}

/// Failure raised inside an executed script.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScriptError {
    /// Diagnostic trace for the error stream.
    pub message: String,
}

impl ScriptError {
    /// Create an error with the given diagnostic.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A script execution capability.
pub trait ScriptEngine: Send {
    /// Execute `source` against the session environment, returning the
    /// captured output streams.
    fn execute(
        &mut self,
        source: &str,
        session: &mut Session,
    ) -> Result<ScriptOutput, ScriptError>;
}

impl<F> ScriptEngine for F
where
    F: FnMut(&str, &mut Session) -> Result<ScriptOutput, ScriptError> + Send,
{
    fn execute(
        &mut self,
        source: &str,
        session: &mut Session,
    ) -> Result<ScriptOutput, ScriptError> {
        self(source, session)
    }
}

/// Engine used when no scripting runtime is configured: every execution
/// fails with a diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngine;

impl ScriptEngine for NullEngine {
    fn execute(
        &mut self,
        _source: &str,
        _session: &mut Session,
    ) -> Result<ScriptOutput, ScriptError> {
        Err(ScriptError::new("no script engine is configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_null_engine_always_fails() {
        let mut session = Session::new();
        let result = NullEngine.execute("print(1)", &mut session);
        assert!(result.is_err());
    }

    #[test]
    fn test_closure_engine_mutates_session() {
        let mut engine = |source: &str, session: &mut Session| {
            session.set("ran", Value::Text(source.to_string()));
            Ok(ScriptOutput {
                stdout: "done\n".to_string(),
                stderr: String::new(),
            })
        };

        let mut session = Session::new();
        let output = engine.execute("x = 1", &mut session).unwrap();
        assert_eq!(output.stdout, "done\n");
        assert_eq!(session.get("ran"), Some(&Value::Text("x = 1".into())));
    }

    #[test]
    fn test_script_error_display() {
        let err = ScriptError::new("Traceback: boom");
        assert_eq!(err.to_string(), "Traceback: boom");
    }
}
