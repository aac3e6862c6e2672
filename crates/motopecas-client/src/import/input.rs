use std::fs;
use std::io::{self, IsTerminal, Read};

use crate::import::invalid_input_error;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) source_kind: SourceKind,
    pub(crate) content: String,
}

/// Reads the import body from `path`, or from stdin when the path is `-` or
/// absent. `stdin_override` stands in for the process stdin.
pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
) -> ClientResult<ResolvedSource> {
    if let Some(path) = path.filter(|value| value != "-") {
        let content = fs::read_to_string(&path).map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read import file `{path}`: {error}"),
                vec![
                    "Check that the path exists and that you can read it.".to_string(),
                    "Then rerun motopecas import <path>.".to_string(),
                ],
            )
        })?;
        return Ok(ResolvedSource {
            source_kind: SourceKind::File,
            content,
        });
    }

    let content = match stdin_override {
        Some(value) => value,
        None => read_process_stdin()?,
    };
    if content.trim().is_empty() {
        return Err(invalid_input_error(
            "Nothing to import: pass a file path or pipe JSON/CSV rows on stdin.",
        ));
    }
    Ok(ResolvedSource {
        source_kind: SourceKind::Stdin,
        content,
    })
}

/// An interactive terminal counts as empty input rather than blocking.
fn read_process_stdin() -> ClientResult<String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer).map_err(|error| {
        ClientError::invalid_argument_with_recovery(
            &format!("Could not read stdin: {error}"),
            vec!["Pass the import file path as an argument instead.".to_string()],
        )
    })?;
    Ok(buffer)
}
