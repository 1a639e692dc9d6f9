//! GitHub Actions host adapter: inputs from `INPUT_*`, outputs to `$GITHUB_OUTPUT`,
//! annotations as workflow commands on stdout.

use skipper_engine::{ConfigProvider, Reporter};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Reads action inputs the way the runner exports them.
#[derive(Debug, Clone, Default)]
pub struct ActionsInputs;

impl ActionsInputs {
    pub fn env_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl ConfigProvider for ActionsInputs {
    fn get_string(&self, name: &str) -> Option<String> {
        std::env::var(Self::env_name(name))
            .ok()
            .map(|value| value.trim().to_string())
    }
}

pub struct ActionsReporter {
    output_file: Option<PathBuf>,
}

impl ActionsReporter {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    fn append_output(&self, name: &str, value: &str) -> io::Result<bool> {
        let Some(path) = &self.output_file else {
            return Ok(false);
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(format_output(name, value).as_bytes())?;
        Ok(true)
    }
}

impl Reporter for ActionsReporter {
    fn info(&self, message: &str) {
        emit(message);
    }

    fn warning(&self, message: &str) {
        emit(&format!("::warning::{}", escape_data(message)));
    }

    fn set_output(&self, name: &str, value: &str) {
        match self.append_output(name, value) {
            Ok(true) => {}
            Ok(false) => emit(&format!("{name}={value}")),
            Err(err) => {
                log::warn!("failed to write output '{name}': {err}");
                emit(&format!("{name}={value}"));
            }
        }
    }

    fn fail(&self, message: &str) {
        emit(&format!("::error::{}", escape_data(message)));
    }
}

fn emit(line: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(line.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() != io::ErrorKind::BrokenPipe {
            log::warn!("failed to write to stdout: {err}");
        }
    }
}

fn format_output(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        let delimiter = format!("ghadelimiter_{}", std::process::id());
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    }
}

/// Percent-encoding required for workflow command payloads.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
