use super::{parse_predictions, ImageClassifier, ModelLoader};
use crate::error::EcoConvertError;
use crate::model::Prediction;
use crate::upload::SelectedImage;
use std::io::Write;
use std::process::{Command, Output};

/// Classifier backed by an external program.
///
/// The program is invoked as `<program> [args...] <image-path>` and must
/// print a JSON array of `{"label", "confidence"}` objects (or the
/// classifier-native `{"className", "probability"}`) on stdout, most
/// confident first.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, command: &mut Command) -> Result<Output, EcoConvertError> {
        command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EcoConvertError::ClassifierNotFound {
                    program: self.program.clone(),
                }
            } else {
                EcoConvertError::Classification(format!("{} failed to start: {}", self.program, e))
            }
        })
    }
}

impl ModelLoader for CommandClassifier {
    /// Probe the program with `--version` so a missing or broken install is
    /// reported before the first image is analyzed.
    fn load(&self) -> Result<Box<dyn ImageClassifier>, EcoConvertError> {
        let output = self
            .run(Command::new(&self.program).arg("--version"))
            .map_err(|e| match e {
                EcoConvertError::Classification(msg) => EcoConvertError::ModelUnavailable(msg),
                other => other,
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EcoConvertError::ModelUnavailable(format!(
                "{} --version exited with code {}: {}",
                self.program, code, stderr
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(
            program = %self.program,
            version = %version.trim(),
            "classifier program available"
        );
        Ok(Box::new(self.clone()))
    }

    fn backend_name(&self) -> &str {
        "command"
    }
}

impl ImageClassifier for CommandClassifier {
    fn classify(&self, image: &SelectedImage) -> Result<Vec<Prediction>, EcoConvertError> {
        // Write image bytes to a temp file the program can open.
        let mut tmpfile = tempfile::Builder::new()
            .prefix("ecoconvert-")
            .suffix(&format!(".{}", image.extension()))
            .tempfile()
            .map_err(|e| EcoConvertError::Classification(e.to_string()))?;
        tmpfile
            .write_all(image.bytes())
            .map_err(|e| EcoConvertError::Classification(e.to_string()))?;

        let output = self.run(
            Command::new(&self.program)
                .args(&self.args)
                .arg(tmpfile.path()),
        )?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(EcoConvertError::ClassifierFailed { code, stderr });
        }

        parse_predictions(&output.stdout)
    }

    fn backend_name(&self) -> &str {
        "command"
    }
}
