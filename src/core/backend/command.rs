//! Backend that runs the model through an external inference program.
//!
//! Each call spawns the configured program, writes one JSON request
//! (`{"texts": [...], "src_lang": "eng_Latn", "tgt_lang": "hin_Deva"}`) to its
//! stdin and expects `{"translations": [...]}` or `{"error": "..."}` on stdout.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::backend::{warm_up, BackendLoader, TranslationBackend, WireRequest, WireResponse};
use crate::core::config::BridgeConfig;
use crate::core::errors::{BridgeError, Result};
use crate::core::language::LanguageTag;

/// Environment variable through which the worker learns where the model lives
pub const MODEL_DIR_ENV: &str = "INDICTRANS_MODEL_DIR";

/// Stderr lines that are library chatter, not errors
const STDERR_NOISE: &[&str] = &["FutureWarning", "resume_download", "huggingface_hub", "UserWarning"];

/// Drop warning chatter from a worker's stderr
pub(crate) fn filter_stderr(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !STDERR_NOISE.iter().any(|noise| line.contains(noise)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_output(stdout: &[u8], expected: usize) -> Result<Vec<String>> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();

    // Workers sometimes print progress lines before the answer, which may
    // itself span several lines
    let response = serde_json::from_str::<WireResponse>(trimmed).or_else(|first_err| {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(trimmed.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        line_starts
            .into_iter()
            .rev()
            .filter(|&start| trimmed[start..].trim_start_matches([' ', '\t']).starts_with('{'))
            .find_map(|start| serde_json::from_str::<WireResponse>(&trimmed[start..]).ok())
            .ok_or_else(|| BridgeError::InvalidResponseError {
                message: format!("unparseable worker output: {}", first_err),
            })
    })?;

    response.into_translations(expected)
}

/// Runs one worker process per translation call
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    model_dir: Option<PathBuf>,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>, model_dir: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            model_dir,
        }
    }
}

#[async_trait]
impl TranslationBackend for CommandBackend {
    async fn translate(
        &self,
        texts: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<String>> {
        let payload = serde_json::to_vec(&WireRequest {
            texts,
            src_lang: source,
            tgt_lang: target,
        })?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.model_dir {
            command.env(MODEL_DIR_ENV, dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| BridgeError::config(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::inference("worker stdin unavailable"))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        if let Ok(Err(e)) = writer.await {
            debug!("Writing request to {} failed: {}", self.program, e);
        }

        if !output.status.success() {
            let stderr = filter_stderr(&String::from_utf8_lossy(&output.stderr));
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                format!("{} exited with {}: {}", self.program, output.status, stderr)
            };
            return Err(BridgeError::inference(message));
        }

        parse_output(&output.stdout, texts.len())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Validates the model location, then builds and warms a [`CommandBackend`]
#[derive(Debug, Clone)]
pub struct CommandLoader {
    command: Vec<String>,
    model_dir: Option<PathBuf>,
    timeout: Duration,
}

impl CommandLoader {
    pub fn new(command: Vec<String>, model_dir: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            command,
            model_dir,
            timeout,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.command.clone(), config.model_dir.clone(), config.timeout())
    }
}

#[async_trait]
impl BackendLoader for CommandLoader {
    async fn load(&self) -> Result<Arc<dyn TranslationBackend>> {
        if let Some(dir) = &self.model_dir {
            if !dir.exists() {
                return Err(BridgeError::config(format!(
                    "model artifact not found at {}",
                    dir.display()
                )));
            }
        }

        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| BridgeError::config("no worker command configured"))?;

        info!("Starting worker {} {:?}", program, args);
        let backend = CommandBackend::new(program.clone(), args.to_vec(), self.model_dir.clone());
        warm_up(&backend, self.timeout).await?;

        Ok(Arc::new(backend))
    }

    fn name(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("command")
    }
}
