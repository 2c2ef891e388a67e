//! Interactive retrieval loop: one decision and at most one download per
//! record, strictly sequential.
//!
//! Per record the flow is
//! `Presented -> AwaitingDecision -> {Skipped | Downloading -> {Downloaded | DownloadFailed}}`;
//! a record without a PDF URL goes straight to `Skipped` without prompting.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::models::Paper;
use crate::ui;
use crate::utils::{download_pdf, target_path, HttpClient};

/// Operator input for the loop. Production reads stdin; tests script it.
pub trait Prompter: Send {
    /// Show `prompt` and return one line of operator input.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompter backed by the interactive console.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line)
    }
}

/// A scripted prompter for tests: answers are consumed front to back.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub prompts_seen: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            prompts_seen: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts_seen.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

/// Operator decision for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Download,
    Skip,
}

/// Terminal state of one record after the loop processed it
#[derive(Debug)]
pub enum RecordOutcome {
    Skipped,
    Downloaded(PathBuf),
    DownloadFailed { filename: PathBuf, error: String },
}

/// Block until the operator answers `y` or `n`; anything else re-prompts.
pub fn ask_decision(prompter: &mut dyn Prompter) -> io::Result<Decision> {
    loop {
        let answer = prompter.read_line("Download this paper? (y/n): ")?;
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(Decision::Download),
            "n" => return Ok(Decision::Skip),
            _ => {}
        }
    }
}

/// Drive one already-presented record to its terminal state.
pub async fn process_record(
    paper: &Paper,
    prompter: &mut dyn Prompter,
    http: &HttpClient,
    papers_dir: &Path,
) -> io::Result<RecordOutcome> {
    let Some(pdf_url) = paper.pdf_url.as_deref() else {
        ui::info("No PDF available for this paper, moving on.");
        return Ok(RecordOutcome::Skipped);
    };

    match ask_decision(prompter)? {
        Decision::Skip => {
            ui::info("Skipped.");
            Ok(RecordOutcome::Skipped)
        }
        Decision::Download => {
            let filename = target_path(papers_dir, paper.title.as_deref());
            match download_pdf(http, pdf_url, papers_dir, paper.title.as_deref()).await {
                Ok(path) => {
                    ui::success(format!("Saved {}", path.display()));
                    Ok(RecordOutcome::Downloaded(path))
                }
                Err(err) => {
                    ui::error(format!(
                        "Could not download {}: {}",
                        filename.display(),
                        err
                    ));
                    Ok(RecordOutcome::DownloadFailed {
                        filename,
                        error: err.to_string(),
                    })
                }
            }
        }
    }
}
