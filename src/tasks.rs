//! Front-end build tool invocation
//!
//! Compilation and minification belong to the front-end build tool. The
//! orchestrator only needs to start one of its tasks and learn whether it
//! succeeded.

use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::config::WorkflowProperties;

/// Exit codes the build tool uses for failed tasks (warnings, failed tests)
const TASK_ERROR_CODES: &[i32] = &[0, 3, 6];

/// Every exit code the build tool can return, fatal ones included
const ALL_ERROR_CODES: &[i32] = &[0, 1, 2, 3, 4, 5, 6];

/// Runs one named task of the front-end build tool
pub trait TaskRunner {
    fn run_task(&mut self, task: &str) -> Result<(), TaskError>;
}

/// Task failures
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("could not start '{executable}' for task '{task}': {source}")]
    Spawn {
        executable: String,
        task: String,
        #[source]
        source: std::io::Error,
    },

    #[error("task '{task}' failed with {}", describe_code(.code))]
    Failed { task: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Runs tasks by spawning the build tool executable
#[derive(Debug, Clone)]
pub struct CommandTaskRunner {
    executable: String,
    working_dir: PathBuf,
    options: Vec<String>,
    show_colors: bool,
    success_codes: Vec<i32>,
}

impl CommandTaskRunner {
    pub fn new(executable: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_dir: working_dir.into(),
            options: Vec::new(),
            show_colors: false,
            success_codes: vec![0],
        }
    }

    /// Configure from workflow properties, running in `working_dir`
    pub fn from_properties(workflow: &WorkflowProperties, working_dir: &Path) -> Self {
        let success_codes = if workflow.ignore_all_errors {
            ALL_ERROR_CODES.to_vec()
        } else if workflow.ignore_tasks_errors {
            TASK_ERROR_CODES.to_vec()
        } else {
            vec![0]
        };

        Self {
            executable: workflow.build_executable.clone(),
            working_dir: working_dir.to_path_buf(),
            options: workflow.build_options.clone(),
            show_colors: workflow.show_colors,
            success_codes,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_success_codes(mut self, codes: Vec<i32>) -> Self {
        self.success_codes = codes;
        self
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    /// Arguments passed for `task`
    pub fn arguments(&self, task: &str) -> Vec<String> {
        let mut args = vec![task.to_string()];
        if !self.show_colors {
            args.push("--no-color".to_string());
        }
        args.extend(self.options.iter().map(|o| normalize_argument(o)));
        args
    }

    pub fn success_codes(&self) -> &[i32] {
        &self.success_codes
    }
}

impl TaskRunner for CommandTaskRunner {
    fn run_task(&mut self, task: &str) -> Result<(), TaskError> {
        let args = self.arguments(task);
        info!(executable = %self.executable, task, "running build task");
        debug!(?args, cwd = %self.working_dir.display(), "build task command");

        let status = Command::new(&self.executable)
            .args(&args)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|source| TaskError::Spawn {
                executable: self.executable.clone(),
                task: task.to_string(),
                source,
            })?;

        match status.code() {
            Some(code) if self.success_codes.contains(&code) => {
                if code != 0 {
                    warn!(task, code, "build task exit code ignored");
                }
                Ok(())
            }
            code => Err(TaskError::Failed {
                task: task.to_string(),
                code,
            }),
        }
    }
}

/// Join an option and its whitespace-separated value with `=`:
/// `--option value` becomes `--option=value`.
pub fn normalize_argument(argument: &str) -> String {
    static OPTION_WITH_SPACE: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern =
        OPTION_WITH_SPACE.get_or_init(|| Regex::new(r"^-{1,2}[\w-]*\s+").ok());

    match pattern {
        Some(re) if re.is_match(argument) => {
            let trimmed = argument.trim_end();
            match trimmed.find(char::is_whitespace) {
                Some(split) => format!(
                    "{}={}",
                    &trimmed[..split],
                    trimmed[split..].trim_start()
                ),
                None => trimmed.to_string(),
            }
        }
        _ => argument.to_string(),
    }
}
