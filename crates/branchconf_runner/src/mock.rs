//! Recording runner for tests.
//!
//! Nothing is executed. Each call's argv is recorded and answered from a
//! queue of scripted outcomes; an empty queue answers with exit code 0.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Scripted process outcome.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    /// Outcome of a process exiting with `exit_code` and `stderr`.
    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    /// Full argv, `sudo` included
    pub argv: Vec<String>,
}

#[derive(Default)]
struct MockState {
    queued: VecDeque<MockResponse>,
    spawn_error: Option<String>,
    calls: Vec<CapturedCall>,
}

/// Command runner that records instead of executing.
///
/// Clones share state: keep one handle in the test and give another to the
/// code under test.
#[derive(Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next unanswered call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.state.lock().queued.push_back(response);
        self
    }

    /// Fail every call as if the program could not be started.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        self.state.lock().spawn_error = Some(message.into());
        self
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &CommandSpec) -> RunnerResult<ExecutionResult> {
        let mut state = self.state.lock();
        state.calls.push(CapturedCall {
            argv: command.argv(),
        });

        if let Some(message) = &state.spawn_error {
            return Err(RunnerError::ExecutionFailed(message.clone()));
        }

        let (exit_code, stdout, stderr) = match state.queued.pop_front() {
            Some(r) => (r.exit_code, r.stdout, r.stderr),
            None => (0, String::new(), String::new()),
        };
        let now = Utc::now();
        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_argv_with_sudo() {
        let runner = MockRunner::new();
        let restart = CommandSpec::new("service").args(["nginx", "restart"]).sudo(true);

        runner.run(&restart).await.unwrap();

        assert_eq!(
            runner.get_calls(),
            vec![CapturedCall {
                argv: vec!["sudo".into(), "service".into(), "nginx".into(), "restart".into()]
            }]
        );
    }

    #[tokio::test]
    async fn test_queued_outcomes_then_success() {
        let runner = MockRunner::new().add_response(MockResponse::failure(1, "job failed"));
        let cmd = CommandSpec::new("true");

        let first = runner.run(&cmd).await.unwrap();
        assert_eq!(first.exit_code, 1);
        assert_eq!(first.stderr, "job failed");

        let second = runner.run(&cmd).await.unwrap();
        assert!(second.success());
        assert_eq!(runner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_spawn_error_is_still_recorded() {
        let runner = MockRunner::new().simulate_failure("boom");
        let result = runner.run(&CommandSpec::new("true")).await;

        assert!(matches!(result, Err(RunnerError::ExecutionFailed(ref m)) if m == "boom"));
        assert_eq!(runner.call_count(), 1);
    }
}
