//! In-memory fakes for the process runner (testing only)
//!
//! `ScriptedRunner` replays a queue of canned outcomes in order and records
//! every command it was asked to run, so tests can assert both what a
//! validator printed and which collaborators it invoked.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::process::{CommandRunner, CommandSpec, RunOutcome};

/// Runner that answers from a script instead of spawning processes.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    script: Mutex<VecDeque<RunOutcome>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a runner that will answer with `outcomes`, in order.
    pub fn with_script(outcomes: impl IntoIterator<Item = RunOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append one more outcome to the script.
    pub fn push(&self, outcome: RunOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Every command received so far.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> RunOutcome {
        self.calls.lock().unwrap().push(spec.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                RunOutcome::exited(
                    127,
                    "",
                    format!("no scripted outcome for: {}", spec.display()),
                )
            })
    }
}
