//! Scripted command runner for tests

use super::command::{CommandOutput, CommandRunner, LineCallback, Stream};
use crate::error::CommandError;
use async_trait::async_trait;
use std::sync::Mutex;

type Effect = Box<dyn Fn() + Send + Sync>;

struct Rule {
    pattern: String,
    output: CommandOutput,
    effect: Option<Effect>,
}

/// Runner answering commands from rules matched against the joined command line
///
/// The first rule whose pattern is a substring of the command line wins;
/// unmatched commands succeed with empty output. Every call is recorded.
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer commands containing `pattern` with `output`
    pub fn on(mut self, pattern: &str, output: CommandOutput) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            output,
            effect: None,
        });
        self
    }

    /// Like [`ScriptedRunner::on`], also running `effect` when matched
    pub fn on_with(
        mut self,
        pattern: &str,
        output: CommandOutput,
        effect: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            output,
            effect: Some(Box::new(effect)),
        });
        self
    }

    /// Command lines run so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run_streaming(
        &self,
        argv: &[String],
        on_line: LineCallback<'_>,
    ) -> Result<CommandOutput, CommandError> {
        if argv.is_empty() {
            return Err(CommandError::Empty);
        }
        let command = argv.join(" ");
        self.calls.lock().unwrap().push(command.clone());

        let Some(rule) = self.rules.iter().find(|r| command.contains(&r.pattern)) else {
            return Ok(CommandOutput::default());
        };

        if let Some(effect) = &rule.effect {
            effect();
        }
        for line in rule.output.stdout.lines() {
            on_line(Stream::Stdout, line);
        }
        for line in rule.output.stderr.lines() {
            on_line(Stream::Stderr, line);
        }
        Ok(rule.output.clone())
    }
}
