//! Interactive console session.
//!
//! Reads lines, buffers multi-line expressions until their parens balance,
//! and evaluates each complete input against one interpreter. A handful of
//! bare-word commands inspect or reset the session:
//!
//! | command | effect |
//! |---|---|
//! | `exit` | offer to save the session, then end it |
//! | `context` | print the context summary |
//! | `history` | last 15 inputs with results |
//! | `clear` | replace the context with a fresh one of the same name |
//! | `analyze` | session statistics |
//! | `save_cycle [operator]` | export the session as a cycle record |

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::context::{Context, now_secs};
use crate::error::LogosResult;
use crate::eval::Interpreter;
use crate::export::{CycleRecord, export_cycle};
use crate::parser::parse_program;
use crate::value::Value;

/// Entries shown by `history`.
const HISTORY_SHOWN: usize = 15;

/// Coherence below which an input counts as significant in `analyze`.
const LOW_COHERENCE: f64 = 0.5;

const DEFAULT_OPERATOR: &str = "repl_operator";

/// Operator recorded when the session is saved on exit.
const EXIT_OPERATOR: &str = "repl_exit";

/// A bare-word console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Context,
    History,
    Clear,
    Analyze,
    SaveCycle { operator: String },
}

impl Command {
    /// Recognize a command line. Anything else is source text.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let cmd = match words.next()? {
            "exit" => Self::Exit,
            "context" => Self::Context,
            "history" => Self::History,
            "clear" => Self::Clear,
            "analyze" => Self::Analyze,
            "save_cycle" => Self::SaveCycle {
                operator: words.next().unwrap_or(DEFAULT_OPERATOR).to_string(),
            },
            _ => return None,
        };
        // Commands take no trailing words, save_cycle at most one.
        words.next().is_none().then_some(cmd)
    }
}

/// Whether `line`, appended to `buffer`, leaves an expression open.
///
/// With an empty buffer only lines starting with `(` can open one.
pub fn is_incomplete(buffer: &[String], line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    let balance = |s: &str| {
        let opens = s.chars().filter(|&c| c == '(').count();
        let closes = s.chars().filter(|&c| c == ')').count();
        opens > closes
    };
    if buffer.is_empty() {
        line.trim_start().starts_with('(') && balance(line)
    } else {
        let mut full = buffer.join("\n");
        full.push('\n');
        full.push_str(line);
        balance(&full)
    }
}

/// One evaluated input.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: u64,
    pub input: String,
    pub result: String,
    pub coherence: f64,
    pub intentions: Vec<String>,
}

/// Console state: interpreter, input buffer, history.
#[derive(Debug)]
pub struct Session {
    interp: Interpreter,
    buffer: Vec<String>,
    history: Vec<HistoryEntry>,
    export_dir: PathBuf,
}

impl Session {
    /// `export_dir` receives files written by `save_cycle`.
    pub fn new(interp: Interpreter, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            interp,
            buffer: Vec::new(),
            history: Vec::new(),
            export_dir: export_dir.into(),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interp
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Whether a multi-line expression is being collected.
    pub fn is_buffering(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Feed one line. Returns a complete input once one is available.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end();
        if is_incomplete(&self.buffer, line) {
            self.buffer.push(line.to_string());
            return None;
        }
        if self.is_buffering() {
            self.buffer.push(line.to_string());
            let full = self.buffer.join("\n");
            self.buffer.clear();
            return Some(full);
        }
        (!line.trim().is_empty()).then(|| line.to_string())
    }

    /// Parse and evaluate one input, recording it in the history.
    ///
    /// Returns `None` when the input holds no expressions.
    pub fn process(&mut self, source: &str) -> LogosResult<Option<HistoryEntry>> {
        let program = parse_program(source, "<repl>", self.interp.context().axioms())?;
        if program.expressions.is_empty() {
            return Ok(None);
        }

        let mut results = Vec::with_capacity(program.expressions.len());
        for expr in &program.expressions {
            results.push(self.interp.evaluate(expr, &program.intentions)?);
        }
        let result = if results.len() == 1 {
            results[0].to_string()
        } else {
            Value::List(results).to_string()
        };

        let entry = HistoryEntry {
            timestamp: now_secs(),
            input: source.to_string(),
            result,
            coherence: self.interp.context_mut().coherence(),
            intentions: program.intentions,
        };
        self.history.push(entry.clone());
        Ok(Some(entry))
    }

    /// Replace the context with a fresh one under the same name and axioms.
    pub fn clear(&mut self) -> LogosResult<()> {
        let ctx = self.interp.context();
        let fresh = Context::new(ctx.name(), ctx.axioms().clone())?;
        self.interp = Interpreter::new(fresh);
        tracing::info!(context = %self.interp.context().name(), "context reset");
        Ok(())
    }

    /// Build a cycle record from the session history.
    pub fn cycle_record(&mut self, operator: &str) -> CycleRecord {
        let timestamp = now_secs();
        let ctx = self.interp.context_mut();
        let dialogues = ctx.dialogues();
        let start = dialogues.len().saturating_sub(10);
        let recent_dialogue_scores = dialogues[start..].iter().map(|d| d.score.overall).collect();
        let dialogue_count = dialogues.len();
        let fair_care_enabled = ctx.fair_care_enabled();

        CycleRecord {
            cycle_id: format!("repl_{timestamp}"),
            timestamp,
            expressions_evaluated: self.history.len(),
            successful_evaluations: self.history.len(),
            results: self
                .history
                .iter()
                .map(|e| Value::str(&e.result))
                .collect(),
            final_coherence: ctx.coherence(),
            dialogue_count,
            recent_dialogue_scores,
            operator_id: Some(operator.to_string()),
            fair_care_enabled,
        }
    }

    /// Export the session. Returns `None` when there is nothing to save.
    pub fn save_cycle(&mut self, operator: &str) -> LogosResult<Option<PathBuf>> {
        if self.history.is_empty() {
            return Ok(None);
        }
        let record = self.cycle_record(operator);
        let path = self
            .export_dir
            .join(format!("{operator}_{}.json", record.cycle_id));
        export_cycle(&record, self.interp.context_mut(), &path)?;
        Ok(Some(path))
    }

    /// Run the read-eval-print loop until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "LOGOS-κ console. Commands: exit, context, history, clear, analyze, save_cycle")?;
        writeln!(out, "Multi-line input: open a '(' and keep typing until it closes.")?;
        self.prompt(out)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next() {
            let line = line?;
            if !self.is_buffering() {
                if let Some(cmd) = Command::parse(line.trim()) {
                    if cmd == Command::Exit {
                        self.save_on_exit(&mut lines, out)?;
                        writeln!(out, "Until the next cycle.")?;
                        return Ok(());
                    }
                    self.command(cmd, out)?;
                    self.prompt(out)?;
                    continue;
                }
            }
            if let Some(source) = self.push_line(&line) {
                match self.process(&source) {
                    Ok(Some(entry)) => {
                        writeln!(out, "⇒ {}", entry.result)?;
                        if !entry.intentions.is_empty() {
                            writeln!(out, "  intention: {}", entry.intentions.join(" | "))?;
                        }
                        writeln!(out, "  coherence: {:.2}%", entry.coherence * 100.0)?;
                    }
                    Ok(None) => writeln!(out, "Empty expression, nothing evaluated.")?,
                    Err(err) => writeln!(out, "{:?}", miette::Report::new(err))?,
                }
            }
            self.prompt(out)?;
        }
        Ok(())
    }

    /// Ask whether to save a non-empty session; answers come from `lines`.
    fn save_on_exit<I, W>(&mut self, lines: &mut I, out: &mut W) -> io::Result<()>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        if self.history.is_empty() {
            return Ok(());
        }
        write!(out, "Save this session? (y/N): ")?;
        out.flush()?;
        let answer = lines.next().transpose()?.unwrap_or_default();
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            return Ok(());
        }

        write!(out, "Operator id (default '{EXIT_OPERATOR}'): ")?;
        out.flush()?;
        let operator = lines.next().transpose()?.unwrap_or_default();
        let operator = match operator.trim() {
            "" => EXIT_OPERATOR,
            op => op,
        };
        match self.save_cycle(operator) {
            Ok(Some(path)) => writeln!(out, "Cycle saved: {}", path.display()),
            Ok(None) => Ok(()),
            Err(err) => writeln!(out, "{:?}", miette::Report::new(err)),
        }
    }

    fn prompt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", if self.is_buffering() { "...> " } else { "λκ> " })?;
        out.flush()
    }

    fn command<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<()> {
        match cmd {
            Command::Exit => {}
            Command::Context => {
                let summary = self.interp.context_mut().summary();
                writeln!(out, "{summary}")?;
            }
            Command::History => {
                let start = self.history.len().saturating_sub(HISTORY_SHOWN);
                for (i, entry) in self.history[start..].iter().enumerate() {
                    let input: String = entry.input.replace('\n', " ").chars().take(60).collect();
                    writeln!(out, "{:2}. {input}", i + 1)?;
                    writeln!(
                        out,
                        "    ⇒ {} (coherence {:.2}%)",
                        entry.result,
                        entry.coherence * 100.0
                    )?;
                }
            }
            Command::Clear => match self.clear() {
                Ok(()) => writeln!(out, "Context reset.")?,
                Err(err) => writeln!(out, "{:?}", miette::Report::new(err))?,
            },
            Command::Analyze => {
                let significant = self
                    .history
                    .iter()
                    .filter(|e| e.coherence < LOW_COHERENCE || !e.intentions.is_empty())
                    .count();
                let ctx = self.interp.context_mut();
                writeln!(out, "expressions: {}", self.history.len())?;
                writeln!(out, "significant: {significant}")?;
                writeln!(out, "tensions: {}", ctx.tensions().len())?;
                writeln!(out, "coherence: {:.2}%", ctx.coherence() * 100.0)?;
            }
            Command::SaveCycle { operator } => match self.save_cycle(&operator) {
                Ok(Some(path)) => writeln!(out, "Cycle saved: {}", path.display())?,
                Ok(None) => writeln!(out, "Nothing to save yet.")?,
                Err(err) => writeln!(out, "{:?}", miette::Report::new(err))?,
            },
        }
        Ok(())
    }
}
