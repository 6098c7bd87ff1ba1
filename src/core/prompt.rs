use crate::utils::error::{DmpError, Result};
use std::io::{BufRead, Write};

const AFFIRMATIVE: [&str; 6] = ["yes", "y", "ye", "j", "ja", ""];
const NEGATIVE: [&str; 3] = ["no", "n", "nej"];
const USAGE_REMINDER: &str = "Please respond with 'y'(es) or 'n'(o)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Affirm,
    Decline,
    Unrecognized,
}

impl PromptAnswer {
    /// Classifies one line of operator input. An empty line means yes.
    pub fn parse(input: &str) -> Self {
        let answer = input.trim().to_lowercase();
        if AFFIRMATIVE.contains(&answer.as_str()) {
            PromptAnswer::Affirm
        } else if NEGATIVE.contains(&answer.as_str()) {
            PromptAnswer::Decline
        } else {
            PromptAnswer::Unrecognized
        }
    }
}

/// Operator-facing console with injectable input and output, so workflows
/// can be driven from a script in tests.
pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl Console<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()?;
        Ok(())
    }

    /// Reads one answer. End of input is treated as a decline.
    pub fn ask(&mut self, question: &str) -> Result<PromptAnswer> {
        self.say(question)?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(PromptAnswer::Decline);
        }
        Ok(PromptAnswer::parse(&line))
    }

    /// Asks until the answer is recognised; a decline becomes `UserAbort`.
    pub fn confirm(&mut self, question: &str) -> Result<()> {
        loop {
            match self.ask(question)? {
                PromptAnswer::Affirm => return Ok(()),
                PromptAnswer::Decline => {
                    tracing::info!("Operator declined: {}", question);
                    return Err(DmpError::UserAbort);
                }
                PromptAnswer::Unrecognized => self.say(USAGE_REMINDER)?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
