use std::io::{BufRead, Write};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Accept,
    Decline,
    Unrecognized,
}

/// Interpret one line of user input. Only the first character counts;
/// an empty line declines.
pub fn parse_answer(line: &str) -> Answer {
    let line = line.trim_end_matches(['\n', '\r']);
    match line.chars().next() {
        None | Some('n' | 'N') => Answer::Decline,
        Some('y' | 'Y') => Answer::Accept,
        Some(_) => Answer::Unrecognized,
    }
}

/// Blocking yes/no prompt used when several books match.
pub struct ConfirmationGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConfirmationGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask until the answer is recognised. End of input, or a failure to
    /// read it, counts as no.
    pub fn confirm(&mut self, question: &str) -> bool {
        let mut line = String::new();
        let mut retry = false;
        loop {
            if let Err(e) = self.ask(question, retry) {
                warn!(error = %e, "Failed to write confirmation prompt");
            }

            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) => return false,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to read confirmation answer, treating as no");
                    return false;
                }
            }

            match parse_answer(&line) {
                Answer::Accept => return true,
                Answer::Decline => return false,
                Answer::Unrecognized => retry = true,
            }
        }
    }

    fn ask(&mut self, question: &str, retry: bool) -> std::io::Result<()> {
        if retry {
            writeln!(self.output)?;
        }
        write!(self.output, "{}(yes/[no]) ", question)?;
        self.output.flush()
    }
}
