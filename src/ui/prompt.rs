use crate::models::PatternInput;
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Line-based console prompts with prefilled defaults.
///
/// Every question shows its default in brackets; an empty answer keeps it.
/// End of input is treated as the operator cancelling and yields `Ok(None)`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr, answers from stdin
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Free text answer; surrounding whitespace is kept.
    pub fn ask(&mut self, question: &str, default: &str) -> io::Result<Option<String>> {
        write!(self.output, "{} [{}]: ", question, default)?;
        self.output.flush()?;

        Ok(self.read_answer()?.map(|answer| {
            if answer.is_empty() {
                default.to_string()
            } else {
                answer
            }
        }))
    }

    /// Yes/no answer. Anything else asks again.
    pub fn ask_bool(&mut self, question: &str, default: bool) -> io::Result<Option<bool>> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "{} [{}]: ", question, hint)?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(Some(default)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                other => writeln!(self.output, "Please answer y or n (got '{}')", other)?,
            }
        }
    }

    /// Pick one of `options` by its 1-based number.
    pub fn choose<T: Copy + PartialEq + Display>(
        &mut self,
        question: &str,
        options: &[T],
        default: T,
    ) -> io::Result<Option<T>> {
        writeln!(self.output, "{}", question)?;
        for (i, option) in options.iter().enumerate() {
            let marker = if *option == default { '*' } else { ' ' };
            writeln!(self.output, " {}{}) {}", marker, i + 1, option)?;
        }

        loop {
            write!(self.output, "Choice [{}]: ", default)?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(options[n - 1])),
                _ => writeln!(self.output, "Enter a number from 1 to {}", options.len())?,
            }
        }
    }

    /// A pattern text followed by its "is regex" flag
    pub fn ask_pattern(
        &mut self,
        label: &str,
        default: &PatternInput,
    ) -> io::Result<Option<PatternInput>> {
        let Some(pattern) = self.ask(label, &default.pattern)? else {
            return Ok(None);
        };
        let Some(is_regex) = self.ask_bool("  treat as regular expression?", default.is_regex)?
        else {
            return Ok(None);
        };
        Ok(Some(PatternInput { pattern, is_regex }))
    }
}
