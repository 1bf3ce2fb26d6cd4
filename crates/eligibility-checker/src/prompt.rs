use std::io::{BufRead, Write};

use anyhow::{Result, bail};

use crate::cmd::i18n::tr;

/// Token that steps back to the previous question.
pub const BACK_TOKEN: &str = "<";

/// A prompt answer, or a request to go back one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Value(T),
    Back,
}

impl<T> Reply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Value(value) => Reply::Value(f(value)),
            Reply::Back => Reply::Back,
        }
    }
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("stdin closed");
        }
        Ok(line.trim().to_string())
    }

    /// Free text. Empty input returns `default`, or an empty string when optional.
    pub fn text(
        &mut self,
        title: &str,
        required: bool,
        default: Option<&str>,
        allow_back: bool,
    ) -> Result<Reply<String>> {
        loop {
            match default {
                Some(value) if !value.is_empty() => write!(self.output, "{title} [{value}]: ")?,
                _ => write!(self.output, "{title}: ")?,
            }
            let input = self.read_line()?;
            if allow_back && input == BACK_TOKEN {
                return Ok(Reply::Back);
            }
            if input.is_empty() {
                if let Some(value) = default
                    && !value.is_empty()
                {
                    return Ok(Reply::Value(value.to_string()));
                }
                if required {
                    self.say(&tr("cli.prompt.value_required"))?;
                    continue;
                }
            }
            return Ok(Reply::Value(input));
        }
    }

    pub fn boolean(
        &mut self,
        title: &str,
        default: Option<bool>,
        allow_back: bool,
    ) -> Result<Reply<bool>> {
        let suffix = match default {
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
            None => "[y/n]",
        };
        loop {
            write!(self.output, "{title} {suffix}: ")?;
            let input = self.read_line()?.to_ascii_lowercase();
            if allow_back && input == BACK_TOKEN {
                return Ok(Reply::Back);
            }
            if input.is_empty()
                && let Some(value) = default
            {
                return Ok(Reply::Value(value));
            }
            match input.as_str() {
                "y" | "yes" | "j" | "ja" | "true" | "1" => return Ok(Reply::Value(true)),
                "n" | "no" | "nein" | "false" | "0" => return Ok(Reply::Value(false)),
                _ => self.say(&tr("cli.prompt.answer_yes_no"))?,
            }
        }
    }

    /// Numbered menu; accepts either the number or the literal choice.
    pub fn choice(
        &mut self,
        title: &str,
        choices: &[String],
        default: Option<&str>,
        allow_back: bool,
    ) -> Result<Reply<String>> {
        if choices.is_empty() {
            bail!("no choices offered for '{title}'");
        }
        loop {
            writeln!(self.output, "{title}")?;
            for (idx, choice) in choices.iter().enumerate() {
                writeln!(self.output, "  {}. {choice}", idx + 1)?;
            }
            match default {
                Some(value) => write!(
                    self.output,
                    "{} [{value}] ",
                    tr("cli.prompt.select_number_or_value")
                )?,
                None => write!(self.output, "{} ", tr("cli.prompt.select_number_or_value"))?,
            }
            let input = self.read_line()?;
            if allow_back && input == BACK_TOKEN {
                return Ok(Reply::Back);
            }
            if input.is_empty()
                && let Some(value) = default
            {
                return Ok(Reply::Value(value.to_string()));
            }
            if let Ok(n) = input.parse::<usize>()
                && n > 0
                && n <= choices.len()
            {
                return Ok(Reply::Value(choices[n - 1].clone()));
            }
            if let Some(found) = choices.iter().find(|choice| choice.eq_ignore_ascii_case(&input)) {
                return Ok(Reply::Value(found.clone()));
            }
            self.say(&tr("cli.prompt.invalid_choice"))?;
        }
    }
}
