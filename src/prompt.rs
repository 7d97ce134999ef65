use crate::error::{ContributeError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, Write};

pub trait Prompt {
    // Asks a yes/no question. An empty answer picks `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    fn ask(&mut self, question: &str) -> Result<String>;

    // answer is not echoed
    fn ask_hidden(&mut self, question: &str) -> Result<String>;
}

pub fn parse_confirmation(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_line(&self, question: &str) -> Result<String> {
        print!("{}", question.bold());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let answer = self.read_line(question)?;
        Ok(parse_confirmation(&answer, default))
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.read_line(question)
    }

    fn ask_hidden(&mut self, question: &str) -> Result<String> {
        print!("{}", question.bold());
        io::stdout().flush()?;

        enable_raw_mode()?;
        let result = read_hidden_line();
        let _ = disable_raw_mode();
        println!();

        result
    }
}

fn read_hidden_line() -> Result<String> {
    let mut input = String::new();
    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => return Ok(input.trim().to_string()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(ContributeError::Prompt("input cancelled".to_string()));
                }
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Esc => {
                    return Err(ContributeError::Prompt("input cancelled".to_string()));
                }
                _ => {}
            },
            // pasted tokens arrive as a single event on some terminals
            Event::Paste(text) => input.push_str(&text),
            _ => {}
        }
    }
}
