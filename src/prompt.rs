use std::io::{self, BufRead, Write};

/// A blocking prompt that returns the entered URL, or `None` when cancelled
pub trait UrlPrompt {
    fn prompt_url(&mut self, message: &str) -> Option<String>;
}

/// Reads one line from stdin. End of input counts as cancelling.
pub struct StdinPrompt;

impl UrlPrompt for StdinPrompt {
    fn prompt_url(&mut self, message: &str) -> Option<String> {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{message} ");
        let _ = stderr.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Always answers with the same value and records what it was asked
#[derive(Debug, Clone, Default)]
pub struct FixedPrompt {
    answer: Option<String>,
    asked: Vec<String>,
}

impl FixedPrompt {
    pub fn new(answer: Option<&str>) -> Self {
        FixedPrompt {
            answer: answer.map(str::to_string),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl UrlPrompt for FixedPrompt {
    fn prompt_url(&mut self, message: &str) -> Option<String> {
        self.asked.push(message.to_string());
        self.answer.clone()
    }
}
