use crate::domain::ports::Prompter;
use crate::utils::error::{ReconcileError, Result};
use dialoguer::{Confirm, Input, Select};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Asks on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()?)
    }

    fn ask(&self, question: &str) -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?)
    }

    fn choose(&self, title: &str, options: &[String]) -> Result<Option<usize>> {
        if options.is_empty() {
            return Ok(None);
        }
        Ok(Select::new()
            .with_prompt(title)
            .items(options)
            .default(0)
            .interact_opt()?)
    }
}

/// Answers from a fixed list, in order.
///
/// `confirm` takes `y`/`yes` as yes, `choose` takes a 1-based number and skips
/// answers that are not a valid choice. When the answers run out, confirmations
/// are refused and choices abandoned.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every question put to the prompter so far.
    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next_answer(&self, question: &str) -> Option<String> {
        self.asked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(question.to_string());
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        Ok(self
            .next_answer(question)
            .map(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false))
    }

    fn ask(&self, question: &str) -> Result<String> {
        self.next_answer(question)
            .ok_or_else(|| ReconcileError::Aborted {
                message: format!("no answer for '{}'", question),
            })
    }

    fn choose(&self, title: &str, options: &[String]) -> Result<Option<usize>> {
        while let Some(answer) = self.next_answer(title) {
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => tracing::warn!("Invalid choice '{}', please try again", answer),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_accepts_y_and_yes() {
        let prompter = ScriptedPrompter::new(["y", "YES", "n", ""]);
        assert!(prompter.confirm("Update IPAM? [y/N]").unwrap());
        assert!(prompter.confirm("Update IPAM? [y/N]").unwrap());
        assert!(!prompter.confirm("Update IPAM? [y/N]").unwrap());
        assert!(!prompter.confirm("Update IPAM? [y/N]").unwrap());
        assert!(!prompter.confirm("out of answers").unwrap());
    }

    #[test]
    fn test_choose_reprompts_on_invalid_answer() {
        let options = vec!["north".to_string(), "south".to_string()];
        let prompter = ScriptedPrompter::new(["x", "3", "2"]);
        assert_eq!(prompter.choose("Choose a VLAN Group", &options).unwrap(), Some(1));
        assert_eq!(prompter.questions().len(), 3);
    }

    #[test]
    fn test_ask_without_answer_aborts() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(matches!(
            prompter.ask("Vlan Name"),
            Err(ReconcileError::Aborted { .. })
        ));
    }
}
