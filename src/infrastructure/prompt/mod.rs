use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Decides whether the runner may start evicting library entries
#[async_trait]
pub trait EvictionConfirmation: Send + Sync {
    /// `remaining` counts the tasks still queued, including the one that failed
    async fn confirm(&self, remaining: usize) -> bool;
}

/// Always answers the same way
pub struct FixedConfirmation(pub bool);

#[async_trait]
impl EvictionConfirmation for FixedConfirmation {
    async fn confirm(&self, remaining: usize) -> bool {
        tracing::info!(
            remaining = remaining,
            confirmed = self.0,
            "Eviction cycle answered by configuration"
        );
        self.0
    }
}

type AnswerReader = Arc<dyn Fn(usize) -> Option<String> + Send + Sync>;

/// Asks the operator on the terminal. Cancellation answers no without
/// waiting for the blocked read.
pub struct StdinConfirmation {
    cancel_token: CancellationToken,
    read_answer: AnswerReader,
}

impl StdinConfirmation {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self::with_reader(cancel_token, Arc::new(ask))
    }

    fn with_reader(cancel_token: CancellationToken, read_answer: AnswerReader) -> Self {
        Self {
            cancel_token,
            read_answer,
        }
    }
}

#[async_trait]
impl EvictionConfirmation for StdinConfirmation {
    async fn confirm(&self, remaining: usize) -> bool {
        let read_answer = self.read_answer.clone();
        let prompt = tokio::task::spawn_blocking(move || read_answer(remaining));

        tokio::select! {
            _ = self.cancel_token.cancelled() => {
                tracing::warn!("Cancelled while waiting for an answer, treating as no");
                false
            }
            answer = prompt => match answer {
                Ok(Some(line)) => is_affirmative(&line),
                Ok(None) => {
                    tracing::warn!("No answer on stdin, treating as no");
                    false
                }
                Err(e) => {
                    tracing::error!(error = %e, "Confirmation prompt failed");
                    false
                }
            },
        }
    }
}

fn ask(remaining: usize) -> Option<String> {
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout);
    let _ = writeln!(stdout, "The voice library is full.");
    let _ = writeln!(
        stdout,
        "Continuing switches to delete-then-add mode, which uses the monthly add/edit quota."
    );
    let _ = write!(
        stdout,
        ">>> Continue with the remaining {} voices? (type 'yes' to confirm): ",
        remaining
    );
    let _ = stdout.flush();

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}
