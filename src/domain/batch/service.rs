use super::error::{ArtifactError, SynthesisError};
use super::model::{BatchSummary, OutcomeRecord, StopReason, VoiceTask};
use super::policy::RetryPolicy;
use crate::infrastructure::prompt::EvictionConfirmation;
use crate::infrastructure::repositories::{ArtifactRepository, SynthesisRepository};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What the loop does after one task
enum Flow {
    Continue,
    /// The eviction cycle consumed the rest of the queue
    Finished,
    Stop(StopReason),
}

/// Sequential synthesis batch runner
pub struct BatchService {
    synthesis_repo: Arc<dyn SynthesisRepository>,
    artifact_repo: Arc<dyn ArtifactRepository>,
    confirmation: Arc<dyn EvictionConfirmation>,
    policy: RetryPolicy,
    text: String,
    record_failures: bool,
    cancel_token: CancellationToken,
}

impl BatchService {
    pub fn new(
        synthesis_repo: Arc<dyn SynthesisRepository>,
        artifact_repo: Arc<dyn ArtifactRepository>,
        confirmation: Arc<dyn EvictionConfirmation>,
        policy: RetryPolicy,
        text: String,
    ) -> Self {
        Self {
            synthesis_repo,
            artifact_repo,
            confirmation,
            policy,
            text,
            record_failures: false,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Record skipped tasks with a failure marker instead of leaving them out
    pub fn with_record_failures(mut self, record_failures: bool) -> Self {
        self.record_failures = record_failures;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Render every task whose display name is not in `already_done`.
    ///
    /// Synthesis failures never escape: they are handled according to the
    /// retry policy and end up either skipped or as the summary's stop reason.
    pub async fn run(&self, tasks: Vec<VoiceTask>, already_done: &HashSet<String>) -> BatchSummary {
        let total = tasks.len();
        let pending: Vec<VoiceTask> = tasks
            .into_iter()
            .filter(|task| !already_done.contains(&task.display_name))
            .collect();

        let mut summary = BatchSummary::new(total - pending.len());

        if pending.is_empty() {
            tracing::info!(
                skipped_existing = summary.skipped_existing,
                "Every requested voice already has an artifact, nothing to do"
            );
            return summary;
        }

        tracing::info!(
            pending = pending.len(),
            skipped_existing = summary.skipped_existing,
            policy = %self.policy,
            "Starting synthesis batch"
        );

        for index in 0..pending.len() {
            if self.cancel_token.is_cancelled() {
                tracing::warn!(
                    remaining = pending.len() - index,
                    "Batch cancelled before the next voice"
                );
                summary.stopped = Some(StopReason::Cancelled);
                break;
            }

            match self.process_task(&pending, index, &mut summary).await {
                Flow::Continue => {}
                Flow::Finished => break,
                Flow::Stop(reason) => {
                    tracing::warn!(reason = %reason, "Batch stopped");
                    summary.stopped = Some(reason);
                    break;
                }
            }
        }

        tracing::info!(
            saved = summary.saved_count(),
            failed = summary.failed_count(),
            skipped_existing = summary.skipped_existing,
            "Synthesis batch finished"
        );

        summary
    }

    async fn process_task(
        &self,
        pending: &[VoiceTask],
        index: usize,
        summary: &mut BatchSummary,
    ) -> Flow {
        let task = &pending[index];

        if let RetryPolicy::RetryWithDelay { delay } = self.policy {
            return self.process_with_delay(task, delay, summary).await;
        }

        match self.synthesize(task).await {
            Ok(audio) => self.persist(task, audio, summary).await,
            Err(SynthesisError::LibraryFull(message))
                if self.policy == RetryPolicy::EvictAndRetryOnce =>
            {
                tracing::warn!(
                    voice = %task.display_name,
                    message = %message,
                    "Voice library is full"
                );
                self.run_eviction_cycle(&pending[index..], summary).await
            }
            Err(error) if error.is_fatal() => {
                tracing::error!(
                    voice = %task.display_name,
                    error = %error,
                    "Monthly voice add/edit limit reached, cannot continue"
                );
                Flow::Stop(StopReason::MonthlyEditLimitReached)
            }
            Err(error) => {
                tracing::warn!(
                    voice = %task.display_name,
                    error = %error,
                    "Synthesis failed, skipping voice"
                );
                if self.record_failures {
                    summary.outcomes.push(OutcomeRecord::failed(&task.display_name));
                }
                Flow::Continue
            }
        }
    }

    /// Delete one library entry before each remaining task and retry it once.
    /// Any failure ends the whole cycle without recording the failed task.
    async fn run_eviction_cycle(&self, remaining: &[VoiceTask], summary: &mut BatchSummary) -> Flow {
        if !self.confirmation.confirm(remaining.len()).await {
            if self.cancel_token.is_cancelled() {
                return Flow::Stop(StopReason::Cancelled);
            }
            tracing::warn!("Eviction cycle not confirmed, stopping");
            return Flow::Stop(StopReason::Declined);
        }

        tracing::info!(remaining = remaining.len(), "Switching to eviction cycle");

        for task in remaining {
            if self.cancel_token.is_cancelled() {
                return Flow::Stop(StopReason::Cancelled);
            }

            let entries = match self.synthesis_repo.list_library_entries().await {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::error!(error = %error, "Could not list the voice library");
                    return Flow::Stop(StopReason::EvictionAborted(error.to_string()));
                }
            };

            // First listed entry, no age or usage criterion
            let Some(victim) = entries.first() else {
                tracing::error!("Library reported full but lists no entries, cannot evict");
                return Flow::Stop(StopReason::EvictionAborted(
                    "voice library listing is empty".to_string(),
                ));
            };

            tracing::info!(
                entry = %victim.voice_reference,
                name = ?victim.name,
                "Deleting library entry to make room"
            );
            if let Err(error) = self
                .synthesis_repo
                .delete_library_entry(&victim.voice_reference)
                .await
            {
                tracing::warn!(
                    entry = %victim.voice_reference,
                    error = %error,
                    "Library entry deletion failed"
                );
            }

            match self.synthesize(task).await {
                Ok(audio) => match self.persist(task, audio, summary).await {
                    Flow::Continue => {}
                    other => return other,
                },
                Err(error) => {
                    tracing::error!(
                        voice = %task.display_name,
                        error = %error,
                        "Synthesis failed even after freeing a slot, stopping eviction cycle"
                    );
                    if error.is_fatal() {
                        tracing::error!("Cause: monthly voice add/edit limit reached");
                    }
                    return Flow::Stop(StopReason::EvictionRetryFailed(task.display_name.clone()));
                }
            }
        }

        Flow::Finished
    }

    async fn process_with_delay(
        &self,
        task: &VoiceTask,
        delay: Duration,
        summary: &mut BatchSummary,
    ) -> Flow {
        let mut attempt: u32 = 1;

        loop {
            match self.synthesize(task).await {
                Ok(audio) => return self.persist(task, audio, summary).await,
                Err(error) if error.is_fatal() => {
                    tracing::error!(
                        voice = %task.display_name,
                        error = %error,
                        "Monthly voice add/edit limit reached, cannot continue"
                    );
                    return Flow::Stop(StopReason::MonthlyEditLimitReached);
                }
                Err(error) => {
                    tracing::warn!(
                        voice = %task.display_name,
                        attempt = attempt,
                        error = %error,
                        retry_in_secs = delay.as_secs_f32(),
                        "Synthesis failed, retrying"
                    );

                    tokio::select! {
                        _ = self.cancel_token.cancelled() => {
                            return Flow::Stop(StopReason::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }

                    attempt += 1;
                }
            }
        }
    }

    async fn synthesize(&self, task: &VoiceTask) -> Result<Vec<u8>, SynthesisError> {
        tracing::info!(
            voice = %task.display_name,
            voice_reference = %task.voice_reference,
            "Generating audio"
        );
        self.synthesis_repo
            .synthesize(&task.voice_reference, &self.text)
            .await
    }

    async fn persist(&self, task: &VoiceTask, audio: Vec<u8>, summary: &mut BatchSummary) -> Flow {
        match self.artifact_repo.save(&task.display_name, &audio).await {
            Ok(path) => {
                tracing::info!(
                    voice = %task.display_name,
                    path = %path.display(),
                    audio_size = audio.len(),
                    "Audio saved"
                );
                summary
                    .outcomes
                    .push(OutcomeRecord::saved(&task.display_name, path));
                Flow::Continue
            }
            Err(ArtifactError::AlreadyExists(path)) => {
                tracing::warn!(
                    voice = %task.display_name,
                    path = %path.display(),
                    "Artifact appeared during the run, keeping the existing file"
                );
                Flow::Continue
            }
            Err(ArtifactError::InvalidName(name)) => {
                tracing::warn!(
                    voice = %name,
                    "Voice name cannot be used as a file name, skipping voice"
                );
                Flow::Continue
            }
            Err(error) => {
                tracing::error!(voice = %task.display_name, error = %error, "Could not save audio");
                Flow::Stop(StopReason::ArtifactWrite(error.to_string()))
            }
        }
    }
}
