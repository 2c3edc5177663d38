use chrono::{DateTime, Local};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

/// Words that mark a message as describing work still underway.
const IN_PROGRESS_KEYWORDS: [&str; 6] = [
    "checking",
    "installing",
    "launching",
    "generating",
    "downloading",
    "extracting",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Installer,
    Launcher,
    Application,
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workflow::Installer => "installer",
            Workflow::Launcher => "launcher",
            Workflow::Application => "app",
        };
        f.write_str(name)
    }
}

/// Coarse display mode derived from the latest status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    InProgress,
    Idle,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub workflow: Workflow,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl StatusMessage {
    pub fn new(workflow: Workflow, text: impl Into<String>) -> Self {
        Self {
            workflow,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn activity(&self) -> Activity {
        infer_activity(&self.text)
    }

    /// `[HH:MM:SS] text`, the form shown in the status bar.
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

pub fn infer_activity(text: &str) -> Activity {
    let lowered = text.to_lowercase();
    if IN_PROGRESS_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Activity::InProgress
    } else {
        Activity::Idle
    }
}

/// Sending half of the status stream, handed to one workflow run.
#[derive(Debug, Clone)]
pub struct StatusSender {
    workflow: Workflow,
    tx: Sender<StatusMessage>,
}

impl StatusSender {
    /// Same channel, different source tag.
    pub fn for_workflow(&self, workflow: Workflow) -> Self {
        Self {
            workflow,
            tx: self.tx.clone(),
        }
    }

    pub fn emit(&self, text: impl Into<String>) {
        let message = StatusMessage::new(self.workflow, text);
        tracing::info!(workflow = %message.workflow, "{}", message.text);
        // The consumer may already be gone during shutdown.
        let _ = self.tx.send(message);
    }
}

pub fn channel(workflow: Workflow) -> (StatusSender, Receiver<StatusMessage>) {
    let (tx, rx) = mpsc::channel();
    (StatusSender { workflow, tx }, rx)
}

/// Drains everything queued so far without blocking.
pub fn drain(rx: &Receiver<StatusMessage>) -> Vec<StatusMessage> {
    rx.try_iter().collect()
}
