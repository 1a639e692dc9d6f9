use std::sync::Mutex;

/// Host output channel: progress messages, warnings, named outputs and fatal failures.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn set_output(&self, name: &str, value: &str);
    fn fail(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Warning(String),
    Output { name: String, value: String },
    Failure(String),
}

/// Reporter that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<Message>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn output(&self, name: &str) -> Option<String> {
        self.lock().iter().rev().find_map(|message| match message {
            Message::Output { name: n, value } if n == name => Some(value.clone()),
            _ => None,
        })
    }

    pub fn infos(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|message| match message {
                Message::Info(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|message| match message {
                Message::Warning(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Message>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, message: Message) {
        self.lock().push(message);
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(Message::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(Message::Warning(message.to_string()));
    }

    fn set_output(&self, name: &str, value: &str) {
        self.push(Message::Output {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn fail(&self, message: &str) {
        self.push(Message::Failure(message.to_string()));
    }
}
