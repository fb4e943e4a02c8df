use std::path::PathBuf;

/// A message the bot sends back over the channel the command arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Text plus a persistent reply keyboard, one inner `Vec` per button row.
    Menu {
        text: String,
        keyboard: Vec<Vec<String>>,
    },
    /// PNG image on local storage; the sender owns its lifetime and removes it afterwards.
    Photo { path: PathBuf },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) | Reply::Menu { text, .. } => Some(text),
            Reply::Photo { .. } => None,
        }
    }
}
