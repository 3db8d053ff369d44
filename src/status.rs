use crate::client::Health;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ServerStatus {
    #[default]
    Unknown,
    Connected {
        provider: String,
        configured: bool,
    },
    Unreachable,
}

impl ServerStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ServerStatus::Connected { .. })
    }
}

impl From<&Health> for ServerStatus {
    fn from(health: &Health) -> Self {
        ServerStatus::Connected {
            provider: health.ai_provider.clone(),
            configured: health.is_configured(),
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerStatus::Unknown => f.write_str("… Checking server"),
            ServerStatus::Connected {
                provider,
                configured,
            } => {
                let marker = if *configured { "✅" } else { "⚠️" };
                write!(f, "{} Server connected ({})", marker, provider)
            }
            ServerStatus::Unreachable => {
                f.write_str("❌ Server connection failed - check if the poetry server is running")
            }
        }
    }
}
