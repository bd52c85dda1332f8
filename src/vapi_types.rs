use serde::Deserialize;

/// `GET /call/{id}`
#[derive(Deserialize, Debug, Default)]
pub struct VapiCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub customer: Option<VapiCustomer>,
}

impl VapiCall {
    /// The number the platform dialed or was dialed from.
    pub fn caller_number(&self) -> Option<String> {
        self.phone_number
            .clone()
            .or_else(|| self.customer.as_ref().and_then(|c| c.number.clone()))
            .filter(|n| !n.trim().is_empty())
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct VapiCustomer {
    #[serde(default)]
    pub number: Option<String>,
}

/// `GET /call/{id}/transcript`; either wrapped in `messages` or a bare list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum VapiTranscript {
    Wrapped {
        #[serde(default)]
        messages: Vec<VapiMessage>,
    },
    Bare(Vec<VapiMessage>),
}

impl VapiTranscript {
    pub fn into_messages(self) -> Vec<VapiMessage> {
        match self {
            VapiTranscript::Wrapped { messages } => messages,
            VapiTranscript::Bare(messages) => messages,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct VapiMessage {
    pub role: VapiRole,
    #[serde(default, alias = "text")]
    pub message: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VapiRole {
    #[serde(alias = "bot")]
    Assistant,
    User,
    #[serde(other)]
    Other,
}
