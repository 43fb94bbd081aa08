//! The parts of the Slack wire format this bot speaks.

use log::error;
use serde::{Deserialize, Serialize};
use url::Url;

/// Form body of a slash command request.
#[derive(Deserialize, Debug)]
#[allow(unused)]
pub struct SlashCommand {
    pub token: String,
    pub command: String,
    pub text: String,
    pub response_url: Url,
    pub trigger_id: String,
    pub user_id: String,
    pub user_name: String,
    pub team_id: String,
    pub api_app_id: String,
}

/// Form body of an interactivity request; `payload` is JSON.
#[derive(Deserialize, Debug)]
pub struct InteractionForm {
    pub payload: String,
}

/// The `block_actions` payload sent when a button is clicked.
#[derive(Deserialize, Debug)]
pub struct InteractionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
    pub user: InteractionUser,
    pub response_url: Url,
    #[serde(default)]
    pub actions: Vec<ActionPayload>,
}
#[derive(Deserialize, Debug)]
pub struct InteractionUser {
    pub id: String,
}
#[derive(Deserialize, Debug)]
pub struct ActionPayload {
    pub action_id: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Serialize, Debug)]
pub struct ResponseMessage {
    pub response_type: ResponseType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub replace_original: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

impl ResponseMessage {
    pub fn in_channel(text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            replace_original: false,
            text: text.into(),
            blocks,
        }
    }

    /// Visible only to the user who triggered it.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            replace_original: false,
            text: text.into(),
            blocks: vec![],
        }
    }

    pub fn replacing_original(mut self) -> Self {
        self.replace_original = true;
        self
    }
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: Text,
    },
    Image {
        image_url: String,
        alt_text: String,
        title: Text,
    },
    Actions {
        elements: Vec<Element>,
    },
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn { text: String },
    PlainText { text: String, emoji: bool },
}
impl Text {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        text: Text,
        action_id: String,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
}
#[derive(Clone, Copy, Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

pub fn button(
    label: impl Into<String>,
    action_id: &str,
    value: impl Into<String>,
    style: Option<ButtonStyle>,
) -> Element {
    Element::Button {
        text: Text::plain(label),
        action_id: action_id.to_owned(),
        value: value.into(),
        style,
    }
}

/// Answers an interaction through its `response_url`.
pub async fn respond(client: &reqwest::Client, response_url: &Url, message: &ResponseMessage) {
    let result = client
        .post(response_url.clone())
        .json(message)
        .send()
        .await
        .and_then(|response| response.error_for_status());
    if let Err(e) = result {
        error!("Failed to respond to {response_url}: {e}")
    }
}

#[derive(Serialize)]
struct WebhookPost<'a> {
    text: &'a str,
    username: &'a str,
}

/// Posts an operator notice, if a webhook is configured.
pub async fn webhook_send(client: &reqwest::Client, url: &Option<Url>, message: impl AsRef<str>) {
    let Some(url) = url else { return };
    if let Err(e) = client
        .post(url.clone())
        .json(&WebhookPost {
            text: message.as_ref(),
            username: "steam-higher-lower",
        })
        .send()
        .await
    {
        error!("{e}")
    }
}
