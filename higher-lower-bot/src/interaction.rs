//! Maps round starts and results to Slack messages, and button clicks back
//! to engine calls.  Buttons carry only a round id or a filter name.

use std::str::FromStr;

use anyhow::{bail, Context};
use steam_higher_lower::{
    engine::{Choice, NextAffordance, RoundId, RoundResult, RoundStart},
    search_filter::SearchFilter,
    Error,
};

use crate::slack::{button, Block, ButtonStyle, ResponseMessage, Text};

pub const CHOOSE: &str = "choose";
pub const NEXT_ROUND: &str = "next_round";
pub const RESTART: &str = "restart";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Choose { round_id: RoundId, choice: Choice },
    NextRound(SearchFilter),
    Restart,
}

impl Action {
    pub fn parse(action_id: &str, value: &str) -> anyhow::Result<Self> {
        Ok(match action_id {
            CHOOSE => {
                let (round_id, choice) = value
                    .split_once(':')
                    .with_context(|| format!("Malformed choice value: {value:?}"))?;
                let round_id = RoundId::from_str(round_id)
                    .with_context(|| format!("Malformed round id: {round_id:?}"))?;
                let choice = match choice {
                    "a" => Choice::First,
                    "b" => Choice::Second,
                    _ => bail!("Unknown choice: {choice:?}"),
                };
                Self::Choose { round_id, choice }
            }
            NEXT_ROUND => Self::NextRound(SearchFilter::parse_or_base(value)),
            RESTART => Self::Restart,
            _ => bail!("Unknown action: {action_id:?}"),
        })
    }

    pub fn action_id(&self) -> &'static str {
        match self {
            Self::Choose { .. } => CHOOSE,
            Self::NextRound(_) => NEXT_ROUND,
            Self::Restart => RESTART,
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::Choose { round_id, choice } => {
                let choice = match choice {
                    Choice::First => "a",
                    Choice::Second => "b",
                };
                format!("{round_id}:{choice}")
            }
            Self::NextRound(filter) => filter.to_string(),
            Self::Restart => String::new(),
        }
    }
}

/// The question, both header images and the two answer buttons.
pub fn round_start_message(start: &RoundStart) -> ResponseMessage {
    let entities = [(Choice::First, &start.first), (Choice::Second, &start.second)];
    let mut blocks = vec![Block::Section {
        text: Text::mrkdwn(&start.message),
    }];
    blocks.extend(entities.iter().map(|&(choice, entity)| Block::Image {
        image_url: entity.thumbnail_url().clone(),
        alt_text: entity.name().to_string(),
        title: Text::plain(format!("{} {}", choice.emoji(), entity.name())),
    }));
    blocks.push(Block::Actions {
        elements: entities
            .iter()
            .map(|&(choice, entity)| {
                let action = Action::Choose {
                    round_id: start.round_id,
                    choice,
                };
                button(
                    format!("{} {}", choice.emoji(), entity.name()),
                    action.action_id(),
                    action.value(),
                    Some(ButtonStyle::Primary),
                )
            })
            .collect(),
    });
    ResponseMessage::in_channel(&start.message, blocks)
}

/// Replaces the question with the answer and a button to go on.
pub fn round_result_message(result: &RoundResult) -> ResponseMessage {
    let next = match result.next {
        NextAffordance::NextRound(filter) => {
            let action = Action::NextRound(filter);
            button(
                "⏩ Next Round!",
                action.action_id(),
                action.value(),
                Some(ButtonStyle::Primary),
            )
        }
        NextAffordance::Restart => button(
            "🔁 Try again!",
            RESTART,
            "",
            Some(ButtonStyle::Danger),
        ),
    };
    ResponseMessage::in_channel(
        &result.message,
        vec![
            Block::Section {
                text: Text::mrkdwn(&result.message),
            },
            Block::Actions {
                elements: vec![next],
            },
        ],
    )
    .replacing_original()
}

/// What the player is told when a round could not be started or answered.
pub fn error_text(e: &Error) -> &'static str {
    match e {
        Error::Transport { .. } | Error::Extraction { .. } => {
            "Couldn't fetch data from the storefront, try again."
        }
        Error::EmptyPool { .. } => "No games are available to play with right now.",
        Error::UnknownRound(_) => "This round has already been answered.",
        Error::RoundExpired(_) => "This round has expired. Start a new one!",
        Error::NotYourRound(_) => "This round belongs to someone else. Start your own!",
    }
}
