//! Message texts, in Slack `mrkdwn`.

use std::fmt::Write;

use num_format::{Locale, ToFormattedString};

use crate::{
    engine::{Choice, Outcome},
    schema::TitleEntity,
};

pub fn players(count: u32) -> String {
    count.to_formatted_string(&Locale::en)
}

pub fn round_start(round_number: u32, first: &TitleEntity, second: &TitleEntity) -> String {
    let mut message = format!("Round #{round_number}\n\n");
    message += "*WHICH GAME HAS MORE PLAYERS RIGHT NOW?*\n\n";
    let _ = write!(
        message,
        "{} {}\n{}",
        Choice::First.emoji(),
        first.name(),
        first.store_url()
    );
    message += "\n\n🆚\n\n";
    let _ = write!(
        message,
        "{} {}\n{}",
        Choice::Second.emoji(),
        second.name(),
        second.store_url()
    );
    message += "\n\n`make your choice...`";
    message
}

/// `score` is the new streak on a correct answer, and the streak that was
/// just lost on a wrong one.
pub fn round_result(
    choice: Choice,
    first: &TitleEntity,
    second: &TitleEntity,
    outcome: Outcome,
    score: u32,
) -> String {
    let chosen = match choice {
        Choice::First => first,
        Choice::Second => second,
    };
    let mut message = format!("*{} 🆚 {}*\n\n", first.name(), second.name());
    let _ = write!(
        message,
        "You chose {} - {}! \n\n",
        choice.emoji(),
        chosen.name()
    );
    let _ = write!(
        message,
        "{} has *{}* players right now.\n\n",
        Choice::First.emoji(),
        players(first.current_players())
    );
    let _ = writeln!(
        message,
        "{} has *{}* current players...",
        Choice::Second.emoji(),
        players(second.current_players())
    );
    match outcome {
        Outcome::Correct => {
            message += "\n*CORRECT!!*";
            let _ = write!(message, "\n*Your Score: {score}*");
        }
        Outcome::Incorrect => {
            message += "\n*wrong :(*";
            let _ = write!(message, "\n*Total Score: {score}*");
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::{players, round_result, round_start};
    use crate::{
        engine::{Choice, Outcome},
        schema::TitleEntity,
    };

    fn entity(id: &str, name: &str, current: u32) -> TitleEntity {
        TitleEntity::with_stats(
            id.to_owned().into(),
            name.to_owned().into(),
            [current, current, current].into(),
        )
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(players(0), "0");
        assert_eq!(players(999), "999");
        assert_eq!(players(1234567), "1,234,567");
    }

    #[test]
    fn start_message() {
        let message = round_start(3, &entity("10", "Game X", 1), &entity("20", "Game Y", 2));
        assert_eq!(
            message,
            "Round #3\n\n*WHICH GAME HAS MORE PLAYERS RIGHT NOW?*\n\n\
             🇦 Game X\nhttps://store.steampowered.com/app/10\n\n🆚\n\n\
             🇧 Game Y\nhttps://store.steampowered.com/app/20\n\n`make your choice...`"
        );
    }

    #[test]
    fn correct_message() {
        let message = round_result(
            Choice::First,
            &entity("10", "Game X", 50_000),
            &entity("20", "Game Y", 30),
            Outcome::Correct,
            4,
        );
        assert!(message.starts_with("*Game X 🆚 Game Y*\n\nYou chose 🇦 - Game X! "));
        assert!(message.contains("🇦 has *50,000* players right now."));
        assert!(message.contains("🇧 has *30* current players..."));
        assert!(message.ends_with("*CORRECT!!*\n*Your Score: 4*"));
    }

    #[test]
    fn wrong_message_shows_lost_streak() {
        let message = round_result(
            Choice::Second,
            &entity("10", "Game X", 50),
            &entity("20", "Game Y", 30),
            Outcome::Incorrect,
            7,
        );
        assert!(message.contains("You chose 🇧 - Game Y!"));
        assert!(message.ends_with("*wrong :(*\n*Total Score: 7*"));
    }
}
