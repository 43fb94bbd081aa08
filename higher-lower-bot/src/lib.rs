pub mod interaction;
pub mod slack;
pub mod slack_main;
