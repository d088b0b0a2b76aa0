use std::convert::Infallible;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Exit,
    Clear,
    Help,
    ShowTemperature,
    SetTemperature(f32),
    Message(String),
}

impl FromStr for Command {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        Ok(match lower.as_str() {
            "exit" => Command::Exit,
            "clear" => Command::Clear,
            "help" => Command::Help,
            "temp" => Command::ShowTemperature,
            _ => match parse_temperature(&lower) {
                Some(value) => Command::SetTemperature(value),
                // Messages keep their original spacing.
                None => Command::Message(s.to_string()),
            },
        })
    }
}

// `temp <number>`; anything else starting with "temp" is an ordinary message.
fn parse_temperature(line: &str) -> Option<f32> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "temp" {
        return None;
    }
    let value = parts.next()?.parse::<f32>().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some(value),
    }
}

pub const COMMAND_BOX: &str = "\
┌──────────────────────────────────────────┐\n\
│            Available Commands            │\n\
├──────────────────────────────────────────┤\n\
│  `exit`       - Quit CodeMentor          │\n\
│  `clear`      - Clear the chat           │\n\
│  `temp`       - Show response creativity │\n\
│  `temp <0.2-1.0>` - Set creativity       │\n\
│  `help`       - Show this box            │\n\
└──────────────────────────────────────────┘";
