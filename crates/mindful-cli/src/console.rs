//! Maps console lines onto session intents.

use mindful_core::{AmbientSound, DurationPreset, Intent, SettingChange, ValidationError};

pub const HELP: &str = "\
commands:
  <enter> | toggle     start or pause
  start | pause | reset
  duration <preset>    e.g. duration 5m (only while not running)
  sound <name>         none, rain, forest, binaural
  fade on|off
  chime <minutes>      0 turns interval chimes off
  set <key> <value>    same keys as above
  status               print the current state
  history              print this month's practice
  help | quit";

/// One parsed console line.
#[derive(Debug, PartialEq)]
pub enum Line {
    Intent(Intent),
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Line, ValidationError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Line::Intent(Intent::Toggle));
    };
    let rest: Vec<&str> = words.collect();
    let arg = rest.join(" ");

    let intent = match command.to_ascii_lowercase().as_str() {
        "toggle" | "t" => Intent::Toggle,
        "start" | "s" => Intent::Start,
        "pause" | "p" => Intent::Pause,
        "reset" | "r" => Intent::Reset,
        "status" => Intent::Snapshot,
        "history" | "h" => Intent::History,
        "help" | "?" => return Ok(Line::Help),
        "quit" | "q" | "exit" => return Ok(Line::Quit),
        "duration" | "d" => Intent::SetDuration(DurationPreset::parse(&arg)?.secs),
        "sound" => Intent::SelectSound(arg.parse::<AmbientSound>()?),
        "fade" | "chime" => Intent::ChangeSetting(SettingChange::parse(command, &arg)?),
        "set" => match rest.split_first() {
            Some((key, value)) => {
                Intent::ChangeSetting(SettingChange::parse(key, &value.join(" "))?)
            }
            None => return Err(missing("set", "<key> <value>")),
        },
        other => {
            return Err(ValidationError::InvalidValue {
                field: "command".into(),
                message: format!("unknown command '{other}', try 'help'"),
            })
        }
    };
    Ok(Line::Intent(intent))
}

fn missing(field: &str, usage: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message: format!("usage: {field} {usage}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(line: &str) -> Intent {
        match parse_line(line).unwrap() {
            Line::Intent(intent) => intent,
            other => panic!("Expected intent, got {other:?}"),
        }
    }

    #[test]
    fn empty_line_toggles() {
        assert_eq!(intent(""), Intent::Toggle);
        assert_eq!(intent("   "), Intent::Toggle);
    }

    #[test]
    fn plain_commands() {
        assert_eq!(intent("start"), Intent::Start);
        assert_eq!(intent("PAUSE"), Intent::Pause);
        assert_eq!(intent("reset"), Intent::Reset);
        assert_eq!(intent("status"), Intent::Snapshot);
        assert_eq!(intent("history"), Intent::History);
        assert_eq!(parse_line("quit").unwrap(), Line::Quit);
        assert_eq!(parse_line("help").unwrap(), Line::Help);
    }

    #[test]
    fn duration_accepts_labels_and_seconds() {
        assert_eq!(intent("duration 5m"), Intent::SetDuration(300));
        assert_eq!(intent("duration 30s"), Intent::SetDuration(30));
        assert_eq!(intent("d 900"), Intent::SetDuration(900));
        assert!(parse_line("duration 7m").is_err());
        assert!(parse_line("duration").is_err());
    }

    #[test]
    fn settings() {
        assert_eq!(
            intent("sound forest"),
            Intent::SelectSound(AmbientSound::Forest)
        );
        assert_eq!(
            intent("fade off"),
            Intent::ChangeSetting(SettingChange::Fade(false))
        );
        assert_eq!(
            intent("chime 10"),
            Intent::ChangeSetting(SettingChange::ChimeInterval(10))
        );
        assert_eq!(
            intent("set sound binaural"),
            Intent::ChangeSetting(SettingChange::Sound(AmbientSound::Binaural))
        );
        assert!(parse_line("sound ocean").is_err());
        assert!(parse_line("set").is_err());
        assert!(parse_line("set volume 3").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        let err = parse_line("meditate").unwrap_err();
        assert!(err.to_string().contains("meditate"));
    }
}
