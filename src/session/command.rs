use clap::ValueEnum;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{GeoPoint, TravelMode};

pub const HELP: &str = "\
Gestures:
  tap <lat> <lon>   propose a map point as origin
  confirm           accept the proposed origin and search for parking
  cancel            reject the proposed origin
  select <id>       show details for a parking spot
  route             draw the route to the selected spot
  link              print a navigation app link to the selected spot
  mode <mode>       driving, walking, cycling or transit
  show              print the current map state
  dismiss           dismiss the current notice
  help              show this text
  quit              leave the session";

/// One line of user input in interactive mode
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Tap(GeoPoint),
    Confirm,
    Cancel,
    Select(String),
    Route,
    Link,
    Mode(TravelMode),
    Show,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("empty input")]
    Empty,
    #[error("unknown gesture '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("unknown travel mode '{0}'")]
    InvalidMode(String),
}

fn parse_coordinate(value: &str, range: f64) -> Result<f64, GestureError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= range)
        .ok_or_else(|| GestureError::InvalidCoordinate(value.to_string()))
}

impl FromStr for Gesture {
    type Err = GestureError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(GestureError::Empty)?;

        let gesture = match verb.to_ascii_lowercase().as_str() {
            "tap" => {
                let (Some(lat), Some(lon)) = (words.next(), words.next()) else {
                    return Err(GestureError::MissingArgument("tap", "<lat> <lon>"));
                };
                Gesture::Tap(GeoPoint::new(
                    parse_coordinate(lat, 90.0)?,
                    parse_coordinate(lon, 180.0)?,
                ))
            }
            "confirm" | "yes" => Gesture::Confirm,
            "cancel" | "no" => Gesture::Cancel,
            "select" => {
                let id = words
                    .next()
                    .ok_or(GestureError::MissingArgument("select", "a spot id"))?;
                Gesture::Select(id.to_string())
            }
            "route" => Gesture::Route,
            "link" => Gesture::Link,
            "mode" => {
                let name = words
                    .next()
                    .ok_or(GestureError::MissingArgument("mode", "a travel mode"))?;
                let mode = <TravelMode as ValueEnum>::from_str(name, true)
                    .map_err(|_| GestureError::InvalidMode(name.to_string()))?;
                Gesture::Mode(mode)
            }
            "show" | "status" => Gesture::Show,
            "dismiss" | "ok" => Gesture::Dismiss,
            "help" | "?" => Gesture::Help,
            "quit" | "exit" => Gesture::Quit,
            other => return Err(GestureError::Unknown(other.to_string())),
        };
        Ok(gesture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tap_keeps_exact_coordinate() {
        let gesture: Gesture = "tap 47.5068428 19.0469664".parse().unwrap();
        assert_eq!(gesture, Gesture::Tap(GeoPoint::new(47.5068428, 19.0469664)));
    }

    #[test]
    fn test_parse_simple_gestures() {
        assert_eq!("  CONFIRM ".parse::<Gesture>().unwrap(), Gesture::Confirm);
        assert_eq!("select 12345".parse::<Gesture>().unwrap(), Gesture::Select("12345".into()));
        assert_eq!(
            "mode Walking".parse::<Gesture>().unwrap(),
            Gesture::Mode(TravelMode::Walking)
        );
        assert_eq!("quit".parse::<Gesture>().unwrap(), Gesture::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Gesture>().unwrap_err(), GestureError::Empty);
        assert_eq!(
            "tap 47.5".parse::<Gesture>().unwrap_err(),
            GestureError::MissingArgument("tap", "<lat> <lon>")
        );
        assert_eq!(
            "tap 91 19".parse::<Gesture>().unwrap_err(),
            GestureError::InvalidCoordinate("91".into())
        );
        assert_eq!(
            "fly".parse::<Gesture>().unwrap_err(),
            GestureError::Unknown("fly".into())
        );
        assert_eq!(
            "mode teleport".parse::<Gesture>().unwrap_err(),
            GestureError::InvalidMode("teleport".into())
        );
    }
}
