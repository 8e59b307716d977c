//! Inbound command parsing.
//!
//! Remote controllers publish space-delimited ASCII commands to the topic
//! named after the device.  [`Command::parse`] tokenizes the payload and
//! dispatches on the first word (the selector).  Anything that does not
//! match a known selector / argument-count combination is silently dropped;
//! there is no negative-acknowledgment channel back to the sender.

use log::debug;

/// Upper bound on words per command.  Spaces beyond the ninth boundary are
/// folded verbatim into the last word instead of opening new ones.
pub const MAX_WORDS: usize = 10;

/// Split a payload on single ASCII spaces into at most [`MAX_WORDS`] words.
///
/// Word boundaries are literal: doubled spaces produce empty interior words,
/// and once the last slot is reached every remaining byte (spaces included)
/// is appended to it unchanged.  Rejoining the words with single spaces
/// therefore reconstructs the original payload exactly.
pub fn tokenize(payload: &str) -> heapless::Vec<String, MAX_WORDS> {
    let mut words: heapless::Vec<String, MAX_WORDS> = heapless::Vec::new();
    // Capacity is MAX_WORDS and the vec is empty, so this cannot fail.
    let _ = words.push(String::new());

    for ch in payload.chars() {
        if ch == ' ' && words.len() < MAX_WORDS {
            let _ = words.push(String::new());
        } else if let Some(last) = words.last_mut() {
            last.push(ch);
        }
    }
    words
}

/// Configuration fields settable over the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Room,
    Site,
    MyName,
    MqttUser,
    MqttPass,
}

/// `config …` subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Dump the current configuration to the log.
    Show,
    /// Dump, then persist the current configuration to storage.
    Write,
    /// Set one field in memory only (takes effect on `config write`).
    Set(ConfigField, String),
}

/// `led …` with all arguments resolved.
///
/// The three-argument form addresses pixel 0 and latches the colour as the
/// one the presence policy restores; the four-argument form addresses an
/// explicit pixel without latching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCommand {
    pub index: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub latch: bool,
}

/// `display …` subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    Temperature,
    Humidity,
    AirPressure,
    Distance,
    Off,
    Flip,
    /// Freeform text: each word becomes one display line.
    Text(Vec<String>),
}

/// A fully-parsed inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reboot,
    Led(LedCommand),
    Config(ConfigCommand),
    Display(DisplayCommand),
}

impl Command {
    /// Parse a raw inbound message.  Returns `None` for anything that is not
    /// a well-formed command: non-UTF-8 payloads, unknown selectors, and
    /// known selectors with an unmapped argument count.
    pub fn parse(topic: &str, payload: &[u8]) -> Option<Command> {
        let text = core::str::from_utf8(payload).ok()?;
        let words = tokenize(text);
        let argc = words.len() - 1;
        debug!("message arrived [{topic}]: {argc} args");

        match words[0].as_str() {
            "reboot" if argc == 0 => Some(Command::Reboot),
            "led" => parse_led(&words[1..]),
            "config" => parse_config(&words[1..]),
            "display" if argc >= 1 => Some(Command::Display(parse_display(&words[1..]))),
            _ => None,
        }
    }
}

fn parse_led(args: &[String]) -> Option<Command> {
    // Arduino-style toInt(): unparseable numbers read as zero.
    let num = |s: &String| s.parse::<u8>().unwrap_or(0);

    let cmd = match args {
        [r, g, b] => LedCommand {
            index: 0,
            r: num(r),
            g: num(g),
            b: num(b),
            latch: true,
        },
        [n, r, g, b] => LedCommand {
            index: num(n),
            r: num(r),
            g: num(g),
            b: num(b),
            latch: false,
        },
        _ => return None,
    };
    Some(Command::Led(cmd))
}

fn parse_config(args: &[String]) -> Option<Command> {
    let cmd = match args {
        [] => ConfigCommand::Show,
        [w] if w == "write" => ConfigCommand::Write,
        [key, value] => {
            let field = match key.as_str() {
                "room" => ConfigField::Room,
                "site" => ConfigField::Site,
                "myname" => ConfigField::MyName,
                "mqttuser" => ConfigField::MqttUser,
                "mqttpass" => ConfigField::MqttPass,
                _ => return None,
            };
            ConfigCommand::Set(field, value.clone())
        }
        _ => return None,
    };
    Some(Command::Config(cmd))
}

/// Known quirk, kept on purpose: the keyword is matched against the first
/// argument alone, so `display temperature extra` still selects the
/// temperature readout rather than falling through to freeform text.
fn parse_display(args: &[String]) -> DisplayCommand {
    match args[0].as_str() {
        "humidity" => DisplayCommand::Humidity,
        "airpressure" => DisplayCommand::AirPressure,
        "temperature" => DisplayCommand::Temperature,
        "distance" => DisplayCommand::Distance,
        "off" => DisplayCommand::Off,
        "flip" => DisplayCommand::Flip,
        _ => DisplayCommand::Text(args.to_vec()),
    }
}
