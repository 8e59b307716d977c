//! Fuzz target: `Command::parse` and the tokenizer underneath it.
//!
//! Drives arbitrary payload bytes through the command parser and asserts
//! that it never panics and that the tokenizer's rejoin invariant holds
//! for every UTF-8 payload.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomsense::app::commands::{tokenize, Command, MAX_WORDS};

fuzz_target!(|data: &[u8]| {
    // Parse must drop garbage silently, never panic.
    let _ = Command::parse("fuzz", data);

    if let Ok(text) = core::str::from_utf8(data) {
        let words = tokenize(text);
        assert!(!words.is_empty() && words.len() <= MAX_WORDS);

        // Rejoining with single spaces must reconstruct the payload.
        let rejoined = words
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, text);
    }
});
