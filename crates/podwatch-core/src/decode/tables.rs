//! Mode and command lookup tables
//!
//! The protocol nests a two-byte command selector under a mode byte; this
//! module holds the static two-level table mapping both to a label and an
//! optional parameter decoder. Tables are plain `const` slices, built once
//! into the binary and safe for unsynchronized concurrent reads.

use super::codec::{format_ms, hex_string, printable, u32_be};

/// Rendering for enumeration keys the tables do not know
const UNKNOWN: &str = "<UNKNOWN>";

/// Mode byte names
pub const MODE_MAP: &[(u8, &str)] = &[
    (0x00, "Switching"),
    (0x01, "Voice recorder"),
    (0x02, "Simple remote"),
    (0x03, "Request mode status"),
    (0x04, "Advanced remote"),
];

/// Result codes carried by a Result response
pub const FEEDBACK_RESULT: &[(u8, &str)] = &[
    (0x00, "Success"),
    (0x02, "Failure"),
    (0x04, "Exceeded limit/byte count wrong"),
    (0x05, "is a response, not a command"),
];

/// Database item categories
pub const ITEM_TYPES: &[(u8, &str)] = &[
    (0x01, "Playlist"),
    (0x02, "Artist"),
    (0x03, "Album"),
    (0x04, "Genre"),
    (0x05, "Song"),
    (0x06, "Composer"),
];

/// Player state reported by time-and-status responses
pub const PLAYBACK_STATUS: &[(u8, &str)] = &[
    (0x00, "Stopped"),
    (0x01, "Playing"),
    (0x02, "Paused"),
];

/// Polling mode selector values
pub const POLLING_MODE: &[(u8, &str)] = &[(0x00, "Start"), (0x01, "Stop")];

/// Kinds of unsolicited poll updates
pub const POLLING_UPDATE: &[(u8, &str)] = &[
    (0x01, "track change"),
    (0x02, "Stop after FFwd?"),
    (0x03, "Stop after FRwd?"),
    (0x04, "elapsed time"),
];

/// Playback control actions
pub const PLAYBACK_CONTROL: &[(u8, &str)] = &[
    (0x01, "Play/Pause"),
    (0x02, "Stop"),
    (0x03, "Skip++"),
    (0x04, "Skip--"),
    (0x05, "FFwd"),
    (0x06, "FRwd"),
    (0x07, "Stop FFwd/FRwd"),
];

/// Repeat and shuffle scope values
pub const REPEAT_SHUFFLE_MODE: &[(u8, &str)] = &[
    (0x00, "Off"),
    (0x01, "Songs"),
    (0x02, "Albums"),
];

fn enum_name(table: &'static [(u8, &'static str)], key: u8) -> Option<&'static str> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, name)| name)
}

fn enum_or_unknown(table: &'static [(u8, &'static str)], key: u8) -> &'static str {
    enum_name(table, key).unwrap_or(UNKNOWN)
}

/// Parameter decoder attached to a command table entry
///
/// A closed set of decode shapes dispatched by tag. Every variant is total
/// over arbitrary parameter bytes: slices too short for a variant's shape
/// fall back to the raw hex rendering instead of failing, so a malformed
/// payload can never take down a capture thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDecoder {
    /// Space-separated hex of the parameter bytes
    Hex,
    /// Printable ASCII projection, NUL-terminated
    Printable,
    /// Big-endian u32 field
    Number,
    /// First byte looked up in a static enumeration
    Enumerated(&'static [(u8, &'static str)]),
    /// Item-type byte followed by a u32 ordinal
    ItemWithNumber,
    /// Item-type byte alone
    ItemType,
    /// Item-type byte, u32 offset, u32 count
    ItemRange,
    /// u32 index followed by a printable name
    IndexedName,
    /// Track length, elapsed time, and playback status
    TimeAndStatus,
    /// Poll-update kind byte plus its value
    PollUpdate,
    /// Result code plus a back-reference to the acknowledged command
    CommandResult,
}

impl ParamDecoder {
    /// Render parameter bytes into transcript text
    pub fn decode(&self, params: &[u8]) -> String {
        match self {
            ParamDecoder::Hex => hex_string(params),
            ParamDecoder::Printable => printable(params),
            ParamDecoder::Number => match (params.len(), u32_be(params)) {
                (4, Some(n)) => n.to_string(),
                _ => hex_string(params),
            },
            ParamDecoder::Enumerated(table) => match params.first() {
                Some(&key) => enum_or_unknown(table, key).to_string(),
                None => hex_string(params),
            },
            ParamDecoder::ItemWithNumber => match (params.first(), u32_be(&params[1.min(params.len())..])) {
                (Some(&item), Some(n)) if params.len() == 5 => {
                    format!("type: {}, number: {}", enum_or_unknown(ITEM_TYPES, item), n)
                }
                _ => hex_string(params),
            },
            ParamDecoder::ItemType => match params.first() {
                Some(&item) => format!("type: {}", enum_or_unknown(ITEM_TYPES, item)),
                None => hex_string(params),
            },
            ParamDecoder::ItemRange => {
                if params.len() == 9 {
                    let item = enum_or_unknown(ITEM_TYPES, params[0]);
                    let offset = u32_be(&params[1..5]).unwrap_or(0);
                    let count = u32_be(&params[5..9]).unwrap_or(0);
                    format!("type: {}, offset: {}, count: {}", item, offset, count)
                } else {
                    hex_string(params)
                }
            }
            ParamDecoder::IndexedName => match u32_be(params) {
                Some(index) => format!("[{}] {}", index, printable(&params[4..])),
                None => hex_string(params),
            },
            ParamDecoder::TimeAndStatus => {
                match (u32_be(params), u32_be(&params[4.min(params.len())..]), params.last()) {
                    (Some(track_len), Some(elapsed), Some(&status)) if params.len() >= 9 => {
                        format!(
                            "trk len: {}, elapsed: {}, playback status: {}",
                            format_ms(track_len),
                            format_ms(elapsed),
                            enum_or_unknown(PLAYBACK_STATUS, status)
                        )
                    }
                    _ => hex_string(params),
                }
            }
            ParamDecoder::PollUpdate => match params.split_first() {
                Some((&kind, value)) => {
                    let kind_name = enum_or_unknown(POLLING_UPDATE, kind);
                    let rendered = if value.len() == 4 {
                        let n = u32_be(value).unwrap_or(0);
                        if kind == 0x04 {
                            format_ms(n)
                        } else {
                            n.to_string()
                        }
                    } else {
                        hex_string(value)
                    };
                    format!("mode: {}, value: {}", kind_name, rendered)
                }
                None => hex_string(params),
            },
            ParamDecoder::CommandResult => {
                if params.len() >= 3 {
                    let acknowledged = lookup_command(0x04, (params[1], params[2]))
                        .map(|entry| entry.label)
                        .unwrap_or(UNKNOWN);
                    format!(
                        "{}, result {}",
                        acknowledged,
                        enum_or_unknown(FEEDBACK_RESULT, params[0])
                    )
                } else {
                    hex_string(params)
                }
            }
        }
    }
}

/// One command table entry: selector, label, optional parameter decoder
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    /// Two-byte command selector
    pub command: (u8, u8),
    /// Human label for the transcript
    pub label: &'static str,
    /// Parameter rendering, if the command carries decodable parameters
    pub decoder: Option<ParamDecoder>,
}

const fn entry(command: (u8, u8), label: &'static str, decoder: Option<ParamDecoder>) -> CommandEntry {
    CommandEntry {
        command,
        label,
        decoder,
    }
}

/// Mode 0x00: mode-switch requests
const SWITCHING_COMMANDS: &[CommandEntry] = &[
    entry((0x01, 0x02), "Switch to simple", None),
    entry((0x01, 0x04), "Switch to advanced", None),
];

/// Mode 0x04: the advanced remote command set
const ADVANCED_REMOTE_COMMANDS: &[CommandEntry] = &[
    entry((0x00, 0x01), "Result", Some(ParamDecoder::CommandResult)),
    entry((0x00, 0x12), "Get iPod type", None),
    entry((0x00, 0x13), "iPod type", Some(ParamDecoder::Hex)),
    entry((0x00, 0x14), "Get iPod name", None),
    entry((0x00, 0x15), "iPod name", Some(ParamDecoder::Printable)),
    entry((0x00, 0x16), "Switch to main library playlist", None),
    entry((0x00, 0x17), "Switch to item", Some(ParamDecoder::ItemWithNumber)),
    entry((0x00, 0x18), "Get count of the given type", Some(ParamDecoder::ItemType)),
    entry((0x00, 0x19), "count of the requested type", Some(ParamDecoder::Number)),
    entry((0x00, 0x1A), "Get names for range of the given type", Some(ParamDecoder::ItemRange)),
    entry((0x00, 0x1B), "names for index in range of requested type", Some(ParamDecoder::IndexedName)),
    entry((0x00, 0x1C), "Get time and status info", None),
    entry((0x00, 0x1D), "time and status info", Some(ParamDecoder::TimeAndStatus)),
    entry((0x00, 0x1E), "Get current position in playlist", None),
    entry((0x00, 0x1F), "current position in playlist", Some(ParamDecoder::Number)),
    entry((0x00, 0x20), "Get title", Some(ParamDecoder::Number)),
    entry((0x00, 0x21), "title", Some(ParamDecoder::Printable)),
    entry((0x00, 0x22), "Get artist", Some(ParamDecoder::Number)),
    entry((0x00, 0x23), "artist", Some(ParamDecoder::Printable)),
    entry((0x00, 0x24), "Get album", Some(ParamDecoder::Number)),
    entry((0x00, 0x25), "album", Some(ParamDecoder::Printable)),
    entry((0x00, 0x26), "Set polling mode", Some(ParamDecoder::Enumerated(POLLING_MODE))),
    entry((0x00, 0x27), "Poll", Some(ParamDecoder::PollUpdate)),
    entry((0x00, 0x28), "Execute switch", None),
    entry((0x00, 0x29), "Playback control", Some(ParamDecoder::Enumerated(PLAYBACK_CONTROL))),
    entry((0x00, 0x2C), "Get shuffle mode", None),
    entry((0x00, 0x2D), "shuffle mode", Some(ParamDecoder::Enumerated(REPEAT_SHUFFLE_MODE))),
    entry((0x00, 0x2E), "Set shuffle mode", Some(ParamDecoder::Enumerated(REPEAT_SHUFFLE_MODE))),
    entry((0x00, 0x2F), "Get repeat mode", None),
    entry((0x00, 0x30), "repeat mode", Some(ParamDecoder::Enumerated(REPEAT_SHUFFLE_MODE))),
    entry((0x00, 0x31), "Set repeat mode", Some(ParamDecoder::Enumerated(REPEAT_SHUFFLE_MODE))),
    entry((0x00, 0x32), "Upload picture", None),
    entry((0x00, 0x33), "Get max picture size", None),
    entry((0x00, 0x34), "max picture size", Some(ParamDecoder::Hex)),
    entry((0x00, 0x35), "Get number of songs in playlist", None),
    entry((0x00, 0x36), "number of songs in playlist", Some(ParamDecoder::Number)),
];

/// Name for a mode byte, if recognized
pub fn lookup_mode(mode: u8) -> Option<&'static str> {
    enum_name(MODE_MAP, mode)
}

fn mode_table(mode: u8) -> Option<&'static [CommandEntry]> {
    match mode {
        0x00 => Some(SWITCHING_COMMANDS),
        0x04 => Some(ADVANCED_REMOTE_COMMANDS),
        _ => None,
    }
}

/// Table entry for a command pair within a mode, if both resolve
///
/// Modes without a command sub-table (voice recorder, simple remote, mode
/// status) resolve the mode name only.
pub fn lookup_command(mode: u8, command: (u8, u8)) -> Option<&'static CommandEntry> {
    mode_table(mode)?.iter().find(|e| e.command == command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_lookup() {
        assert_eq!(lookup_mode(0x04), Some("Advanced remote"));
        assert_eq!(lookup_mode(0xFF), None);
    }

    #[test]
    fn test_command_lookup() {
        let entry = lookup_command(0x04, (0x00, 0x1D)).expect("known command");
        assert_eq!(entry.label, "time and status info");
        assert!(entry.decoder.is_some());

        assert!(lookup_command(0x04, (0x7F, 0x7F)).is_none());
        // Recognized mode without a command sub-table
        assert!(lookup_command(0x02, (0x00, 0x01)).is_none());
    }

    #[test]
    fn test_time_and_status_decode() {
        let params = [0, 0, 0x27, 0x10, 0, 0, 0x09, 0xC4, 0x01];
        let text = ParamDecoder::TimeAndStatus.decode(&params);
        assert_eq!(
            text,
            "trk len: 0:10.000, elapsed: 0:02.500, playback status: Playing"
        );
    }

    #[test]
    fn test_nested_result_decode() {
        // Result for "Switch to item", code 0 (Success)
        let text = ParamDecoder::CommandResult.decode(&[0x00, 0x00, 0x17]);
        assert_eq!(text, "Switch to item, result Success");

        let unknown_cmd = ParamDecoder::CommandResult.decode(&[0x02, 0x7F, 0x7F]);
        assert_eq!(unknown_cmd, "<UNKNOWN>, result Failure");
    }

    #[test]
    fn test_poll_update_decode() {
        let elapsed = ParamDecoder::PollUpdate.decode(&[0x04, 0, 0, 0x09, 0xC4]);
        assert_eq!(elapsed, "mode: elapsed time, value: 0:02.500");

        let track = ParamDecoder::PollUpdate.decode(&[0x01, 0, 0, 0, 0x07]);
        assert_eq!(track, "mode: track change, value: 7");

        let odd = ParamDecoder::PollUpdate.decode(&[0x09, 0xAB]);
        assert_eq!(odd, "mode: <UNKNOWN>, value: ab");
    }

    #[test]
    fn test_item_decoders() {
        let switch = ParamDecoder::ItemWithNumber.decode(&[0x05, 0, 0, 0, 0x2A]);
        assert_eq!(switch, "type: Song, number: 42");

        let range = ParamDecoder::ItemRange.decode(&[0x03, 0, 0, 0, 0, 0, 0, 0, 0x0A]);
        assert_eq!(range, "type: Album, offset: 0, count: 10");

        let named = ParamDecoder::IndexedName.decode(&[0, 0, 0, 0x02, b'A', b'b', b'b', b'e', b'y']);
        assert_eq!(named, "[2] Abbey");
    }

    #[test]
    fn test_short_params_fall_back_to_hex() {
        assert_eq!(ParamDecoder::Number.decode(&[0xDE, 0xAD]), "de ad");
        assert_eq!(ParamDecoder::TimeAndStatus.decode(&[0x01]), "01");
        assert_eq!(ParamDecoder::CommandResult.decode(&[0x00]), "00");
        assert_eq!(ParamDecoder::ItemWithNumber.decode(&[0x01, 0x02]), "01 02");
    }

    #[test]
    fn test_enumerated_decode() {
        let table = ParamDecoder::Enumerated(PLAYBACK_CONTROL);
        assert_eq!(table.decode(&[0x03]), "Skip++");
        assert_eq!(table.decode(&[0x63]), "<UNKNOWN>");
    }
}
