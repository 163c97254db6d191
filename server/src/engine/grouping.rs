use chrono::Duration;

use super::store::Message;

/// Two consecutive messages from the same author within this window render
/// as one block (the second hides its author/avatar/timestamp header).
pub const GROUP_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Whether `current` renders as a continuation of `previous`.
///
/// Evaluated independently for every adjacent pair — each message only ever
/// compares against its immediate predecessor, so a long run re-qualifies at
/// every step. The first message of a channel has no predecessor and is
/// never grouped (the caller passes nothing to compare against).
pub fn should_group_with_previous(current: &Message, previous: &Message) -> bool {
    previous.author.id == current.author.id
        && (current.timestamp - previous.timestamp) < Duration::milliseconds(GROUP_WINDOW_MS)
}
