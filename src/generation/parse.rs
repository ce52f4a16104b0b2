use crate::models::ThoughtReply;

/// Separates the inquiry from the creation.
pub const CREATION_MARKER: &str = "---창조---";
/// Separates the thought from the inquiry.
pub const INQUIRY_MARKER: &str = "---질문---";
/// Label the model is asked to put in front of its thought.
pub const THOUGHT_LABEL: &str = "사유:";

/// Split a first-exposure reply into thought, inquiry and creation.
///
/// The split is textual and order dependent: the creation marker is split off
/// first, then the inquiry marker, then the thought label is stripped. Blank
/// inquiry or creation sections count as absent. Only the first occurrence of
/// each marker splits; anything after a second occurrence is dropped.
pub fn parse_reply(text: &str) -> ThoughtReply {
    let mut creation_split = text.split(CREATION_MARKER);
    let head = creation_split.next().unwrap_or_default();
    let creation = creation_split.next().map(str::trim).and_then(non_blank);

    let mut inquiry_split = head.split(INQUIRY_MARKER);
    let thought_part = inquiry_split.next().unwrap_or_default();
    let inquiry = inquiry_split.next().map(str::trim).and_then(non_blank);

    let thought = thought_part
        .strip_prefix(THOUGHT_LABEL)
        .unwrap_or(thought_part)
        .trim()
        .to_string();

    ThoughtReply {
        thought,
        inquiry,
        creation,
    }
}

fn non_blank(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
