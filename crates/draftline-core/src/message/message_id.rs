//! Message-ID extraction from `In-Reply-To` and `References` values.
//!
//! Accepts whitespace, commas and RFC 5322 comments between ids. Enclosing
//! angle brackets are stripped from the result.

use super::model::MessageId;

/// Extract every bracketed message id in document order.
///
/// Text outside `<...>` that is not a comment is ignored, so stray words
/// some mailers put into `References` do not break the chain.
#[must_use]
pub fn extract_message_ids(value: &str) -> Vec<MessageId> {
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut ids = Vec::new();
    let mut pos = 0;

    while pos < len {
        match bytes[pos] {
            b'(' => skip_comment(bytes, &mut pos),
            b'<' => {
                let start = pos + 1;
                let Some(end) = value[start..].find('>').map(|i| start + i) else {
                    break;
                };
                let inner = value[start..end].trim();
                if !inner.is_empty() {
                    ids.push(MessageId::new(inner));
                }
                pos = end + 1;
            }
            _ => pos += 1,
        }
    }

    ids
}

/// Extract a single message id.
///
/// Returns the first bracketed id; a bare single token without brackets
/// is accepted as-is.
#[must_use]
pub fn extract_message_id(value: &str) -> Option<MessageId> {
    if let Some(id) = extract_message_ids(value).into_iter().next() {
        return Some(id);
    }
    let bare = value.trim();
    if bare.is_empty() || bare.contains(char::is_whitespace) || bare.contains(['<', '>', '(']) {
        return None;
    }
    Some(MessageId::new(bare))
}

fn skip_comment(bytes: &[u8], pos: &mut usize) {
    let mut depth = 0usize;
    while *pos < bytes.len() {
        match bytes[*pos] {
            b'\\' => *pos += 1,
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    *pos += 1;
                    return;
                }
            }
            _ => {}
        }
        *pos += 1;
    }
}
