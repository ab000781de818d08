use crate::fields::{is_affirmative, is_suspended_marker};
use crate::models::StatusLabel;

/// Derives the status of a case. A row can carry several truthy markers at
/// once; the first rule that matches wins.
pub fn classify(completion: &str, support_passed: &str) -> StatusLabel {
    if is_suspended_marker(completion) {
        StatusLabel::Suspended
    } else if is_affirmative(support_passed) {
        StatusLabel::HandedToSupport
    } else if is_affirmative(completion) {
        StatusLabel::Completed
    } else {
        StatusLabel::InProgress
    }
}
