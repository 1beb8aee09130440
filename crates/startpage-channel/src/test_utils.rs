//! Test utilities for channel types
//!
//! Builders for host-side wire lines and helpers for inspecting sent ones.

use serde_json::Value;

/// A `SendSetting` line as the host would write it
pub fn send_setting_line(show_again_setting: bool) -> String {
    format!(
        r#"{{"kind":"SendSetting","payload":{{"showAgainSetting":{}}}}}"#,
        show_again_setting
    )
}

/// A `SendSetting` line echoing a correlation id
pub fn send_setting_line_with_id(show_again_setting: bool, id: u64) -> String {
    format!(
        r#"{{"kind":"SendSetting","payload":{{"showAgainSetting":{}}},"id":{}}}"#,
        show_again_setting, id
    )
}

/// Wire kinds of a batch of sent lines, in order.
///
/// Lines that do not parse show up as `"<invalid>"`.
pub fn kinds_of(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            serde_json::from_str::<Value>(line)
                .ok()
                .and_then(|value| value["kind"].as_str().map(str::to_string))
                .unwrap_or_else(|| "<invalid>".to_string())
        })
        .collect()
}

/// The `id` field of a sent line, if any
pub fn id_of(line: &str) -> Option<u64> {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value["id"].as_u64())
}
