//! Ledger error translation.
//!
//! Business-rule rejections from the external ledger arrive as raw
//! error-message text. This table pattern-matches on substrings and
//! translates them into specific user-facing messages. Unknown messages
//! pass through unchanged; every retry is a manual user action.

/// Substring -> user-facing message, first match wins.
const TRANSLATIONS: &[(&str, &str)] = &[
    (
        "Transaction timeout",
        "Transaction is taking too long. Please check your wallet connection and try again.",
    ),
    (
        "Nullifier already used",
        "This identity has already been used. Please use a different verification.",
    ),
    (
        "User not authenticated",
        "Please connect your wallet and verify your identity.",
    ),
    (
        "Insufficient balance",
        "Insufficient tokens. Please add tokens to your wallet.",
    ),
    (
        "Admin resource not found",
        "Contract not properly deployed. Please contact support.",
    ),
    (
        "Country not allowed",
        "This listing is not available in your country.",
    ),
    ("already sold", "This item has already been sold."),
];

/// Translate a raw ledger error message into user-facing text.
pub fn translate_ledger_error(raw: &str) -> String {
    for (needle, message) in TRANSLATIONS {
        if raw.contains(needle) {
            return (*message).to_string();
        }
    }
    raw.to_string()
}
