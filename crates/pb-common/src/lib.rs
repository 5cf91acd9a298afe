//! Shared building blocks for the Policy Bridge crates.

pub mod logging;
pub mod secret;

pub use secret::Secret;

/// Mask an identifier for log output.
///
/// Email addresses keep their first character and the domain
/// (`alice@example.com` becomes `a***@example.com`); anything else keeps only
/// its first character.
pub fn mask_identifier(identifier: &str) -> String {
    let mut chars = identifier.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return String::new(),
    };

    match identifier.find('@') {
        Some(at) => format!("{}***{}", first, &identifier[at..]),
        None => format!("{}***", first),
    }
}
