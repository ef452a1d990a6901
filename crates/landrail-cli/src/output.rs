//! Formatted output helpers for CLI commands.

use bitflags::Flags;
use bitflags::parser::WriteHex;

/// Formats a set of rights in its textual form (e.g., "READ_FILE | READ_DIR"),
/// or "none" when empty.
#[must_use]
pub fn format_flags<B>(flags: &B) -> String
where
    B: Flags,
    B::Bits: WriteHex,
{
    if flags.is_empty() {
        return "none".to_owned();
    }
    let mut out = String::new();
    match bitflags::parser::to_writer(flags, &mut out) {
        Ok(()) => out,
        Err(_) => "<unprintable>".to_owned(),
    }
}
