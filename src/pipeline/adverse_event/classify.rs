use super::types::{Seriousness, Severity};

/// `NonSerious` exactly when the severity is `None`.
pub fn seriousness(severity: Severity) -> Seriousness {
    match severity {
        Severity::None => Seriousness::NonSerious,
        _ => Seriousness::Serious,
    }
}
