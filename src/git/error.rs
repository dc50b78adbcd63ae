//! Readable messages for git2 failures

use git2::{Error, ErrorClass};

type Matcher = fn(&str, ErrorClass) -> bool;

/// First match wins, so the more specific patterns come first
const KNOWN_FAILURES: &[(Matcher, &str)] = &[
    (
        |msg, _| msg.contains("not found") || msg.contains("404"),
        "Remote repository not found",
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        "Authentication failed",
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        "Permission denied",
    ),
    (
        |msg, _| msg.contains("non-fast-forward") || msg.contains("fetch first"),
        "Remote has commits that are not in the local branch; pull first",
    ),
    (
        |msg, _| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("timeout")
                || msg.contains("timed out")
        },
        "Network error",
    ),
    (
        |msg, class| class == ErrorClass::Http && msg.contains("certificate"),
        "Certificate error",
    ),
];

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    let class = err.class();

    if let Some((_, text)) = KNOWN_FAILURES
        .iter()
        .find(|(matches, _)| matches(&message, class))
    {
        return (*text).to_string();
    }

    match class {
        ErrorClass::Http => format!("HTTP error: {}", err.message()),
        ErrorClass::Ssh => format!("SSH error: {}", err.message()),
        _ => err.message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::ErrorCode;

    fn error(class: ErrorClass, message: &str) -> Error {
        Error::new(ErrorCode::GenericError, class, message)
    }

    #[test]
    fn test_known_failures() {
        assert_eq!(
            interpret_git_error(&error(ErrorClass::Http, "unexpected http status code: 404")),
            "Remote repository not found"
        );
        assert_eq!(
            interpret_git_error(&error(ErrorClass::Reference, "cannot push non-fast-forwardable reference")),
            "Remote has commits that are not in the local branch; pull first"
        );
    }

    #[test]
    fn test_class_prefix_fallback() {
        assert_eq!(
            interpret_git_error(&error(ErrorClass::Ssh, "handshake broke")),
            "SSH error: handshake broke"
        );
        assert_eq!(
            interpret_git_error(&error(ErrorClass::Index, "index locked")),
            "index locked"
        );
    }
}
