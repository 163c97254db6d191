/// Maximum message content length (bytes).
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Validate message content. Must be non-empty (whitespace-only counts as
/// empty) and under the length limit. Runs before anything reaches the
/// store or the AI trigger check.
pub fn validate_message(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Message cannot be empty".into());
    }
    if content.len() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_validation() {
        assert!(validate_message("hello").is_ok());
        assert!(validate_message("").is_err());
        assert!(validate_message("   ").is_err());
        assert!(validate_message("\n\t").is_err());
        assert!(validate_message(&"a".repeat(2001)).is_err());
        assert!(validate_message(&"a".repeat(2000)).is_ok());
    }
}
