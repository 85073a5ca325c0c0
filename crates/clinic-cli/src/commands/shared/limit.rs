/// Compute effective limit with precedence: global `--limit` -> `general.default_limit`.
#[must_use]
pub fn effective_limit(global: Option<u32>, configured: u32) -> u32 {
    global.unwrap_or(configured).max(1)
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn flag_takes_precedence() {
        assert_eq!(effective_limit(Some(5), 20), 5);
    }

    #[test]
    fn configured_used_when_flag_missing() {
        assert_eq!(effective_limit(None, 50), 50);
    }

    #[test]
    fn zero_is_raised_to_one() {
        assert_eq!(effective_limit(Some(0), 20), 1);
        assert_eq!(effective_limit(None, 0), 1);
    }
}
