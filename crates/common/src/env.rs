use std::str::FromStr;

pub trait EnvVars {
    fn load() -> Self;
    fn get_env_var(&self, key: &str) -> String;
}

/// Reads `key` and parses it, falling back to `default` when the variable is
/// unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("[EnvVars] {} has an invalid value {:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back() {
        std::env::set_var("GACHA_COMMON_TEST_BAD_NUMBER", "abc");
        assert_eq!(env_or("GACHA_COMMON_TEST_BAD_NUMBER", 7u64), 7);
        assert_eq!(env_or("GACHA_COMMON_TEST_UNSET_NUMBER", 3.5f64), 3.5);

        std::env::set_var("GACHA_COMMON_TEST_GOOD_NUMBER", " 42 ");
        assert_eq!(env_or("GACHA_COMMON_TEST_GOOD_NUMBER", 0u32), 42);
    }
}
