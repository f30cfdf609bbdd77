//! Deterministic cache keys: `<operation>:<arg1>:...:<argN>`
//!
//! Absent optional arguments are written as the empty string so positions
//! never shift. Keys are shared with other processes through the primary
//! tier, so this format must stay stable.

use std::fmt::Display;

pub const SEPARATOR: char = ':';

/// Builder for cache keys
#[derive(Debug, Clone)]
pub struct CacheKey {
    key: String,
}

impl CacheKey {
    pub fn new(operation: &str) -> Self {
        Self {
            key: operation.to_string(),
        }
    }

    pub fn arg(mut self, value: impl Display) -> Self {
        self.key.push(SEPARATOR);
        self.key.push_str(&value.to_string());
        self
    }

    pub fn opt_arg<T: Display>(self, value: Option<T>) -> Self {
        match value {
            Some(v) => self.arg(v),
            None => self.arg(""),
        }
    }

    pub fn build(self) -> String {
        self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = CacheKey::new("search_procedures")
            .arg("Aetna")
            .arg("PPO")
            .arg("mri")
            .build();
        assert_eq!(key, "search_procedures:Aetna:PPO:mri");
    }

    #[test]
    fn test_absent_arguments_keep_position() {
        let key = CacheKey::new("op")
            .opt_arg(None::<&str>)
            .arg("x")
            .opt_arg(Some(1.5))
            .opt_arg(None::<f64>)
            .build();
        assert_eq!(key, "op::x:1.5:");
    }

    #[test]
    fn test_operation_only() {
        assert_eq!(CacheKey::new("list_plans").build(), "list_plans");
    }
}
