//! Key naming conventions for the kv store.
//!
//! The key space is partitioned into disjoint namespaces by string prefix,
//! one per resource type. Discriminators are uuid v4 so two concurrent
//! creates can never collide on a key.

use uuid::Uuid;

pub const SESSION_PREFIX: &str = "session:";
pub const ROUTER_PREFIX: &str = "router:";
pub const USER_PREFIX: &str = "user:";
pub const VOUCHER_PREFIX: &str = "voucher:";
pub const HOTSPOT_SESSION_PREFIX: &str = "hotspot-session:";
pub const LOG_PREFIX: &str = "log:";
pub const TRAFFIC_PREFIX: &str = "traffic:";

// Singleton configuration blobs
pub const SESSION_SETTINGS_KEY: &str = "config:session-settings";
pub const LOGIN_TEMPLATE_KEY: &str = "config:login-template";

pub fn router_key() -> String {
    format!("{}{}", ROUTER_PREFIX, Uuid::new_v4())
}

pub fn user_key() -> String {
    format!("{}{}", USER_PREFIX, Uuid::new_v4())
}

pub fn log_key() -> String {
    format!("{}{}", LOG_PREFIX, Uuid::new_v4())
}

pub fn session_key(token: &str) -> String {
    format!("{}{}", SESSION_PREFIX, token)
}

pub fn voucher_key(code: &str) -> String {
    format!("{}{}", VOUCHER_PREFIX, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_carry_their_prefix() {
        assert!(router_key().starts_with(ROUTER_PREFIX));
        assert!(user_key().starts_with(USER_PREFIX));
        assert!(log_key().starts_with(LOG_PREFIX));
        assert_eq!("session:tok", session_key("tok"));
        assert_eq!("voucher:ABCD2345", voucher_key("ABCD2345"));
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        assert_ne!(router_key(), router_key());
        assert_ne!(user_key(), user_key());
    }
}
