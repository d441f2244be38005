//! Test utilities and shared fixtures for the CS Club bot workspace.
//!
//! Enabled for other crates through the `testing` feature.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Discord-related test fixtures.
pub mod discord_fixtures {
    use crate::{GuildId, RoleId, UserId};

    /// A guild ID used across tests.
    pub fn test_guild_id() -> GuildId {
        GuildId(123_456_789_012_345_678)
    }

    /// A user ID used across tests.
    pub fn test_user_id() -> UserId {
        UserId(987_654_321_098_765_432)
    }

    /// A developer role ID used across tests.
    pub fn test_role_id() -> RoleId {
        RoleId(555_555_555_555_555_555)
    }
}

/// Configuration-related test fixtures.
pub mod config_fixtures {
    /// A minimal configuration: everything else takes defaults.
    pub fn minimal_config_yaml() -> &'static str {
        "default_prefix: \"?\"\n"
    }

    /// A configuration touching every section.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "default_prefix: \"]\"\n",
            "prefixes:\n",
            "  123456789012345678: \"!\"\n",
            "token_file: \"secrets/token.txt\"\n",
            "dev_roles:\n",
            "  123456789012345678:\n",
            "    - 555555555555555555\n",
            "disabled_extensions:\n",
            "  - cogs.example\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  file: \"logs/bot.log\"\n",
            "  json: true\n",
        )
    }
}

/// Property-based testing strategies.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use crate::{GuildId, UserId};
    use proptest::prelude::*;

    /// Strategy for generating valid Discord user IDs.
    pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
        (100_000_000_000_000_000u64..=999_999_999_999_999_999u64).prop_map(UserId)
    }

    /// Strategy for generating valid Discord guild IDs.
    pub fn guild_id_strategy() -> impl Strategy<Value = GuildId> {
        (100_000_000_000_000_000u64..=999_999_999_999_999_999u64).prop_map(GuildId)
    }

    /// Strategy for generating command prefixes.
    pub fn prefix_strategy() -> impl Strategy<Value = String> {
        r"[!?.\]$%&]{1,3}".prop_map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_fixture_yaml_parses() {
        let value: serde_yaml::Value =
            serde_yaml::from_str(config_fixtures::full_config_yaml()).unwrap();
        assert_eq!(value["default_prefix"].as_str(), Some("]"));
    }

    #[test]
    fn test_discord_fixtures_are_nonzero() {
        assert!(discord_fixtures::test_guild_id().0 > 0);
        assert!(discord_fixtures::test_user_id().0 > 0);
        assert!(discord_fixtures::test_role_id().0 > 0);
    }
}
