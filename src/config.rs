use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `JWT_TTL_MINUTES` (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userauth".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userauth-clients".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: env_parse("HASH_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_parse("HASH_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_parse("HASH_PARALLELISM").unwrap_or(defaults.parallelism),
        };

        if !(1..=MAX_TTL_MINUTES).contains(&jwt.ttl_minutes) {
            anyhow::bail!(
                "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {}",
                jwt.ttl_minutes
            );
        }

        Ok(Self { jwt, hash })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "JWT_SECRET",
        "JWT_ISSUER",
        "JWT_AUDIENCE",
        "JWT_TTL_MINUTES",
        "HASH_MEMORY_KIB",
        "HASH_ITERATIONS",
        "HASH_PARALLELISM",
    ];

    fn with_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = VARS
            .iter()
            .map(|k| (*k, set.iter().find(|(s, _)| s == k).map(|(_, v)| *v)))
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn missing_secret_fails_fast() {
        with_env(&[], || {
            let err = AppConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn blank_secret_is_rejected() {
        with_env(&[("JWT_SECRET", "   ")], || {
            assert!(AppConfig::from_env().is_err());
        });
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        with_env(&[("JWT_SECRET", "s3cret")], || {
            let cfg = AppConfig::from_env().expect("config");
            assert_eq!(cfg.jwt.secret, "s3cret");
            assert_eq!(cfg.jwt.issuer, "userauth");
            assert_eq!(cfg.jwt.audience, "userauth-clients");
            assert_eq!(cfg.jwt.ttl_minutes, 60);
            assert_eq!(cfg.hash, HashConfig::default());
        });
    }

    #[test]
    fn out_of_range_ttl_fails_fast() {
        for ttl in ["0", "-5", "9223372036854775807", "525601"] {
            with_env(&[("JWT_SECRET", "s3cret"), ("JWT_TTL_MINUTES", ttl)], || {
                let err = AppConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_TTL_MINUTES"), "ttl {ttl}");
            });
        }
        with_env(&[("JWT_SECRET", "s3cret"), ("JWT_TTL_MINUTES", "525600")], || {
            assert_eq!(AppConfig::from_env().expect("config").jwt.ttl_minutes, MAX_TTL_MINUTES);
        });
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        with_env(
            &[
                ("JWT_SECRET", "s3cret"),
                ("JWT_TTL_MINUTES", "soon"),
                ("HASH_ITERATIONS", "3"),
            ],
            || {
                let cfg = AppConfig::from_env().expect("config");
                assert_eq!(cfg.jwt.ttl_minutes, 60);
                assert_eq!(cfg.hash.iterations, 3);
            },
        );
    }
}
