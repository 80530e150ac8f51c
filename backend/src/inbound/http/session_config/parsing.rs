//! Toggle parsing shared by the session settings.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// A boolean environment toggle with its debug-mode default.
pub(super) struct BoolToggle {
    name: &'static str,
    default_value: bool,
}

impl BoolToggle {
    pub(super) const fn new(name: &'static str, default_value: bool) -> Self {
        Self {
            name,
            default_value,
        }
    }

    /// Read the toggle, passing parsed values through `check`.
    pub(super) fn read<E, F>(
        &self,
        env: &E,
        mode: BuildMode,
        check: F,
    ) -> Result<bool, SessionConfigError>
    where
        E: Env,
        F: FnOnce(bool, BuildMode) -> Result<bool, SessionConfigError>,
    {
        let name = self.name;
        let default_value = self.default_value;
        let Some(value) = env.string(name) else {
            return lenient_or_error(
                mode,
                default_value,
                SessionConfigError::MissingEnv { name },
                || warn!(variable = name, default = default_value, "session toggle not set"),
            );
        };
        match parse_bool(&value) {
            Some(flag) => check(flag, mode),
            None => {
                let rejected = value.clone();
                lenient_or_error(
                    mode,
                    default_value,
                    SessionConfigError::InvalidEnv {
                        name,
                        value: rejected,
                        expected: BOOL_EXPECTED,
                    },
                    || {
                        warn!(
                            variable = name,
                            %value,
                            default = default_value,
                            "invalid session toggle"
                        );
                    },
                )
            }
        }
    }
}

/// Return `fallback` after warning in debug builds, `error` otherwise.
pub(super) fn lenient_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: F,
) -> Result<T, SessionConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

pub(super) fn parse_same_site(
    value: String,
    mode: BuildMode,
    cookie_secure: bool,
    fallback: SameSite,
) -> Result<SameSite, SessionConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient_or_error(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SESSION_SAMESITE=None without secure cookies; browsers may drop the cookie"),
        ),
        _ => {
            let rejected = value.clone();
            lenient_or_error(
                mode,
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: rejected,
                    expected: SAMESITE_EXPECTED,
                },
                || warn!(%value, "invalid SESSION_SAMESITE; using default"),
            )
        }
    }
}

pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
