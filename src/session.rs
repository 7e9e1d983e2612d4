//! Persisted session flags seeded at application startup.

use serde::{Deserialize, Serialize};

/// Live user-manager flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserManagerSession {
    #[serde(default)]
    pub keep_login: bool,
    #[serde(default)]
    pub remember_password: bool,
}

/// Live session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "UserManager", default)]
    pub user_manager: UserManagerSession,
}

/// Which user-manager fields survive a restart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedUserManager {
    #[serde(default)]
    pub remember_password: bool,
    #[serde(default)]
    pub keep_login: bool,
    #[serde(default)]
    pub password: bool,
    #[serde(default)]
    pub token: bool,
    #[serde(default)]
    pub userid: bool,
}

/// Persisted state object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(rename = "UserManager", default)]
    pub user_manager: PersistedUserManager,
}

/// Copy the session flags into the persisted state. No merging, no validation.
pub fn seed_persisted_session(state: &SessionState, persisted: &mut PersistedState) {
    let live = &state.user_manager;
    let target = &mut persisted.user_manager;

    target.remember_password = true;
    target.keep_login = true;
    target.password = live.keep_login || live.remember_password;
    target.token = live.keep_login;
    target.userid = live.keep_login;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(keep_login: bool, remember_password: bool) -> SessionState {
        SessionState {
            user_manager: UserManagerSession {
                keep_login,
                remember_password,
            },
        }
    }

    #[test]
    fn test_keep_login_persists_everything() {
        let mut persisted = PersistedState::default();
        seed_persisted_session(&state(true, false), &mut persisted);

        let um = &persisted.user_manager;
        assert!(um.remember_password && um.keep_login);
        assert!(um.password && um.token && um.userid);
    }

    #[test]
    fn test_remember_password_only() {
        let mut persisted = PersistedState::default();
        seed_persisted_session(&state(false, true), &mut persisted);

        let um = &persisted.user_manager;
        assert!(um.password);
        assert!(!um.token);
        assert!(!um.userid);
    }

    #[test]
    fn test_overwrites_previous_values() {
        let mut persisted = PersistedState {
            user_manager: PersistedUserManager {
                token: true,
                userid: true,
                ..Default::default()
            },
        };
        seed_persisted_session(&state(false, false), &mut persisted);

        assert!(!persisted.user_manager.token);
        assert!(!persisted.user_manager.password);
        assert!(persisted.user_manager.keep_login);
    }

    #[test]
    fn test_wire_names() {
        let parsed: SessionState =
            serde_json::from_str(r#"{"UserManager": {"keepLogin": true}}"#).unwrap();
        assert!(parsed.user_manager.keep_login);

        let json = serde_json::to_value(PersistedState::default()).unwrap();
        assert_eq!(json["UserManager"]["rememberPassword"], false);
    }
}
