use rand::distributions::Alphanumeric;
use rand::Rng;
use shrike_core::{Logger, User};
use shrike_storage::DeviceStore;
use std::sync::Arc;

/// Well-known storage slot for the generated device identifier.
pub const USER_ID_STORAGE_KEY: &str = "shrike-user-id";

const ANONYMOUS_ID_LEN: usize = 10;

/// Resolve the user identity at client initialization.
///
/// An explicit id always wins. Otherwise, when generation is enabled, the
/// persisted identifier is reused verbatim; if absent, a fresh one is
/// generated and persisted. Storage failures degrade to an ephemeral,
/// non-persisted identifier for this session.
pub fn resolve_user(
    mut user: User,
    generate_anonymous_id: bool,
    store: &dyn DeviceStore,
    logger: Option<&Arc<dyn Logger>>,
) -> User {
    if user.id.is_some() || !generate_anonymous_id {
        return user;
    }

    match store.get(USER_ID_STORAGE_KEY) {
        Ok(Some(id)) => {
            user.id = Some(id);
        }
        Ok(None) => {
            let id = generate_anonymous_id_value();
            if let Err(e) = store.set(USER_ID_STORAGE_KEY, &id) {
                warn(logger, &format!("Failed to persist anonymous id: {e}"));
            }
            user.id = Some(id);
        }
        Err(e) => {
            warn(
                logger,
                &format!("Failed to read anonymous id, using an ephemeral one: {e}"),
            );
            user.id = Some(generate_anonymous_id_value());
        }
    }

    user
}

fn generate_anonymous_id_value() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ANONYMOUS_ID_LEN)
        .map(char::from)
        .collect()
}

fn warn(logger: Option<&Arc<dyn Logger>>, message: &str) {
    if let Some(logger) = logger {
        logger.warn(message);
    }
}
