//! One-time setup for freshly created accounts.
//!
//! The user row, its generated handle and its profile are written by a single
//! store call, so a failure leaves no half-provisioned account behind. Only
//! registration calls this; later updates to a user never re-run it.

use rand::Rng;

use crate::db::{DbError, Store, USERS_USERNAME_KEY};
use crate::models::{NewUser, Profile, User};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Fresh handles tried before a username collision is reported.
const HANDLE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct ProvisionedUser {
    pub user: User,
    pub profile: Profile,
}

/// Create the user together with a generated handle and its profile.
pub async fn provision_new_user(
    store: &dyn Store,
    new_user: &NewUser,
) -> Result<ProvisionedUser, DbError> {
    provision_with(store, new_user, generate_handle).await
}

async fn provision_with<F>(
    store: &dyn Store,
    new_user: &NewUser,
    mut next_handle: F,
) -> Result<ProvisionedUser, DbError>
where
    F: FnMut() -> String,
{
    let mut attempt = 1;
    loop {
        let handle = next_handle();
        match store.create_account(new_user, &handle).await {
            Ok((user, profile)) => {
                tracing::debug!(user_id = %user.id, handle = %handle, "Provisioned account");
                return Ok(ProvisionedUser { user, profile });
            }
            Err(DbError::UniqueViolation(constraint))
                if constraint == USERS_USERNAME_KEY && attempt < HANDLE_ATTEMPTS =>
            {
                tracing::warn!(handle = %handle, attempt, "Generated handle already taken");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// `#`, six uppercase hex digits, one ASCII letter, then a number in `100..=99999`.
/// Uniqueness is left to the store.
pub fn generate_handle() -> String {
    generate_handle_with(&mut rand::rng())
}

pub fn generate_handle_with<R: Rng>(rng: &mut R) -> String {
    let hex_part: [u8; 3] = rng.random();
    let letter = LETTERS[rng.random_range(0..LETTERS.len())] as char;
    let number: u32 = rng.random_range(100..=99_999);
    format!("#{}{letter}{number}", hex::encode_upper(hex_part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, ProfileRepository, UserRepository, USERS_EMAIL_KEY};
    use regex::Regex;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn handles(list: &'static [&'static str]) -> impl FnMut() -> String {
        let mut iter = list.iter().cycle();
        move || iter.next().map(|h| h.to_string()).unwrap_or_default()
    }

    #[test]
    fn handle_has_expected_shape() {
        let re = Regex::new(r"^#[0-9A-F]{6}[A-Za-z][1-9][0-9]{2,4}$").unwrap();
        for _ in 0..500 {
            let handle = generate_handle();
            assert!(re.is_match(&handle), "bad handle {handle}");
        }
    }

    #[tokio::test]
    async fn provisioning_sets_handle_and_one_profile() {
        let store = MemoryStore::new();

        let provisioned = provision_new_user(&store, &new_user("ada@test.com")).await.unwrap();
        assert!(provisioned.user.username.as_deref().is_some_and(|h| !h.is_empty()));
        assert_eq!(provisioned.profile.user_id, provisioned.user.id);
        assert_eq!(store.count_profiles_for_user(provisioned.user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn later_saves_do_not_add_profiles() {
        let store = MemoryStore::new();
        let provisioned = provision_new_user(&store, &new_user("ada@test.com")).await.unwrap();
        let id = provisioned.user.id;

        store.update_password(id, "new-hash").await.unwrap();
        store.update_password(id, "newer-hash").await.unwrap();

        assert_eq!(store.count_profiles_for_user(id).await.unwrap(), 1);
        let handle = store.find_user_by_id(id).await.unwrap().unwrap().username;
        assert_eq!(handle, provisioned.user.username);
    }

    #[tokio::test]
    async fn taken_handle_is_regenerated() {
        let store = MemoryStore::new();
        provision_with(&store, &new_user("ada@test.com"), handles(&["#AAAAAAa100"]))
            .await
            .unwrap();

        let provisioned = provision_with(
            &store,
            &new_user("grace@test.com"),
            handles(&["#AAAAAAa100", "#BBBBBBb200"]),
        )
        .await
        .unwrap();
        assert_eq!(provisioned.user.username.as_deref(), Some("#BBBBBBb200"));
    }

    #[tokio::test]
    async fn handle_collisions_leave_no_account_behind() {
        let store = MemoryStore::new();
        provision_with(&store, &new_user("ada@test.com"), handles(&["#AAAAAAa100"]))
            .await
            .unwrap();

        let err = provision_with(&store, &new_user("grace@test.com"), handles(&["#AAAAAAa100"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(ref c) if c == USERS_USERNAME_KEY));
        assert!(store.find_user_by_email("grace@test.com").await.unwrap().is_none());

        // The email is still free, so a later attempt goes through
        let provisioned = provision_new_user(&store, &new_user("grace@test.com")).await.unwrap();
        assert!(provisioned.user.username.is_some());
        assert_eq!(store.count_profiles_for_user(provisioned.user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn existing_email_is_not_provisioned_again() {
        let store = MemoryStore::new();
        let provisioned = provision_new_user(&store, &new_user("ada@test.com")).await.unwrap();

        let err = provision_new_user(&store, &new_user("ada@test.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(ref c) if c == USERS_EMAIL_KEY));
        let user = store.find_user_by_id(provisioned.user.id).await.unwrap().unwrap();
        assert_eq!(user.username, provisioned.user.username);
        assert_eq!(store.count_profiles_for_user(user.id).await.unwrap(), 1);
    }
}
