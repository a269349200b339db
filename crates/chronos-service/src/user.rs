//! Account lifecycle: registration, login, profile and deletion.
//!
//! Field-shape validation (lengths, email format, password strength) lives
//! at the API boundary; this layer enforces the semantic rules and the
//! cascades that keep the document graph consistent.

use std::sync::Arc;

use uuid::Uuid;

use chronos_core::constants::{DEFAULT_CALENDAR_COLOR, DEFAULT_CALENDAR_NAME};
use chronos_db::model::{NewCalendar, NewUser, User, UserSummary};
use chronos_db::store::DataStore;

use crate::auth::{hash_password, verify_password};
use crate::error::{ServiceError, ServiceResult};
use crate::regional::countries;

#[derive(Debug, Clone)]
pub struct Registration {
    pub login: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub region: Option<String>,
}

pub struct UserService {
    store: Arc<dyn DataStore>,
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Registers a new account and provisions its default calendar.
    ///
    /// The default calendar is created in the same call; a user without one
    /// is an inconsistent state every other flow assumes away.
    ///
    /// ## Errors
    /// Duplicate login or email surfaces as a database duplicate error, an
    /// unsupported region as a validation error.
    pub async fn register(&self, registration: Registration) -> ServiceResult<User> {
        let region = match registration.region {
            Some(code) => Some(validated_region(&code)?),
            None => None,
        };

        let password_hash = hash_password(&registration.password)?;
        let mut user = self
            .store
            .insert_user(NewUser {
                login: registration.login,
                username: registration.username,
                email: registration.email,
                password_hash,
                region,
            })
            .await?;

        let token = Uuid::new_v4().simple().to_string();
        user.email_confirmation_token = Some(token.clone());
        let user = self.store.update_user(user).await?;

        let default_calendar = self
            .store
            .insert_calendar(NewCalendar {
                name: DEFAULT_CALENDAR_NAME.to_owned(),
                description: String::new(),
                color: DEFAULT_CALENDAR_COLOR.to_owned(),
                owner: user.id,
                is_default: true,
                include_holidays: true,
            })
            .await?;
        self.store
            .push_owned_calendar(user.id, default_calendar.id)
            .await?;

        // Mail delivery is an external collaborator; the token is logged so
        // a dev setup can complete the flow by hand.
        tracing::info!(
            user = %user.id,
            login = %user.login,
            confirmation_token = %token,
            "Registered user with default calendar"
        );

        self.require_user(user.id).await
    }

    /// Authenticates by login or email plus password.
    ///
    /// ## Errors
    /// Unknown identifier and wrong password both collapse to
    /// `NotAuthenticated`; the response never reveals which one failed.
    pub async fn login(&self, identifier: &str, password: &str) -> ServiceResult<User> {
        let user = self
            .store
            .find_user_by_identifier(identifier)
            .await?
            .ok_or(ServiceError::NotAuthenticated)?;
        verify_password(password, &user.password_hash)?;
        Ok(user)
    }

    /// ## Errors
    /// Not found when the account no longer exists.
    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<User> {
        self.require_user(user_id).await
    }

    /// Applies a partial profile update. Changing the email resets the
    /// confirmation state and issues a fresh token.
    ///
    /// ## Errors
    /// Validation error for an unsupported region, duplicate error when the
    /// new email belongs to another account.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> ServiceResult<User> {
        let mut user = self.require_user(user_id).await?;

        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(password) = update.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(region) = update.region {
            user.region = Some(validated_region(&region)?);
        }
        if let Some(email) = update.email {
            let email = email.to_lowercase();
            if email != user.email {
                user.email = email;
                user.email_confirmed = false;
                user.email_confirmation_token = Some(Uuid::new_v4().simple().to_string());
            }
        }

        Ok(self.store.update_user(user).await?)
    }

    /// Confirms the email address holding the pending token. The token is
    /// single use: confirming clears it, so replaying the link fails.
    ///
    /// ## Errors
    /// Validation error when no account holds the token, which covers both
    /// a bogus token and an already confirmed address.
    pub async fn confirm_email(&self, token: &str) -> ServiceResult<User> {
        let mut user = self
            .store
            .find_user_by_confirmation_token(token)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "Invalid token or this email already confirmed".to_owned(),
                )
            })?;
        user.email_confirmed = true;
        user.email_confirmation_token = None;
        let user = self.store.update_user(user).await?;
        tracing::info!(user = %user.id, "Email confirmed");
        Ok(user)
    }

    /// Rotates the confirmation token for an unconfirmed address, invalidating
    /// any previously issued link.
    ///
    /// ## Errors
    /// Not found for an unknown email, validation error when the address is
    /// already confirmed.
    pub async fn resend_confirmation(&self, email: &str) -> ServiceResult<()> {
        let mut user = self
            .store
            .find_user_by_identifier(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;
        if user.email_confirmed {
            return Err(ServiceError::ValidationError(
                "Email already confirmed".to_owned(),
            ));
        }

        let token = Uuid::new_v4().simple().to_string();
        user.email_confirmation_token = Some(token.clone());
        let user = self.store.update_user(user).await?;

        // Same stand-in for mail delivery as registration.
        tracing::info!(
            user = %user.id,
            confirmation_token = %token,
            "Reissued confirmation token"
        );
        Ok(())
    }

    /// Deletes the account and everything hanging off it: owned calendars
    /// with their events and notifications, sharing references in both
    /// directions, and finally the user document.
    ///
    /// ## Errors
    /// Not found when the account no longer exists.
    pub async fn delete_account(&self, user_id: Uuid) -> ServiceResult<()> {
        let user = self.require_user(user_id).await?;

        let owned = self.store.list_owned_calendars(user.id).await?;
        let owned_ids: Vec<Uuid> = owned.iter().map(|cal| cal.id).collect();
        for calendar in owned {
            self.store.delete_calendar_events(calendar.id).await?;
            self.store.delete_calendar(calendar.id).await?;
        }
        self.store.pull_calendars_from_all_users(&owned_ids).await?;
        self.store.pull_user_from_all_sharing(user.id).await?;
        self.store.delete_user(user.id).await?;

        tracing::info!(user = %user_id, calendars = owned_ids.len(), "Deleted account");
        Ok(())
    }

    /// Substring search over login, username and email for the invite and
    /// share pickers.
    ///
    /// ## Errors
    /// Validation error for an empty query.
    pub async fn search(&self, query: &str) -> ServiceResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::ValidationError(
                "Search query is required".to_owned(),
            ));
        }
        Ok(self.store.search_users(query).await?)
    }

    async fn require_user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))
    }
}

/// Normalizes a region code and checks it against the supported set.
fn validated_region(code: &str) -> ServiceResult<String> {
    let normalized = countries::normalize(code)?;
    if !countries::is_supported(&normalized) {
        return Err(ServiceError::ValidationError(format!(
            "Country \"{normalized}\" is not supported"
        )));
    }
    Ok(normalized)
}
