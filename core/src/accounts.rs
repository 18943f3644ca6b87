//! Account and user-administration endpoints.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{
    ApiMessage, Credentials, DeleteUser, LoginSession, NewUser, PasswordChange, ProfileUpdate,
    UserProfile,
};

/// `/accounts/` endpoint map. URL templating and payload encoding only —
/// no caching, no retries, no business logic.
pub struct AccountsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Anonymous POST: the one endpoint that must work without a token.
    /// The caller decides whether to persist `LoginSession::token` in the
    /// client's token store.
    pub fn login(&self, credentials: &Credentials) -> Result<LoginSession, ApiError> {
        self.client
            .post("/accounts/login/", credentials, false)?
            .json()
    }

    pub fn register(&self, user: &NewUser) -> Result<ApiMessage, ApiError> {
        self.client.post("/accounts/register/", user, true)?.json()
    }

    pub fn profile(&self) -> Result<UserProfile, ApiError> {
        self.client.get("/accounts/profile/")?.json()
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.client
            .put("/accounts/update-profile/", update)?
            .json()
    }

    pub fn change_password(&self, change: &PasswordChange) -> Result<ApiMessage, ApiError> {
        self.client
            .post("/accounts/change-password/", change, true)?
            .json()
    }

    /// DELETE with a body: the backend identifies the target by email.
    pub fn delete_user(&self, email: &str) -> Result<ApiMessage, ApiError> {
        let body = DeleteUser {
            email: email.to_string(),
        };
        self.client
            .delete("/accounts/delete-user/", Some(&body))?
            .json()
    }

    pub fn users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.client.get("/accounts/user/")?.json()
    }
}
