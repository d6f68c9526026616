#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

/// The authenticated viewer, as supplied by the hosting application.
///
/// `user_id` is kept as a normalized string so ownership checks do not
/// depend on whether the auth layer hands out numeric or string ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub display_name: String,
}

impl CurrentUser {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}
