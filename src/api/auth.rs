use super::ApiClient;
use crate::common::error::Result;
use crate::common::types::{LoginRequest, RegisterRequest, UserInfo};
use reqwest::Method;
use tracing::info;

impl ApiClient {
    /// Log in and keep the returned user info (token included) in the session
    pub async fn login(&self, request: &LoginRequest) -> Result<UserInfo> {
        request.validate()?;
        let info: UserInfo = self
            .send_json(self.request(Method::POST, "/auth/login").json(request))
            .await?;
        self.session.set_user_info(info.clone())?;
        info!("Logged in as {}", info.email.as_deref().unwrap_or(&request.email));
        Ok(info)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        request.validate()?;
        self.send_empty(self.request(Method::POST, "/auth/register").json(request))
            .await?;
        info!("Registered {}", request.email);
        Ok(())
    }

    /// Client-side only: the backend keeps no session to end
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }
}
