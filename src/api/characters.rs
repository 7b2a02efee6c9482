use super::files::file_part;
use super::ApiClient;
use crate::common::error::{Result, StageError};
use crate::common::types::{Character, CharacterCreate, CharacterUpdate};
use reqwest::multipart::Form;
use reqwest::Method;
use tracing::info;

impl ApiClient {
    pub async fn characters_by_user(&self, user_id: i64) -> Result<Vec<Character>> {
        self.send_json(self.request(Method::GET, &format!("/characters/user/{}", user_id)))
            .await
    }

    /// Returns the new character's id
    pub async fn create_character(&self, input: &CharacterCreate) -> Result<i64> {
        input.validate()?;
        let form = Form::new()
            .text("name", input.name.clone())
            .text("description", input.description.clone())
            .part("image", file_part(&input.image))
            .part("model", file_part(&input.model));
        let id: i64 = self
            .send_json(self.request(Method::POST, "/characters").multipart(form))
            .await?;
        info!("Created character {} ({})", id, input.name);
        Ok(id)
    }

    /// Sends only the fields that are set
    pub async fn update_character(&self, id: i64, input: &CharacterUpdate) -> Result<()> {
        if input.is_empty() {
            return Err(StageError::validation("nothing to update"));
        }
        let mut form = Form::new();
        if let Some(name) = &input.name {
            form = form.text("name", name.clone());
        }
        if let Some(description) = &input.description {
            form = form.text("description", description.clone());
        }
        if let Some(image) = &input.image {
            form = form.part("image", file_part(image));
        }
        if let Some(model) = &input.model {
            form = form.part("model", file_part(model));
        }
        if let Some(active) = input.active {
            form = form.text("isActive", active.to_string());
        }
        self.send_empty(self.request(Method::PUT, &format!("/characters/{}", id)).multipart(form))
            .await?;
        info!("Updated character {}", id);
        Ok(())
    }

    pub async fn delete_character(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/characters/{}", id)))
            .await?;
        info!("Deleted character {}", id);
        Ok(())
    }

    pub async fn has_character(&self, user_id: i64) -> Result<bool> {
        self.send_json(self.request(Method::GET, &format!("/characters/check/{}", user_id)))
            .await
    }
}
