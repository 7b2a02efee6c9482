use super::concerts::concert_key;
use super::ApiClient;
use crate::common::constants::DEFAULT_SONG_DURATION_SECS;
use crate::common::error::Result;
use crate::common::types::{Song, SongCreate, UploadFile};
use reqwest::Method;
use tracing::info;

impl ApiClient {
    pub async fn songs_by_concert(&self, concert_id: i64) -> Result<Vec<Song>> {
        self.send_json(self.request(Method::GET, &format!("/songs/concert/{}", concert_id)))
            .await
    }

    pub async fn create_song(&self, song: &SongCreate) -> Result<Song> {
        song.validate()?;
        let created: Song = self
            .send_json(self.request(Method::POST, "/songs").json(song))
            .await?;
        self.concert_cache.invalidate(&concert_key(song.concert_id));
        info!("Added song {} to concert {}", created.id, song.concert_id);
        Ok(created)
    }

    /// Upload the audio file, then register it as a song of the concert by the current user
    pub async fn upload_song(&self, concert_id: i64, title: &str, file: &UploadFile) -> Result<Song> {
        let url = self.upload_file(file).await?;
        let song = SongCreate {
            title: title.to_string(),
            url,
            artist_id: self.session.user_id(),
            concert_id,
            duration: DEFAULT_SONG_DURATION_SECS,
        };
        self.create_song(&song).await
    }

    /// Removes the song and its stored file
    pub async fn delete_song(&self, song_id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/songs/{}", song_id)))
            .await?;
        info!("Deleted song {}", song_id);
        Ok(())
    }
}
