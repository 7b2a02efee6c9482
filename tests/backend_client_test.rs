mod support;

#[cfg(test)]
mod tests {
    use super::support::{collection_item, spawn, spawn_stub, StubState, TOKEN, USER_ID};
    use idol_stage::api::ApiClient;
    use idol_stage::common::error::StageError;
    use idol_stage::common::types::{LoginRequest, RegisterRequest, UploadFile};
    use idol_stage::config::ApiConfig;
    use idol_stage::session::{FileSessionStore, InMemorySessionStore, SessionStore};
    use axum::{routing::get, Json, Router};
    use idol_stage::common::constants::MAX_COLLECTION_PAGES;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn client(base_url: &str, session: Arc<dyn SessionStore>) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        };
        ApiClient::new(&config, session).unwrap()
    }

    fn credentials(password: &str) -> LoginRequest {
        LoginRequest {
            email: "mina@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_token_and_authorizes_collection_reads() {
        let state = Arc::new(StubState::default());
        let base = spawn_stub(state.clone());
        let dir = tempfile::tempdir().unwrap();

        let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(dir.path()).unwrap());
        let api = client(&base, session);
        let info = api.login(&credentials("secret")).await.unwrap();
        assert_eq!(info.token.as_deref(), Some(TOKEN));
        assert_eq!(api.current_user_id().unwrap(), USER_ID);

        // a fresh process sees the persisted session
        let reopened: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(dir.path()).unwrap());
        assert!(reopened.has_hydrated());
        assert_eq!(reopened.token().as_deref(), Some(TOKEN));

        let api = client(&base, reopened);
        let items = api.full_collection(USER_ID).await;
        assert_eq!(items.iter().map(|i| i.concert_id).collect::<Vec<_>>(), vec![16, 18, 20]);

        let headers = state.auth_headers.lock().unwrap().clone();
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|h| h.as_deref() == Some("Bearer tok-7")));
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_session_empty() {
        let base = spawn_stub(Arc::new(StubState::default()));
        let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let api = client(&base, session.clone());

        let err = api.login(&credentials("wrong")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("bad credentials"));
        assert!(session.user_info().is_none());
    }

    #[tokio::test]
    async fn test_collection_read_failure_is_an_empty_page() {
        let state = Arc::new(StubState::default());
        let base = spawn_stub(state.clone());
        let api = client(&base, Arc::new(InMemorySessionStore::new()));

        let page = api.collection_page(USER_ID, 0).await;
        assert!(page.content.is_empty());
        assert_eq!(page.next_page(), None);
        assert_eq!(state.auth_headers.lock().unwrap().as_slice(), &[None]);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let base = spawn_stub(Arc::new(StubState::default()));
        let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let api = client(&base, session.clone());
        api.login(&credentials("secret")).await.unwrap();

        api.logout().unwrap();
        assert!(session.token().is_none());
        assert!(matches!(api.current_user_id(), Err(StageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invalid_registration_never_reaches_backend() {
        // nothing listens here; validation must fail first
        let api = client("http://127.0.0.1:9", Arc::new(InMemorySessionStore::new()));
        let err = api
            .register(&RegisterRequest {
                user_name: "".into(),
                email: "mina@example.com".into(),
                password: "pw".into(),
                user_img: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_imminent_concerts_are_cached() {
        let state = Arc::new(StubState::default());
        let base = spawn_stub(state.clone());
        let api = client(&base, Arc::new(InMemorySessionStore::new()));

        let first = api.imminent_concerts().await.unwrap();
        let second = api.imminent_concerts().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "Soon");
        assert_eq!(state.imminent_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_song_uses_uploaded_url() {
        let state = Arc::new(StubState::default());
        let base = spawn_stub(state.clone());
        let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let api = client(&base, session);
        api.login(&credentials("secret")).await.unwrap();

        let song = api
            .upload_song(16, "Opening", &UploadFile::new("opening.mp3", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(song.url.as_deref(), Some("http://files/opening.mp3"));

        let songs = state.songs.lock().unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].concert_id, 16);
        assert_eq!(songs[0].artist_id, Some(USER_ID));
        assert_eq!(songs[0].duration, 180);
    }

    #[tokio::test]
    async fn test_registration_check_depends_on_session() {
        let base = spawn_stub(Arc::new(StubState::default()));
        let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let api = client(&base, session);
        assert!(!api.check_concert_registration().await.unwrap());

        api.login(&credentials("secret")).await.unwrap();
        assert!(api.check_concert_registration().await.unwrap());
    }

    /// Backend whose collection pages carry only `content`, `page_len` items each
    fn bare_collection_backend(page_len: usize, hits: Arc<AtomicUsize>) -> String {
        let app = Router::new().route(
            "/collections/user/:user_id",
            get(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let content: Vec<_> = (0..page_len).map(|i| collection_item(i as i64, "/images/ok.png")).collect();
                    Json(serde_json::json!({ "content": content }))
                }
            }),
        );
        spawn(app)
    }

    #[tokio::test]
    async fn test_full_collection_stops_on_page_without_paging_fields() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = bare_collection_backend(1, hits.clone());
        let api = client(&base, Arc::new(InMemorySessionStore::new()));

        let items = tokio::time::timeout(Duration::from_secs(3), api.full_collection(USER_ID))
            .await
            .expect("full_collection kept paging");
        assert_eq!(items.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_collection_gives_up_after_page_cap() {
        // every page is full and nothing says it is the last one
        let hits = Arc::new(AtomicUsize::new(0));
        let base = bare_collection_backend(10, hits.clone());
        let api = client(&base, Arc::new(InMemorySessionStore::new()));

        let items = tokio::time::timeout(Duration::from_secs(20), api.full_collection(USER_ID))
            .await
            .expect("full_collection kept paging");
        assert_eq!(hits.load(Ordering::SeqCst), MAX_COLLECTION_PAGES as usize);
        assert_eq!(items.len(), 10 * MAX_COLLECTION_PAGES as usize);
    }
}
