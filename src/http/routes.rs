use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v0/posts/generate", post(handlers::generate_post))
        .route("/api/v0/posts", get(handlers::list_posts))
        .route("/api/v0/posts/{id}", get(handlers::get_post))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedArticle, MockContentGenerator};
    use crate::http::auth::USER_ID_HEADER;
    use crate::pipeline::BlogPipeline;
    use crate::resolver::{AudioAsset, MockVideoResolver, VideoMetadata};
    use crate::store::{BlogPost, MockPostStore, NewBlogPost};
    use crate::transcribe::{MockTranscriber, Transcript};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Utc;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn state(pipeline: BlogPipeline, posts: MockPostStore) -> AppState {
        AppState {
            pipeline: Arc::new(pipeline),
            posts: Arc::new(posts),
        }
    }

    /// Pipeline whose components reject every call. Used to prove that
    /// requests failing validation never reach a pipeline stage.
    fn inert_pipeline() -> BlogPipeline {
        let mut resolver = MockVideoResolver::new();
        resolver.expect_resolve_title().never();
        resolver.expect_fetch_audio().never();

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();

        let mut generator = MockContentGenerator::new();
        generator.expect_generate().never();

        let mut posts = MockPostStore::new();
        posts.expect_insert().never();

        BlogPipeline::new(
            Arc::new(resolver),
            Arc::new(transcriber),
            Arc::new(generator),
            Arc::new(posts),
        )
    }

    fn untouched_store() -> MockPostStore {
        let mut posts = MockPostStore::new();
        posts.expect_insert().never();
        posts.expect_list_by_owner().never();
        posts.expect_get_by_id().never();
        posts
    }

    fn state_with_inert_pipeline() -> AppState {
        state(inert_pipeline(), untouched_store())
    }

    fn stored_post(post: NewBlogPost) -> BlogPost {
        BlogPost {
            id: Uuid::new_v4(),
            owner_id: post.owner_id,
            source_title: post.source_title,
            source_link: post.source_link,
            content: post.content,
            created_at: Utc::now(),
        }
    }

    fn owned_post(id: Uuid, owner_id: Uuid) -> BlogPost {
        BlogPost {
            id,
            owner_id,
            source_title: "A Talk".to_string(),
            source_link: "https://valid.example/watch?v=abc".to_string(),
            content: "Blog: hello world".to_string(),
            created_at: Utc::now(),
        }
    }

    fn get_post_request(user: Uuid, id: Uuid) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/v0/posts/{id}"))
            .header(USER_ID_HEADER, user.to_string())
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn generate_request(user: Option<Uuid>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v0/posts/generate")
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }

        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_payload_is_400_with_no_downstream_calls() {
        let app = build_router(state_with_inert_pipeline());

        let response = app
            .oneshot(generate_request(Some(Uuid::new_v4()), "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_link_is_400_with_no_downstream_calls() {
        let app = build_router(state_with_inert_pipeline());

        let response = app
            .oneshot(generate_request(
                Some(Uuid::new_v4()),
                r#"{"link": "not-a-url"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_user_identity_is_401() {
        let app = build_router(state_with_inert_pipeline());

        let response = app
            .oneshot(generate_request(
                None,
                r#"{"link": "https://valid.example/watch?v=abc"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = build_router(state_with_inert_pipeline());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_returns_content_when_every_stage_succeeds() {
        let mut resolver = MockVideoResolver::new();
        resolver.expect_resolve_title().times(1).returning(|_| {
            Ok(VideoMetadata {
                id: "abc".to_string(),
                title: "Talk".to_string(),
            })
        });
        resolver.expect_fetch_audio().times(1).returning(|_| {
            Ok(AudioAsset {
                path: PathBuf::from("/tmp/blogscribe-test-missing.mp3"),
            })
        });

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().times(1).returning(|_| {
            Ok(Transcript {
                text: "hello world".to_string(),
            })
        });

        let mut generator = MockContentGenerator::new();
        generator.expect_generate().times(1).returning(|_| {
            Ok(GeneratedArticle {
                content: "Blog: hello world".to_string(),
            })
        });

        let mut pipeline_posts = MockPostStore::new();
        pipeline_posts
            .expect_insert()
            .times(1)
            .returning(|post| Ok(stored_post(post)));

        let pipeline = BlogPipeline::new(
            Arc::new(resolver),
            Arc::new(transcriber),
            Arc::new(generator),
            Arc::new(pipeline_posts),
        );
        let app = build_router(state(pipeline, untouched_store()));

        let response = app
            .oneshot(generate_request(
                Some(Uuid::new_v4()),
                r#"{"link": "https://valid.example/watch?v=abc"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["content"], "Blog: hello world");
    }

    #[tokio::test]
    async fn test_get_post_owned_by_another_user_is_404() {
        let caller = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        let mut posts = MockPostStore::new();
        posts
            .expect_get_by_id()
            .withf(move |id| *id == post_id)
            .times(1)
            .returning(|id| Ok(Some(owned_post(id, Uuid::new_v4()))));

        let app = build_router(state(inert_pipeline(), posts));
        let response = app
            .oneshot(get_post_request(caller, post_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_post_owned_by_caller_is_200() {
        let caller = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        let mut posts = MockPostStore::new();
        posts
            .expect_get_by_id()
            .times(1)
            .returning(move |id| Ok(Some(owned_post(id, caller))));

        let app = build_router(state(inert_pipeline(), posts));
        let response = app
            .oneshot(get_post_request(caller, post_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], post_id.to_string());
        assert_eq!(body["owner_id"], caller.to_string());
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let mut posts = MockPostStore::new();
        posts.expect_get_by_id().times(1).returning(|_| Ok(None));

        let app = build_router(state(inert_pipeline(), posts));
        let response = app
            .oneshot(get_post_request(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_posts_queries_the_callers_rows() {
        let caller = Uuid::new_v4();

        let mut posts = MockPostStore::new();
        posts
            .expect_list_by_owner()
            .withf(move |owner| *owner == caller)
            .times(1)
            .returning(|owner| Ok(vec![owned_post(Uuid::new_v4(), owner)]));

        let app = build_router(state(inert_pipeline(), posts));
        let request = Request::builder()
            .uri("/api/v0/posts")
            .header(USER_ID_HEADER, caller.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body.as_array().map(|rows| rows.len()), Some(1));
        assert_eq!(body[0]["owner_id"], caller.to_string());
    }
}
