use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use edu_marketplace::{
    AppState, CurationService,
    auth::{AuthUser, Claims},
    config::{AppConfig, Env},
    curation::{CurationProvider, CurationStatus, MockGateway},
    models::{Resource, ResourcePage, ResourceQuery, ResourceRequest, User},
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

// Only get_user matters to the extractor.
#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn ping(&self) -> bool {
        true
    }
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user_to_return.clone()
    }
    async fn list_resources(&self, _query: ResourceQuery) -> ResourcePage {
        ResourcePage::default()
    }
    async fn get_resource(&self, _id: Uuid) -> Option<Resource> {
        None
    }
    async fn get_public_resource(&self, _id: Uuid) -> Option<Resource> {
        None
    }
    async fn get_my_resources(&self, _creator_id: Uuid) -> Vec<Resource> {
        vec![]
    }
    async fn create_resource(
        &self,
        _req: ResourceRequest,
        _creator_id: Uuid,
        _status: CurationStatus,
    ) -> Option<Resource> {
        None
    }
    async fn update_resource(
        &self,
        _id: Uuid,
        _creator_id: Uuid,
        _req: ResourceRequest,
        _status: CurationStatus,
    ) -> Option<Resource> {
        None
    }
    async fn delete_resource(&self, _id: Uuid, _creator_id: Uuid) -> bool {
        false
    }
    async fn set_resource_status(&self, _id: Uuid, _status: CurationStatus) -> Option<Resource> {
        None
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token(user_id: Uuid, iat: u64, exp: u64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        iat: iat as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn valid_token(user_id: Uuid) -> String {
    let now = now_secs();
    create_token(user_id, now, now + 3600, TEST_JWT_SECRET)
}

fn test_user(role: &str) -> User {
    User {
        id: TEST_USER_ID,
        name: "Test Educator".to_string(),
        email: "test@example.com".to_string(),
        role: role.to_string(),
    }
}

fn create_app_state(env: Env, repo: MockAuthRepo) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: Arc::new(repo),
        curator: Arc::new(CurationService::with_gateway(
            CurationProvider::Xai,
            Arc::new(MockGateway::default()),
        )),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("Educator")),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = with_bearer(&valid_token(TEST_USER_ID));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, "Educator");
    assert!(!user.is_admin());
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Well past the default 60s leeway.
    let now = now_secs();
    let token = create_token(TEST_USER_ID, now - 7200, now - 3600, TEST_JWT_SECRET);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("Educator")),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = with_bearer(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let now = now_secs();
    let token = create_token(TEST_USER_ID, now, now + 3600, "some-other-secret");

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("Educator")),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = with_bearer(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_when_profile_is_gone() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = with_bearer(&valid_token(TEST_USER_ID));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_unknown_role() {
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("Moderator")),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = with_bearer(&valid_token(TEST_USER_ID));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_user_id = Uuid::new_v4();
    let mock_repo = MockAuthRepo {
        user_to_return: Some(User {
            id: mock_user_id,
            ..test_user("admin")
        }),
    };
    let app_state = create_app_state(Env::Local, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.unwrap();
    assert_eq!(user.id, mock_user_id);
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_user_id = Uuid::new_v4();
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("Educator")),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}
