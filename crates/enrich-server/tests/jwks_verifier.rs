// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer verification against a served key set.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use enrich_common_http::UpstreamClient;
use enrich_server::{AuthError, JwksVerifier, TokenVerifier};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY_PEM: &[u8] = include_bytes!("fixtures/test_rsa.pem");
const TEST_JWKS: &str = include_str!("fixtures/jwks.json");
const KID: &str = "test-key-1";
const AUDIENCE: &str = "https://api.example.com";
const ISSUER: &str = "https://tenant.example.com/";

#[derive(Serialize)]
struct TestClaims<'a> {
	sub: &'a str,
	iss: &'a str,
	aud: &'a str,
	exp: u64,
	iat: u64,
}

fn now() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

fn sign(kid: &str, aud: &str, iss: &str, exp: u64) -> String {
	let mut header = Header::new(Algorithm::RS256);
	header.kid = Some(kid.to_string());
	let claims = TestClaims {
		sub: "auth0|caller",
		iss,
		aud,
		exp,
		iat: now(),
	};
	let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM).unwrap();
	encode(&header, &claims, &key).unwrap()
}

fn valid_token() -> String {
	sign(KID, AUDIENCE, ISSUER, now() + 3600)
}

async fn jwks_server(expected_fetches: u64) -> MockServer {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/.well-known/jwks.json"))
		.respond_with(ResponseTemplate::new(200).set_body_raw(TEST_JWKS, "application/json"))
		.expect(expected_fetches)
		.mount(&server)
		.await;
	server
}

fn verifier(server: &MockServer, min_refresh: Duration) -> JwksVerifier {
	JwksVerifier::new(
		UpstreamClient::new(None).unwrap(),
		format!("{}/.well-known/jwks.json", server.uri()),
		AUDIENCE,
		ISSUER,
		min_refresh,
	)
}

#[tokio::test]
async fn valid_token_verifies_and_keys_are_cached() {
	let server = jwks_server(1).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let claims = verifier.verify(&valid_token()).await.unwrap();
	assert_eq!(claims.sub, "auth0|caller");
	assert_eq!(claims.iss, ISSUER);
	assert_eq!(verifier.cached_keys().await, 1);

	// Second verification is served from the cache.
	verifier.verify(&valid_token()).await.unwrap();
}

#[tokio::test]
async fn wrong_audience_rejected() {
	let server = jwks_server(1).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let token = sign(KID, "https://other-api.example.com", ISSUER, now() + 3600);
	let err = verifier.verify(&token).await.unwrap_err();
	assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[tokio::test]
async fn wrong_issuer_rejected() {
	let server = jwks_server(1).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let token = sign(KID, AUDIENCE, "https://evil.example.com/", now() + 3600);
	let err = verifier.verify(&token).await.unwrap_err();
	assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[tokio::test]
async fn expired_token_rejected() {
	let server = jwks_server(1).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let token = sign(KID, AUDIENCE, ISSUER, now() - 3600);
	let err = verifier.verify(&token).await.unwrap_err();
	assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[tokio::test]
async fn symmetric_token_rejected() {
	let server = jwks_server(1).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let mut header = Header::new(Algorithm::HS256);
	header.kid = Some(KID.to_string());
	let claims = TestClaims {
		sub: "auth0|caller",
		iss: ISSUER,
		aud: AUDIENCE,
		exp: now() + 3600,
		iat: now(),
	};
	let token = encode(&header, &claims, &EncodingKey::from_secret(b"shared")).unwrap();

	let err = verifier.verify(&token).await.unwrap_err();
	assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[tokio::test]
async fn token_without_kid_rejected() {
	let server = jwks_server(0).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let header = Header::new(Algorithm::RS256);
	let claims = TestClaims {
		sub: "auth0|caller",
		iss: ISSUER,
		aud: AUDIENCE,
		exp: now() + 3600,
		iat: now(),
	};
	let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM).unwrap();
	let token = encode(&header, &claims, &key).unwrap();

	let err = verifier.verify(&token).await.unwrap_err();
	assert!(matches!(err, AuthError::MissingKeyId));
}

#[tokio::test]
async fn garbage_token_rejected_without_fetch() {
	let server = jwks_server(0).await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let err = verifier.verify("not-a-jwt").await.unwrap_err();
	assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[tokio::test]
async fn unknown_kid_refetch_is_rate_limited() {
	let server = jwks_server(1).await;
	let verifier = verifier(&server, Duration::from_secs(60));

	verifier.verify(&valid_token()).await.unwrap();

	let rotated = sign("rotated-key", AUDIENCE, ISSUER, now() + 3600);
	let err = verifier.verify(&rotated).await.unwrap_err();
	assert!(matches!(err, AuthError::UnknownKey(kid) if kid == "rotated-key"));
}

#[tokio::test]
async fn unknown_kid_refetches_once_interval_passed() {
	let server = jwks_server(2).await;
	let verifier = verifier(&server, Duration::ZERO);

	verifier.verify(&valid_token()).await.unwrap();

	let rotated = sign("rotated-key", AUDIENCE, ISSUER, now() + 3600);
	let err = verifier.verify(&rotated).await.unwrap_err();
	assert!(matches!(err, AuthError::UnknownKey(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cached_kid_verifies_while_refetch_in_flight() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/.well-known/jwks.json"))
		.respond_with(ResponseTemplate::new(200).set_body_raw(TEST_JWKS, "application/json"))
		.up_to_n_times(1)
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/.well-known/jwks.json"))
		.respond_with(
			ResponseTemplate::new(200)
				.set_body_raw(TEST_JWKS, "application/json")
				.set_delay(Duration::from_secs(2)),
		)
		.expect(1)
		.mount(&server)
		.await;
	let verifier = Arc::new(verifier(&server, Duration::ZERO));

	verifier.verify(&valid_token()).await.unwrap();

	let rotated = sign("rotated-key", AUDIENCE, ISSUER, now() + 3600);
	let slow = tokio::spawn({
		let verifier = verifier.clone();
		async move { verifier.verify(&rotated).await }
	});
	tokio::time::sleep(Duration::from_millis(200)).await;

	let started = Instant::now();
	let claims = verifier.verify(&valid_token()).await.unwrap();
	assert_eq!(claims.sub, "auth0|caller");
	assert!(
		started.elapsed() < Duration::from_millis(1000),
		"cached kid waited {:?} on the refetch",
		started.elapsed()
	);

	let err = slow.await.unwrap().unwrap_err();
	assert!(matches!(err, AuthError::UnknownKey(kid) if kid == "rotated-key"));
}

#[tokio::test]
async fn key_endpoint_failure_is_key_fetch_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/.well-known/jwks.json"))
		.respond_with(ResponseTemplate::new(500))
		.expect(1)
		.mount(&server)
		.await;
	let verifier = verifier(&server, Duration::from_secs(12));

	let err = verifier.verify(&valid_token()).await.unwrap_err();
	assert!(matches!(err, AuthError::KeyFetch(_)));
}
