//! Credential verification.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Credentials submitted through the login form. Lives for one request.
pub struct Credential {
    pub username: Option<String>,
    pub password: SecretString,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &Credential) -> bool;
}

/// Compare a supplied secret against the expected one in constant time.
///
/// Both sides are reduced to SHA-256 digests first, so neither the position
/// of the first differing byte nor a length mismatch changes the amount of
/// work done in the comparison.
#[must_use]
pub fn verify(supplied: &[u8], expected: &[u8]) -> bool {
    let supplied = Sha256::digest(supplied);
    let expected = Sha256::digest(expected);
    bool::from(supplied.as_slice().ct_eq(expected.as_slice()))
}

/// Accepts a single configured password, whatever the username.
pub struct StaticPasswordVerifier {
    digest: [u8; 32],
}

impl StaticPasswordVerifier {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(secret.expose_secret().as_bytes()));
        Self { digest }
    }
}

impl fmt::Debug for StaticPasswordVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticPasswordVerifier")
            .field("digest", &"***")
            .finish()
    }
}

impl CredentialVerifier for StaticPasswordVerifier {
    fn verify(&self, credential: &Credential) -> bool {
        let supplied = Sha256::digest(credential.password.expose_secret().as_bytes());
        bool::from(supplied.as_slice().ct_eq(self.digest.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hint::black_box;
    use std::time::{Duration, Instant};

    fn credential(password: &str) -> Credential {
        Credential {
            username: Some("alice".to_string()),
            password: SecretString::from(password.to_string()),
        }
    }

    fn median_duration(mut run: impl FnMut()) -> Duration {
        let mut samples: Vec<Duration> = (0..101)
            .map(|_| {
                let started = Instant::now();
                for _ in 0..200 {
                    run();
                }
                started.elapsed()
            })
            .collect();
        samples.sort();
        samples[samples.len() / 2]
    }

    #[test]
    fn verify_accepts_equal_secrets() {
        assert!(verify(b"password123", b"password123"));
    }

    #[test]
    fn verify_rejects_any_difference() {
        assert!(!verify(b"password124", b"password123"));
        assert!(!verify(b"Password123", b"password123"));
        assert!(!verify(b"", b"password123"));
    }

    #[test]
    fn verify_rejects_length_mismatch() {
        assert!(!verify(b"password", b"password123"));
        assert!(!verify(b"password1234", b"password123"));
    }

    #[test]
    fn static_verifier_ignores_username() {
        let verifier = StaticPasswordVerifier::new(&SecretString::from("password123".to_string()));
        assert!(verifier.verify(&credential("password123")));
        assert!(verifier.verify(&Credential {
            username: None,
            password: SecretString::from("password123".to_string()),
        }));
        assert!(!verifier.verify(&credential("password12")));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let verifier = StaticPasswordVerifier::new(&SecretString::from("password123".to_string()));
        assert!(!format!("{verifier:?}").contains("password123"));
        assert!(!format!("{:?}", credential("hunter2")).contains("hunter2"));
    }

    fn assert_similar(times: &[Duration]) {
        let fastest = times.iter().min().copied().unwrap_or_default();
        let slowest = times.iter().max().copied().unwrap_or_default();
        // Generous bound: only a gross, input-dependent difference should trip it.
        assert!(
            slowest <= fastest * 5 + Duration::from_micros(50),
            "timings diverge: {times:?}"
        );
    }

    #[test]
    fn static_verifier_timing_does_not_track_correctness() {
        let verifier = StaticPasswordVerifier::new(&SecretString::from("password123".to_string()));
        let candidates = [
            credential("password123"),
            credential("Xassword123"),
            credential("password12X"),
            credential("p"),
            credential("password123XXXXXXXX"),
        ];

        let times: Vec<Duration> = candidates
            .iter()
            .map(|candidate| {
                median_duration(|| {
                    black_box(verifier.verify(black_box(candidate)));
                })
            })
            .collect();

        assert_similar(&times);
    }

    #[test]
    fn verify_timing_does_not_track_length_mismatch() {
        let expected = b"password123";
        let candidates: [&[u8]; 5] = [
            b"password123",
            b"",
            b"p",
            b"password12",
            b"password123XXXXXXXX",
        ];

        let times: Vec<Duration> = candidates
            .iter()
            .map(|candidate| {
                median_duration(|| {
                    black_box(verify(black_box(candidate), black_box(expected)));
                })
            })
            .collect();

        assert_similar(&times);
    }
}
