//! Shared-secret check for task submissions.
//!
//! There are no accounts or tokens: every payload carries the secret and it must equal
//! `STUDENT_SECRET`.

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.len() != b_bytes.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a_bytes.iter().zip(b_bytes) {
        diff |= x ^ y;
    }
    diff == 0
}

/// True iff the submitted secret matches the configured one.
pub fn verify_secret(submitted: &str, expected: &str) -> bool {
    constant_time_eq(submitted, expected)
}
