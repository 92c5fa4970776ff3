use rand::Rng;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

const CODE_TTL: Duration = Duration::minutes(10);

/// Uniform-random 6-digit verification code.
pub fn generate_code() -> u32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

struct PendingCode {
    code: u32,
    expires_at: OffsetDateTime,
}

/// In-process store of pending verification codes, keyed by email.
///
/// Entries are overwritten on re-send, consumed on successful verification,
/// and lazily expired. State lives only as long as the process.
#[derive(Default)]
pub struct CodeStore {
    entries: Mutex<HashMap<String, PendingCode>>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `code` for `email`, replacing any pending entry.
    pub async fn put(&self, email: &str, code: u32) {
        self.put_with_ttl(email, code, CODE_TTL).await;
    }

    async fn put_with_ttl(&self, email: &str, code: u32, ttl: Duration) {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            email.to_string(),
            PendingCode {
                code,
                expires_at: now + ttl,
            },
        );
    }

    /// Check `code` against the pending entry for `email`. A match removes
    /// the entry; a mismatch leaves it in place. Expired entries never match
    /// and are removed when seen.
    pub async fn consume(&self, email: &str, code: u32) -> bool {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.lock().await;
        match entries.get(email) {
            Some(entry) if entry.expires_at <= now => {
                entries.remove(email);
                false
            }
            Some(entry) if entry.code == code => {
                entries.remove(email);
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub async fn get(&self, email: &str) -> Option<u32> {
        self.entries.lock().await.get(email).map(|e| e.code)
    }
}
