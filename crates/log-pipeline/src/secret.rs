//! 로그 시크릿 → 서버 식별 정보 테이블
//!
//! 리스너에서 유일하게 여러 태스크가 공유하는 가변 상태입니다.
//! 조회는 공유 잠금, 서버 추가/제거는 배타 잠금을 사용합니다.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use srcstat_core::config::ServerEntry;

use crate::event::ServerIdentity;

/// 런타임에 변경 가능한 시크릿 테이블
///
/// `Clone`은 같은 테이블을 가리키는 핸들을 만듭니다.
#[derive(Debug, Clone, Default)]
pub struct SecretTable {
    inner: Arc<RwLock<HashMap<i64, Arc<ServerIdentity>>>>,
}

impl SecretTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정의 `[[servers]]` 목록으로 테이블을 만듭니다.
    pub fn from_entries(entries: &[ServerEntry]) -> Self {
        Self {
            inner: Arc::new(RwLock::new(build_map(entries))),
        }
    }

    /// 서버를 등록합니다. 같은 시크릿이 있으면 교체하고 이전 값을 반환합니다.
    pub async fn insert(
        &self,
        secret: i64,
        identity: ServerIdentity,
    ) -> Option<Arc<ServerIdentity>> {
        let previous = self.inner.write().await.insert(secret, Arc::new(identity));
        tracing::info!(secret, replaced = previous.is_some(), "log secret registered");
        previous
    }

    pub async fn remove(&self, secret: i64) -> Option<Arc<ServerIdentity>> {
        let removed = self.inner.write().await.remove(&secret);
        if removed.is_some() {
            tracing::info!(secret, "log secret removed");
        }
        removed
    }

    /// 테이블 전체를 한 번에 교체합니다.
    pub async fn replace_all(&self, entries: &[ServerEntry]) {
        let map = build_map(entries);
        let count = map.len();
        *self.inner.write().await = map;
        tracing::info!(servers = count, "log secret table replaced");
    }

    /// 시크릿을 서버 식별 정보로 해석합니다.
    pub async fn resolve(&self, secret: i64) -> Option<Arc<ServerIdentity>> {
        self.inner.read().await.get(&secret).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

fn build_map(entries: &[ServerEntry]) -> HashMap<i64, Arc<ServerIdentity>> {
    entries
        .iter()
        .map(|e| {
            let identity = ServerIdentity {
                server_id: e.server_id,
                server_name: e.name.clone(),
            };
            (e.secret, Arc::new(identity))
        })
        .collect()
}
