// ── View lifetimes ──
//
// A mounted screen owns a `ViewScope`. Fetches started through it are
// dropped on the floor once the screen unmounts, so a late response can
// never repaint a screen that is gone.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub(crate) fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// A scope that only ends when cancelled or dropped.
    pub fn detached() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Drive `fut` to completion unless the scope ends first.
    ///
    /// Returns `None` if the scope was cancelled before or while the
    /// future ran; its output is discarded in that case.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            out = fut => {
                if self.token.is_cancelled() { None } else { Some(out) }
            }
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token for tasks spawned on behalf of this scope.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn completes_while_live() {
        let scope = ViewScope::detached();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn cancelled_scope_discards_result() {
        let scope = ViewScope::detached();
        scope.cancel();
        assert_eq!(scope.run(async { 7 }).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_flight_discards_result() {
        let scope = ViewScope::detached();
        let token = scope.token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let out = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                7
            })
            .await;
        assert_eq!(out, None);
    }

    #[test]
    fn parent_cancel_reaches_children() {
        let root = CancellationToken::new();
        let scope = ViewScope::child_of(&root);
        root.cancel();
        assert!(scope.is_cancelled());
    }
}
