// directory-service/src/api/handlers/mod.rs

pub mod department_handler;
pub mod location_handler;
pub mod position_handler;
pub mod system_handler;

use tokio_util::sync::{CancellationToken, DropGuard};

/// リクエスト用のキャンセルトークン
///
/// ハンドラの Future が破棄されるとガードも破棄され、トークンがキャンセルされる。
pub(crate) fn request_cancellation() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}
