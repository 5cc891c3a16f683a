/*!
 * Principal extractor
 *
 * Responsibility:
 * - identity middleware が install した principal を handler に提供する
 * - axum 依存は core に閉じ込め、型定義は types に分離する
 */

mod core;
mod types;

pub use types::{CurrentPrincipal, MaybePrincipal};
