//! Local transforms - lopdf で完結する PDF 処理
//!
//! 各 transform は `TransformFn` と同じ形の純粋関数です（bytes + options → bytes）。
//! I/O もログもここでは行いません。呼び出しは Dispatcher が blocking thread 上で行います。
//!
//! # 含まれる transform
//! - merge / split / compress / rotate / extract / watermark / crop
//!
//! protect / unlock はローカルの PDF ライブラリに暗号化がないためリモート経由です。

pub mod compress;
pub mod crop;
pub mod document;
pub mod extract;
pub mod merge;
pub mod page_spec;
pub mod rotate;
pub mod split;
pub mod watermark;

#[cfg(test)]
pub(crate) mod fixtures;

pub use compress::compress;
pub use crop::crop;
pub use extract::extract;
pub use merge::merge;
pub use page_spec::parse_page_spec;
pub use rotate::rotate;
pub use split::split;
pub use watermark::watermark;
