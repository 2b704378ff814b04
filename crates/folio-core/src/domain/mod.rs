//! Domain model (IDs, tools, options, requests, outcomes, artifacts).
//!
//! ここにある型は I/O を持ちません。ストア・ディスパッチャ・リモート境界は
//! ports / impls / app 側で組み立てます。

pub mod artifact;
pub mod errors;
pub mod ids;
pub mod options;
pub mod outcome;
pub mod request;
pub mod tool;

pub use artifact::{ArtifactHandle, StoreStats, StoredArtifact};
pub use errors::{ErrorKind, FolioError, RemoteError, TransformError};
pub use ids::{ArtifactId, IdParseError, RequestId};
pub use options::{
    CompressOptions, CropOptions, ExtractOptions, MergeOptions, PasswordOptions, RemoteOptions,
    RotateOptions, RotationAngle, SplitOptions, ToolOptions, WatermarkOptions, WatermarkPosition,
    WatermarkText,
};
pub use outcome::{OutcomeKind, OutputFile, ProcessingResult};
pub use request::{InputFile, ProcessingRequest, PDF_CONTENT_TYPE};
pub use tool::{ToolId, UnknownTool};
