pub mod codec;
pub mod error;
pub mod frame;
pub mod metadata;
pub mod transcript;
pub mod turn;

pub use codec::{FrameDecoder, LineBuffer, SentinelDecoder, StreamDecoder, EXTRA_DATA_SENTINEL};
pub use error::{ProtocolError, Result};
pub use frame::{Frame, RelayErrorKind, WireFormat};
pub use metadata::{LegacyEnvelope, TerminalMetadata, UsageData};
pub use transcript::{Role, Transcript, TranscriptEntry, PLACEHOLDER};
pub use turn::TurnRequest;
