pub mod backend;
pub mod error;
pub mod session;
pub mod transport;

pub use error::{ClientError, ClientResult};
pub use session::{ChatSession, DisplayMode, SessionSnapshot, TurnOutcome};
pub use transport::{ByteStream, HttpRelayTransport, RelayTransport};
