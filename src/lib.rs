//! EduRise chat assistant
//!
//! The conversational assistant embedded in EduRise pages:
//! - Markdown rendering of answers, HTML-escaped before anything else
//! - Voice capture and voice synthesis behind host capability traits
//! - One-request-at-a-time exchange with the answering endpoint
//! - The widget controller binding it all to a rendering surface
//! - An HTTP relay between the widget and the remote answering service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Host surface                        │
//! │   Browser page  │  Terminal  │  Test fakes           │
//! └────────────────────┬────────────────────────────────┘
//!                      │ UiEvent
//! ┌────────────────────▼────────────────────────────────┐
//! │                 ChatUiController                     │
//! │   ChatSession  │  Markdown  │  Voice in/out          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST {query}
//! ┌────────────────────▼────────────────────────────────┐
//! │            Relay → remote answering service          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod markdown;
pub mod relay;
pub mod session;
pub mod transport;
pub mod voice;
pub mod widget;

pub use config::Config;
pub use error::{Error, Result};
pub use relay::{AnswerService, ChatAnswer, RelayServer, RemoteRagService};
pub use session::{ChatSession, Message, Phase, SendOutcome, Sender, SessionState};
pub use transport::{ChatReply, ChatTransport, HttpTransport};
pub use voice::{SpeechInputManager, SpeechOutputManager, Unsupported};
pub use widget::{ChatUiController, Element, Key, TerminalSurface, UiEvent, WidgetSurface};
