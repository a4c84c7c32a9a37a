mod payload;
mod refresh;
mod session;
mod transport;

pub use refresh::{ConsolePrompt, TokenPrompt};
pub use session::SessionClient;
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub(crate) use refresh::RefreshReason;
#[cfg(test)]
pub(crate) use session::testing;
