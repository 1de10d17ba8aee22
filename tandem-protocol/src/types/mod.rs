pub mod message;
pub mod prompt;
pub mod session;
pub mod status;
pub mod tool;

pub use message::*;
pub use prompt::*;
pub use session::*;
pub use status::*;
pub use tool::*;
