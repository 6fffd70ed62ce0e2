pub mod firmware;
pub mod flash;
pub mod random;
pub mod stdio;

pub use firmware::*;
pub use flash::*;
pub use random::*;
pub use stdio::*;
