pub mod answer;
pub mod question;

pub use answer::*;
pub use question::*;
