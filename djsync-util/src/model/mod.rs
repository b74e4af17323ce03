mod contest;
mod judge;
mod outcome;
mod resource;

pub use contest::*;
pub use judge::*;
pub use outcome::*;
pub use resource::*;
