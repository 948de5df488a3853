pub mod channels;
pub mod color;
pub mod document;
pub mod error;
pub mod interaction;
pub mod layer;
pub mod map_state;
pub mod map_style;
pub mod resolve;
pub mod vis_state;

mod json;

pub use channels::*;
pub use color::*;
pub use document::*;
pub use error::*;
pub use interaction::*;
pub use layer::*;
pub use map_state::*;
pub use map_style::*;
pub use resolve::*;
pub use vis_state::*;
