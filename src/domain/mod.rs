pub mod video;

pub use video::{ContentType, NewVideo, Video};
