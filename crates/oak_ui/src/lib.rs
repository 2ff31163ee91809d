pub mod status_screen;

pub use status_screen::{StatusLayout, StatusMessage, StatusScreen};
