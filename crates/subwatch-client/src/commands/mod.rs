pub mod common;
pub mod demo;
pub mod detect;
pub mod upcoming;
