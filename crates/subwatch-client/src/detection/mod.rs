pub mod date;
pub mod interval;
pub mod normalize;
pub mod policy;
pub mod recurring;
pub mod types;
pub mod view;
