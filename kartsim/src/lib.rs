pub mod core;
pub mod interfaces;
pub mod logging;
pub mod post;
pub mod pre;
