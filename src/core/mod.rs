pub mod assets;
pub mod controller;
pub mod font;
pub mod layout;
pub mod menu;
pub mod render;
pub mod session;
pub mod store;
