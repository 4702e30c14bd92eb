pub mod columns;
pub mod controller;
pub mod domain;
pub mod layout;
pub mod logging;
pub mod model;
pub mod product;
pub mod state;
pub mod ui;
pub mod view;
