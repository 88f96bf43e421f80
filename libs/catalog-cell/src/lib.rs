pub mod descriptor;
pub mod handlers;
pub mod router;
pub mod service;
