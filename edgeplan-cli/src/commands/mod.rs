pub mod check;
pub mod diff;
pub mod plan;
pub mod routes;
