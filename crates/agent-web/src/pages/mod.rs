//! Page Components

mod home;
mod solve;

pub use home::HomePage;
pub use solve::SolvePage;
