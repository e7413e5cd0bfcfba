mod fish;
pub use fish::*;
