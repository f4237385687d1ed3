pub mod calendar;
pub mod lenient;
pub mod matrix;
pub mod normalizer;
pub mod promotion;
pub mod roster;
