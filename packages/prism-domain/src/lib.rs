pub mod criterion;
pub mod disambiguate;
pub mod hierarchy;
pub mod shuffle;
