pub mod hours;
pub mod validation;
pub mod wifi;
pub mod workdays;
