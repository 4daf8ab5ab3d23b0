#[allow(non_snake_case)]
pub mod Constants;
#[allow(non_snake_case)]
pub mod Kinetics;
#[allow(non_snake_case)]
pub mod ReactorsPDE;
#[allow(non_snake_case)]
pub mod Utils;
