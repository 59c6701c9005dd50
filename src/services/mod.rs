pub mod astronomy;
pub mod night;
pub mod planner;
pub mod seventimer;
pub mod visibility;
pub mod weather;
