pub mod badges;
pub mod sidenav;
