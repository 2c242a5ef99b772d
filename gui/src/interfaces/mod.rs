pub mod kartsim_interface;
