pub mod bus_stop;
pub mod datamall_api_model;
