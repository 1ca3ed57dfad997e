pub mod device_manager;
