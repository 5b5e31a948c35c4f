pub mod spring_settings;
